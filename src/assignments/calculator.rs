//! Category and overall GPA calculation, and the ALU pass rule.
//!
//! A course is passed when both the formative and the summative category
//! land in passing bands. The overall percentage is the plain mean of the
//! categories that have assignments.

use serde::Serialize;

use super::types::{Assignment, AssignmentKind};
use crate::scale::{Grade, GradingScale, Result};

/// Totals for one assignment category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub kind: AssignmentKind,
    pub count: usize,
    pub weighted_points: f64,
    pub total_weight: f64,
    /// `None` when the category has no assignments.
    pub percentage: Option<f64>,
    pub grade: Option<Grade>,
}

impl CategorySummary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Summarizes the assignments of `kind`, ignoring the rest.
pub fn summarize_category(
    scale: &GradingScale,
    kind: AssignmentKind,
    assignments: &[Assignment],
) -> Result<CategorySummary> {
    let (count, weighted_points, total_weight) = assignments
        .iter()
        .filter(|a| a.kind() == kind)
        .fold((0, 0.0, 0.0), |(n, points, weight), a| {
            (n + 1, points + a.points(), weight + a.weight())
        });

    let percentage = if count == 0 {
        None
    } else {
        let domain = scale.domain();
        Some((weighted_points / total_weight * 100.0).clamp(domain.min, domain.max))
    };
    let grade = percentage.map(|p| scale.lookup(p)).transpose()?;

    Ok(CategorySummary {
        kind,
        count,
        weighted_points,
        total_weight,
        percentage,
        grade,
    })
}

/// Mean of whichever category percentages are present, `None` for neither.
pub fn overall_percentage(formative: Option<f64>, summative: Option<f64>) -> Option<f64> {
    match (formative, summative) {
        (Some(fa), Some(sa)) => Some((fa + sa) / 2.0),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallResult {
    /// `None` when neither category has assignments.
    pub percentage: Option<f64>,
    pub grade: Option<Grade>,
    pub formative: CategorySummary,
    pub summative: CategorySummary,
}

pub fn calculate_overall(scale: &GradingScale, assignments: &[Assignment]) -> Result<OverallResult> {
    let formative = summarize_category(scale, AssignmentKind::Formative, assignments)?;
    let summative = summarize_category(scale, AssignmentKind::Summative, assignments)?;

    let percentage = overall_percentage(formative.percentage, summative.percentage);
    let grade = percentage.map(|p| scale.lookup(p)).transpose()?;

    Ok(OverallResult {
        percentage,
        grade,
        formative,
        summative,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickResult {
    pub formative: Grade,
    pub summative: Grade,
    pub percentage: f64,
    pub grade: Grade,
}

/// Overall grade straight from two category totals.
pub fn quick_overall(scale: &GradingScale, formative: f64, summative: f64) -> Result<QuickResult> {
    let fa = scale.lookup(formative)?;
    let sa = scale.lookup(summative)?;
    let percentage = (formative + summative) / 2.0;

    Ok(QuickResult {
        formative: fa,
        summative: sa,
        percentage,
        grade: scale.lookup(percentage)?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceTier {
    Outstanding,
    Excellent,
    Good,
    Satisfactory,
    RoomForImprovement,
}

impl PerformanceTier {
    pub fn from_gpa(gpa: f64) -> Self {
        match gpa {
            g if g >= 4.5 => PerformanceTier::Outstanding,
            g if g >= 4.0 => PerformanceTier::Excellent,
            g if g >= 3.5 => PerformanceTier::Good,
            g if g >= 3.0 => PerformanceTier::Satisfactory,
            _ => PerformanceTier::RoomForImprovement,
        }
    }

    pub fn message(&self, gpa: f64) -> String {
        match self {
            PerformanceTier::Outstanding => format!("Outstanding performance with a GPA of {gpa:.3}!"),
            PerformanceTier::Excellent => format!("Excellent work with a GPA of {gpa:.3}!"),
            PerformanceTier::Good => format!("Good performance with a GPA of {gpa:.3}!"),
            PerformanceTier::Satisfactory => format!("Satisfactory work with a GPA of {gpa:.3}!"),
            PerformanceTier::RoomForImprovement => {
                format!("You passed, but there's room for improvement. GPA: {gpa:.3}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CourseStanding {
    Passed {
        tier: PerformanceTier,
    },
    Failed {
        formative_passing: bool,
        summative_passing: bool,
    },
    /// Only one category has assignments so far.
    InProgress {
        kind: AssignmentKind,
        percentage: f64,
        passing: bool,
    },
    NoAssignments,
}

pub fn course_standing(overall: &OverallResult) -> CourseStanding {
    let passing = |summary: &CategorySummary| summary.grade.as_ref().is_some_and(|g| g.is_passing);

    match (overall.formative.percentage, overall.summative.percentage) {
        (Some(_), Some(_)) => {
            let formative_passing = passing(&overall.formative);
            let summative_passing = passing(&overall.summative);
            if formative_passing && summative_passing {
                let gpa = overall.grade.as_ref().map_or(0.0, |g| g.gpa);
                CourseStanding::Passed {
                    tier: PerformanceTier::from_gpa(gpa),
                }
            } else {
                CourseStanding::Failed {
                    formative_passing,
                    summative_passing,
                }
            }
        }
        (Some(percentage), None) => CourseStanding::InProgress {
            kind: AssignmentKind::Formative,
            percentage,
            passing: passing(&overall.formative),
        },
        (None, Some(percentage)) => CourseStanding::InProgress {
            kind: AssignmentKind::Summative,
            percentage,
            passing: passing(&overall.summative),
        },
        (None, None) => CourseStanding::NoAssignments,
    }
}
