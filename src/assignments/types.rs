//! Assignment records and their validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::scale::{GradingError, GradingScale};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssignmentError {
    #[error("assignment name must be a non-empty string")]
    EmptyName,

    #[error("weight {0} must be greater than 0 and at most 100")]
    InvalidWeight(f64),

    #[error("grade {0} must be between 0 and 100")]
    GradeOutOfRange(f64),
}

/// Formative work (quizzes, homework) or summative work (exams, finals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentKind {
    #[serde(rename = "FA", alias = "fa")]
    Formative,
    #[serde(rename = "SA", alias = "sa")]
    Summative,
}

impl AssignmentKind {
    pub fn code(&self) -> &'static str {
        match self {
            AssignmentKind::Formative => "FA",
            AssignmentKind::Summative => "SA",
        }
    }

    pub fn other(&self) -> AssignmentKind {
        match self {
            AssignmentKind::Formative => AssignmentKind::Summative,
            AssignmentKind::Summative => AssignmentKind::Formative,
        }
    }
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self {
            AssignmentKind::Formative => "FORMATIVE ASSIGNMENTS (FA)",
            AssignmentKind::Summative => "SUMMATIVE ASSIGNMENTS (SA)",
        };
        f.write_str(title)
    }
}

/// A single graded piece of work. Fields are validated on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    name: String,
    kind: AssignmentKind,
    weight: f64,
    grade: f64,
}

impl Assignment {
    pub fn new(
        name: &str,
        kind: AssignmentKind,
        weight: f64,
        grade: f64,
    ) -> Result<Self, AssignmentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AssignmentError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            kind,
            weight: validate_weight(weight)?,
            grade: validate_grade(grade)?,
        })
    }

    pub fn formative(name: &str, weight: f64, grade: f64) -> Result<Self, AssignmentError> {
        Self::new(name, AssignmentKind::Formative, weight, grade)
    }

    pub fn summative(name: &str, weight: f64, grade: f64) -> Result<Self, AssignmentError> {
        Self::new(name, AssignmentKind::Summative, weight, grade)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AssignmentKind {
        self.kind
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn grade(&self) -> f64 {
        self.grade
    }

    /// Weighted points this assignment contributes to its category.
    pub fn points(&self) -> f64 {
        self.grade * self.weight / 100.0
    }

    /// Encouragement keyed on whether the grade passes under `scale`.
    pub fn feedback(&self, scale: &GradingScale) -> Result<String, GradingError> {
        let passing = scale.is_passing(self.grade)?;
        let text = match (self.kind, passing) {
            (AssignmentKind::Formative, true) => {
                format!("Great job on {}! Keep up the good work.", self.name)
            }
            (AssignmentKind::Formative, false) => {
                format!(
                    "Keep working on {} - you can improve on the next FA!",
                    self.name
                )
            }
            (AssignmentKind::Summative, true) => {
                format!("Excellent work on {}! This is a major achievement!", self.name)
            }
            (AssignmentKind::Summative, false) => {
                format!(
                    "Focus on improving for {} - it's crucial for passing!",
                    self.name
                )
            }
        };
        Ok(text)
    }
}

fn validate_weight(weight: f64) -> Result<f64, AssignmentError> {
    if weight.is_finite() && weight > 0.0 && weight <= 100.0 {
        Ok(weight)
    } else {
        Err(AssignmentError::InvalidWeight(weight))
    }
}

fn validate_grade(grade: f64) -> Result<f64, AssignmentError> {
    if grade.is_finite() && (0.0..=100.0).contains(&grade) {
        Ok(grade)
    } else {
        Err(AssignmentError::GradeOutOfRange(grade))
    }
}
