//! Output formatting and persistence for grade lookups and reports.
//!
//! Rendering functions build plain text for stdout; lookup history is
//! appended to a CSV file.

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

use crate::assignments::{Assignment, CategorySummary, CourseStanding, OverallResult, QuickResult};
use crate::scale::{Grade, GradingScale};

const RULE: &str = "============================================================";

fn yes_no(passing: bool) -> &'static str {
    if passing { "Yes" } else { "No" }
}

fn pass_fail(passing: bool) -> &'static str {
    if passing { "PASS" } else { "FAIL" }
}

/// The three derived values for one score.
pub fn render_grade(score: f64, grade: &Grade) -> String {
    format!(
        "Score: {score:.2}%\nGPA: {:.2}\nLetter Grade: {}\nPassing: {}\n",
        grade.gpa,
        grade.letter,
        yes_no(grade.is_passing)
    )
}

/// Reference table of all bands, highest first.
pub fn render_scale(scale: &GradingScale) -> Result<String> {
    let domain = scale.domain();
    let mut out = String::new();

    writeln!(out, "GRADING SCALE REFERENCE:")?;
    writeln!(out, "{}", &RULE[..45])?;
    writeln!(out, "Score Range      | Letter | GPA | Pass")?;
    writeln!(out, "{}", &RULE[..45])?;

    for band in scale.boundaries() {
        let range = band.range_label(&domain);
        writeln!(
            out,
            "{range:<16} | {:<6} | {:.1} | {}",
            band.letter,
            band.gpa,
            yes_no(band.is_passing)
        )?;
    }

    writeln!(out, "Maximum GPA: {}", scale.max_gpa())?;
    if let Some(threshold) = scale.passing_threshold() {
        writeln!(out, "Passing threshold: {threshold}%")?;
    }
    for (from, to) in scale.coverage_gaps() {
        writeln!(out, "Warning: scores from {from} to {to} are not covered")?;
    }
    Ok(out)
}

pub fn render_quick(scale: &GradingScale, fa_score: f64, sa_score: f64, quick: &QuickResult) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "QUICK GPA RESULTS:")?;
    writeln!(out, "{}", &RULE[..25])?;
    writeln!(
        out,
        "FA Score: {fa_score:.1}% | GPA: {:.2} ({})",
        quick.formative.gpa, quick.formative.letter
    )?;
    writeln!(
        out,
        "SA Score: {sa_score:.1}% | GPA: {:.2} ({})",
        quick.summative.gpa, quick.summative.letter
    )?;
    writeln!(out, "Overall: {:.2}%", quick.percentage)?;
    writeln!(out, "Letter Grade: {}", quick.grade.letter)?;
    writeln!(out, "GPA: {:.3}/{}", quick.grade.gpa, scale.max_gpa())?;
    Ok(out)
}

fn render_category(
    out: &mut String,
    scale: &GradingScale,
    summary: &CategorySummary,
    assignments: &[Assignment],
) -> Result<()> {
    writeln!(out, "\n{}:", summary.kind)?;
    writeln!(out, "{}", &RULE[..50])?;

    let (Some(percentage), Some(grade)) = (summary.percentage, summary.grade.as_ref()) else {
        writeln!(out, "No assignments added yet.")?;
        return Ok(());
    };

    let members = assignments.iter().filter(|a| a.kind() == summary.kind);
    for (i, assignment) in members.enumerate() {
        let status = pass_fail(scale.is_passing(assignment.grade())?);
        writeln!(out, "{}. {}", i + 1, assignment.name())?;
        writeln!(
            out,
            "Grade: {:.2}% | Weight: {:.2}% | {status}",
            assignment.grade(),
            assignment.weight()
        )?;
        writeln!(out, "Points contributed: {:.2}", assignment.points())?;
        writeln!(out, "{}", assignment.feedback(scale)?)?;
        writeln!(out)?;
    }

    writeln!(out, "CATEGORY SUMMARY:")?;
    writeln!(out, "Total Score: {percentage:.2}%")?;
    writeln!(out, "Letter Grade: {}", grade.letter)?;
    writeln!(out, "GPA: {:.2}/{}", grade.gpa, scale.max_gpa())?;
    writeln!(out, "Total Weight: {:.2}%", summary.total_weight)?;
    writeln!(out, "Status: {}", pass_fail(grade.is_passing))?;
    Ok(())
}

fn render_standing(out: &mut String, scale: &GradingScale, overall: &OverallResult, standing: &CourseStanding) -> Result<()> {
    let threshold = scale.passing_threshold().unwrap_or(scale.domain().max);

    match standing {
        CourseStanding::Passed { tier } => {
            writeln!(out, "\nCONGRATULATIONS! YOU PASSED THE COURSE!")?;
            writeln!(out, "Both your FA and SA categories meet the minimum requirement!")?;
            let gpa = overall.grade.as_ref().map_or(0.0, |g| g.gpa);
            writeln!(out, "{}", tier.message(gpa))?;
        }
        CourseStanding::Failed {
            formative_passing,
            summative_passing,
        } => {
            writeln!(out, "\nUNFORTUNATELY, YOU NEED TO REPEAT THIS COURSE")?;
            writeln!(out, "You need at least {threshold}% in BOTH FA and SA to pass")?;
            for (summary, passing) in [
                (&overall.formative, formative_passing),
                (&overall.summative, summative_passing),
            ] {
                if !passing {
                    writeln!(
                        out,
                        "Your {} total ({:.2}%) is below {threshold}%",
                        summary.kind.code(),
                        summary.percentage.unwrap_or_default()
                    )?;
                }
            }
        }
        CourseStanding::InProgress {
            kind,
            percentage,
            passing,
        } => {
            let code = kind.code();
            writeln!(out, "\nCURRENT {code} PROGRESS:")?;
            if *passing {
                writeln!(out, "Great! Your {code} score ({percentage:.2}%) meets the requirement!")?;
                writeln!(
                    out,
                    "Add {} assignments to get your complete course grade.",
                    kind.other().code()
                )?;
            } else {
                writeln!(
                    out,
                    "Your {code} score ({percentage:.2}%) is below {threshold}%. Keep working!"
                )?;
            }
        }
        CourseStanding::NoAssignments => {
            writeln!(out, "\nNo assignments added yet. Add some assignments to see your progress!")?;
        }
    }
    Ok(())
}

/// Full report: both categories, final results, standing and the scale.
pub fn render_report(
    student: &str,
    scale: &GradingScale,
    assignments: &[Assignment],
    overall: &OverallResult,
    standing: &CourseStanding,
) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "{RULE}")?;
    writeln!(out, "COMPREHENSIVE GRADE REPORT FOR {}", student.to_uppercase())?;
    writeln!(out, "{RULE}")?;

    render_category(&mut out, scale, &overall.formative, assignments)?;
    render_category(&mut out, scale, &overall.summative, assignments)?;

    writeln!(out, "\nFINAL ACADEMIC RESULTS:")?;
    writeln!(out, "{}", &RULE[..40])?;
    for summary in [&overall.formative, &overall.summative] {
        match summary.grade.as_ref() {
            Some(grade) => writeln!(
                out,
                "{} Category: {:.2}% | GPA: {:.2} ({})",
                summary.kind.code(),
                summary.percentage.unwrap_or_default(),
                grade.gpa,
                grade.letter
            )?,
            None => writeln!(out, "{} Category: N/A", summary.kind.code())?,
        }
    }
    match (overall.percentage, overall.grade.as_ref()) {
        (Some(percentage), Some(grade)) => {
            writeln!(out, "Overall Percentage: {percentage:.2}%")?;
            writeln!(out, "Overall Letter Grade: {}", grade.letter)?;
            writeln!(out, "Overall GPA: {:.3}/{}", grade.gpa, scale.max_gpa())?;
        }
        _ => writeln!(out, "Overall: N/A")?,
    }

    render_standing(&mut out, scale, overall, standing)?;

    writeln!(out)?;
    out.push_str(&render_scale(scale)?);
    writeln!(out, "{RULE}")?;
    Ok(out)
}

/// One lookup, as stored in the history CSV.
#[derive(Debug, Serialize)]
pub struct LookupRecord<'a> {
    pub score: f64,
    pub gpa: f64,
    pub letter: &'a str,
    pub is_passing: bool,
}

impl<'a> LookupRecord<'a> {
    pub fn new(score: f64, grade: &'a Grade) -> Self {
        Self {
            score,
            gpa: grade.gpa,
            letter: &grade.letter,
            is_passing: grade.is_passing,
        }
    }
}

/// Appends a [`LookupRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_lookup(path: &str, record: &LookupRecord<'_>) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending lookup record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignments::{calculate_overall, course_standing, quick_overall};
    use crate::scale::{BandKey, GradingScale};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_render_grade() {
        let scale = GradingScale::alu();
        let text = render_grade(92.0, &scale.lookup(92.0).unwrap());

        assert_eq!(text, "Score: 92.00%\nGPA: 4.80\nLetter Grade: A\nPassing: Yes\n");
    }

    #[test]
    fn test_render_scale_lists_bands_and_gaps() {
        let mut scale = GradingScale::alu();
        let full = render_scale(&scale).unwrap();
        assert!(full.contains("[98, 100]"));
        assert!(full.contains("[90, 98)"));
        assert!(full.contains("Passing threshold: 50%"));
        assert!(!full.contains("Warning"));

        scale.remove_band(&BandKey::letter("D")).unwrap();
        let gapped = render_scale(&scale).unwrap();
        assert!(gapped.contains("Warning: scores from 40 to 50 are not covered"));
    }

    #[test]
    fn test_render_quick() {
        let scale = GradingScale::alu();
        let quick = quick_overall(&scale, 70.0, 90.0).unwrap();
        let text = render_quick(&scale, 70.0, 90.0, &quick).unwrap();

        assert!(text.contains("FA Score: 70.0% | GPA: 4.00 (B)"));
        assert!(text.contains("GPA: 4.700/5"));
    }

    #[test]
    fn test_render_report_failed_course() {
        let scale = GradingScale::alu();
        let work = vec![
            Assignment::formative("Quiz", 10.0, 95.0).unwrap(),
            Assignment::summative("Final", 50.0, 45.0).unwrap(),
        ];
        let overall = calculate_overall(&scale, &work).unwrap();
        let standing = course_standing(&overall);
        let text = render_report("Ada", &scale, &work, &overall, &standing).unwrap();

        assert!(text.contains("COMPREHENSIVE GRADE REPORT FOR ADA"));
        assert!(text.contains("YOU NEED TO REPEAT THIS COURSE"));
        assert!(text.contains("Your SA total (45.00%) is below 50%"));
        assert!(!text.contains("Your FA total"));
    }

    #[test]
    fn test_render_report_without_summatives() {
        let scale = GradingScale::alu();
        let work = vec![Assignment::formative("Quiz", 10.0, 75.0).unwrap()];
        let overall = calculate_overall(&scale, &work).unwrap();
        let text = render_report("Ada", &scale, &work, &overall, &course_standing(&overall)).unwrap();

        assert!(text.contains("SA Category: N/A"));
        assert!(text.contains("CURRENT FA PROGRESS:"));
        assert!(text.contains("Add SA assignments"));
    }

    #[test]
    fn test_render_report_without_assignments() {
        let scale = GradingScale::alu();
        let overall = calculate_overall(&scale, &[]).unwrap();
        let text = render_report("Ada", &scale, &[], &overall, &course_standing(&overall)).unwrap();

        assert!(text.contains("Overall: N/A"));
        assert!(text.contains("No assignments added yet. Add some assignments"));
    }

    #[test]
    fn test_append_lookup_writes_header_once() {
        let path = temp_path("alu_grade_calc_test_history.csv");
        let _ = fs::remove_file(&path);

        let scale = GradingScale::alu();
        let grade = scale.lookup(92.0).unwrap();
        append_lookup(&path, &LookupRecord::new(92.0, &grade)).unwrap();
        append_lookup(&path, &LookupRecord::new(92.0, &grade)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "score,gpa,letter,is_passing");
        assert_eq!(lines[1], "92.0,4.8,A,true");

        fs::remove_file(&path).unwrap();
    }
}
