//! Coursework tracking on top of a [`GradingScale`](crate::scale::GradingScale).
//!
//! Assignments are grouped into formative (FA) and summative (SA)
//! categories. Each category is reduced to a weighted percentage, the two
//! are averaged into an overall grade, and the pass rule is applied.

pub mod calculator;
pub mod types;

pub use calculator::{
    CategorySummary, CourseStanding, OverallResult, PerformanceTier, QuickResult,
    calculate_overall, course_standing, overall_percentage, quick_overall, summarize_category,
};
pub use types::{Assignment, AssignmentError, AssignmentKind};

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use tracing::debug;

/// A row of an assignments CSV: `kind,name,weight,grade`.
#[derive(Debug, Deserialize)]
struct AssignmentRecord {
    kind: AssignmentKind,
    name: String,
    weight: f64,
    grade: f64,
}

/// Reads and validates assignments from CSV with a header row.
pub fn read_assignments<R: Read>(reader: R) -> Result<Vec<Assignment>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut assignments = Vec::new();
    for (i, record) in csv_reader.deserialize::<AssignmentRecord>().enumerate() {
        let row = i + 1;
        let record = record.with_context(|| format!("failed to parse assignment row {row}"))?;
        let assignment = Assignment::new(&record.name, record.kind, record.weight, record.grade)
            .with_context(|| format!("invalid assignment on row {row}"))?;
        assignments.push(assignment);
    }

    debug!(count = assignments.len(), "Read assignments");
    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_assignments() {
        let csv = "kind,name,weight,grade\nFA, Quiz 1 ,10,80\nsa,Final,40,72.5\n";
        let assignments = read_assignments(csv.as_bytes()).unwrap();

        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].name(), "Quiz 1");
        assert_eq!(assignments[1].kind(), AssignmentKind::Summative);
        assert_eq!(assignments[1].grade(), 72.5);
    }

    #[test]
    fn test_read_assignments_rejects_invalid_rows() {
        let bad_kind = "kind,name,weight,grade\nHW,Quiz,10,80\n";
        assert!(read_assignments(bad_kind.as_bytes()).is_err());

        let bad_grade = "kind,name,weight,grade\nFA,Quiz,10,180\n";
        let err = read_assignments(bad_grade.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
