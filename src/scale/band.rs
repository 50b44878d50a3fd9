//! Band records and the values a lookup produces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed range of scores a scale accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDomain {
    pub min: f64,
    pub max: f64,
}

impl ScoreDomain {
    pub const PERCENT: ScoreDomain = ScoreDomain {
        min: 0.0,
        max: 100.0,
    };

    pub fn contains(&self, score: f64) -> bool {
        score.is_finite() && score >= self.min && score <= self.max
    }
}

impl Default for ScoreDomain {
    fn default() -> Self {
        Self::PERCENT
    }
}

/// One contiguous score range and the outcome it maps to.
///
/// Ranges are lower-inclusive and upper-exclusive. A band whose
/// `upper_bound` equals the domain maximum also contains the maximum, so
/// the top of the domain is always reachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradeBand {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub gpa: f64,
    pub letter: String,
    pub is_passing: bool,
}

impl GradeBand {
    pub fn new(
        letter: impl Into<String>,
        lower_bound: f64,
        upper_bound: f64,
        gpa: f64,
        is_passing: bool,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound,
            gpa,
            letter: letter.into(),
            is_passing,
        }
    }

    /// Returns true if `score` falls inside this band under `domain`.
    pub fn contains(&self, score: f64, domain: &ScoreDomain) -> bool {
        if score < self.lower_bound {
            return false;
        }
        score < self.upper_bound || (self.upper_bound == domain.max && score == domain.max)
    }

    /// Half-open intervals intersect when each starts before the other ends.
    pub fn overlaps(&self, other: &GradeBand) -> bool {
        self.lower_bound < other.upper_bound && other.lower_bound < self.upper_bound
    }

    pub fn has_range(&self, lower_bound: f64, upper_bound: f64) -> bool {
        self.lower_bound == lower_bound && self.upper_bound == upper_bound
    }

    /// The range in interval notation, closed at the top when the band
    /// reaches the domain maximum: `[90, 98)` or `[98, 100]`.
    pub fn range_label(&self, domain: &ScoreDomain) -> String {
        let close = if self.upper_bound == domain.max { ']' } else { ')' };
        format!("[{}, {}{close}", self.lower_bound, self.upper_bound)
    }

    /// Letter followed by [`range_label`](Self::range_label).
    pub fn label(&self, domain: &ScoreDomain) -> String {
        format!("{} {}", self.letter, self.range_label(domain))
    }

    pub fn grade(&self) -> Grade {
        Grade {
            gpa: self.gpa,
            letter: self.letter.clone(),
            is_passing: self.is_passing,
        }
    }
}

/// Identifies an existing band for update and removal.
///
/// `Range` keys compare bounds with exact `f64` equality, so they only find
/// a band whose bounds are bit-for-bit the ones given.
#[derive(Debug, Clone, PartialEq)]
pub enum BandKey {
    Letter(String),
    Range { lower_bound: f64, upper_bound: f64 },
}

impl BandKey {
    pub fn letter(letter: impl Into<String>) -> Self {
        BandKey::Letter(letter.into())
    }

    pub fn range(lower_bound: f64, upper_bound: f64) -> Self {
        BandKey::Range {
            lower_bound,
            upper_bound,
        }
    }

    pub fn matches(&self, band: &GradeBand) -> bool {
        match self {
            BandKey::Letter(letter) => band.letter == *letter,
            BandKey::Range {
                lower_bound,
                upper_bound,
            } => band.has_range(*lower_bound, *upper_bound),
        }
    }
}

impl fmt::Display for BandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandKey::Letter(letter) => write!(f, "letter {letter}"),
            BandKey::Range {
                lower_bound,
                upper_bound,
            } => write!(f, "range [{lower_bound}, {upper_bound})"),
        }
    }
}

/// GPA, letter and pass/fail for a looked-up score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub gpa: f64,
    pub letter: String,
    pub is_passing: bool,
}
