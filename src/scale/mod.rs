//! Grading scale: an ordered table of score bands.
//!
//! [`GradingScale`] maps a percentage score to a [`Grade`] (GPA, letter and
//! pass/fail). Bands are kept sorted by `lower_bound` and never overlap;
//! every edit goes through [`GradingScale::add_band`],
//! [`GradingScale::update_band`] or [`GradingScale::remove_band`], which
//! validate before touching the table.
//!
//! The scale is a plain owned value with no internal locking. Share it
//! across threads only behind external synchronization.

pub mod band;
pub mod codec;
pub mod error;

pub use band::{BandKey, Grade, GradeBand, ScoreDomain};
pub use codec::ScaleFormat;
pub use error::{GradingError, Result};

use tracing::debug;

/// Highest GPA on the ALU scale.
pub const DEFAULT_MAX_GPA: f64 = 5.0;

/// Default ALU bands as `(letter, lower, upper, gpa, passing)`.
static ALU_BANDS: &[(&str, f64, f64, f64, bool)] = &[
    ("F", 0.0, 40.0, 1.0, false),
    ("D", 40.0, 50.0, 2.0, false),
    ("C-", 50.0, 55.0, 2.7, true),
    ("C", 55.0, 60.0, 3.0, true),
    ("C+", 60.0, 65.0, 3.3, true),
    ("B-", 65.0, 70.0, 3.7, true),
    ("B", 70.0, 75.0, 4.0, true),
    ("B+", 75.0, 80.0, 4.3, true),
    ("A-", 80.0, 90.0, 4.7, true),
    ("A", 90.0, 98.0, 4.8, true),
    ("A+", 98.0, 100.0, 5.0, true),
];

#[derive(Debug, Clone, PartialEq)]
pub struct GradingScale {
    domain: ScoreDomain,
    max_gpa: f64,
    bands: Vec<GradeBand>,
}

impl Default for GradingScale {
    fn default() -> Self {
        Self::alu()
    }
}

impl GradingScale {
    /// The ALU scale over 0–100 with a 5.0 maximum GPA.
    pub fn alu() -> Self {
        let bands = ALU_BANDS
            .iter()
            .map(|&(letter, lower, upper, gpa, passing)| {
                GradeBand::new(letter, lower, upper, gpa, passing)
            })
            .collect();

        Self {
            domain: ScoreDomain::PERCENT,
            max_gpa: DEFAULT_MAX_GPA,
            bands,
        }
    }

    /// An empty scale to be filled with [`add_band`](Self::add_band).
    pub fn empty(domain: ScoreDomain, max_gpa: f64) -> Result<Self> {
        if !(domain.min.is_finite() && domain.max.is_finite()) || domain.min >= domain.max {
            return Err(GradingError::MalformedData(format!(
                "domain {}..={} is not a non-empty finite range",
                domain.min, domain.max
            )));
        }
        if !max_gpa.is_finite() || max_gpa <= 0.0 {
            return Err(GradingError::MalformedData(format!(
                "max_gpa {max_gpa} must be a positive number"
            )));
        }

        Ok(Self {
            domain,
            max_gpa,
            bands: Vec::new(),
        })
    }

    /// Builds a validated scale from an unordered list of bands.
    pub fn from_bands(domain: ScoreDomain, max_gpa: f64, bands: Vec<GradeBand>) -> Result<Self> {
        let mut scale = Self::empty(domain, max_gpa)?;
        for band in bands {
            scale.add_band(band)?;
        }
        Ok(scale)
    }

    pub fn domain(&self) -> ScoreDomain {
        self.domain
    }

    pub fn max_gpa(&self) -> f64 {
        self.max_gpa
    }

    /// Bands in ascending `lower_bound` order.
    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Looks up the single band containing `score`.
    ///
    /// # Errors
    ///
    /// [`GradingError::OutOfRange`] for a non-finite score or one outside the
    /// domain, [`GradingError::InvalidScaleState`] if the score falls into a
    /// coverage gap or more than one band claims it.
    pub fn lookup(&self, score: f64) -> Result<Grade> {
        if !self.domain.contains(score) {
            return Err(GradingError::OutOfRange {
                score,
                min: self.domain.min,
                max: self.domain.max,
            });
        }

        let mut matched = self
            .bands
            .iter()
            .filter(|band| band.contains(score, &self.domain));

        match (matched.next(), matched.next()) {
            (Some(band), None) => Ok(band.grade()),
            (None, _) => Err(GradingError::InvalidScaleState { score, matches: 0 }),
            (Some(_), Some(_)) => Err(GradingError::InvalidScaleState {
                score,
                matches: 2 + matched.count(),
            }),
        }
    }

    pub fn is_passing(&self, score: f64) -> Result<bool> {
        Ok(self.lookup(score)?.is_passing)
    }

    /// Inserts `band`, keeping the table sorted.
    pub fn add_band(&mut self, band: GradeBand) -> Result<()> {
        self.validate_band(&band)?;
        self.check_fits(&band, None)?;

        debug!(band = %band.label(&self.domain), "Adding grade band");
        self.insert_sorted(band);
        Ok(())
    }

    /// Replaces the band matching `key` with `band`.
    ///
    /// The replacement is checked against every other band before the old
    /// one is taken out, so a rejected update leaves the table as it was.
    pub fn update_band(&mut self, key: &BandKey, band: GradeBand) -> Result<()> {
        let index = self.position(key)?;
        self.validate_band(&band)?;
        self.check_fits(&band, Some(index))?;

        let old = self.bands.remove(index);
        debug!(
            old = %old.label(&self.domain),
            new = %band.label(&self.domain),
            "Updating grade band"
        );
        self.insert_sorted(band);
        Ok(())
    }

    /// Removes the band matching `key` and returns it.
    pub fn remove_band(&mut self, key: &BandKey) -> Result<GradeBand> {
        let index = self.position(key)?;
        let removed = self.bands.remove(index);
        debug!(band = %removed.label(&self.domain), "Removed grade band");
        Ok(removed)
    }

    /// Bands from highest to lowest, the order used for display.
    pub fn boundaries(&self) -> impl Iterator<Item = &GradeBand> {
        self.bands.iter().rev()
    }

    /// Sub-ranges of the domain that no band covers, ascending.
    pub fn coverage_gaps(&self) -> Vec<(f64, f64)> {
        let mut gaps = Vec::new();
        let mut cursor = self.domain.min;

        for band in &self.bands {
            if band.lower_bound > cursor {
                gaps.push((cursor, band.lower_bound));
            }
            cursor = cursor.max(band.upper_bound);
        }

        if cursor < self.domain.max {
            gaps.push((cursor, self.domain.max));
        }
        gaps
    }

    /// Lowest score that lands in a passing band, if any band passes.
    pub fn passing_threshold(&self) -> Option<f64> {
        self.bands
            .iter()
            .find(|band| band.is_passing)
            .map(|band| band.lower_bound)
    }

    fn position(&self, key: &BandKey) -> Result<usize> {
        self.bands
            .iter()
            .position(|band| key.matches(band))
            .ok_or_else(|| GradingError::NotFound(key.to_string()))
    }

    fn insert_sorted(&mut self, band: GradeBand) {
        let at = self
            .bands
            .partition_point(|existing| existing.lower_bound < band.lower_bound);
        self.bands.insert(at, band);
    }

    fn validate_band(&self, band: &GradeBand) -> Result<()> {
        let invalid = |reason: String| GradingError::InvalidBand {
            letter: band.letter.clone(),
            reason,
        };

        if band.letter.trim().is_empty() {
            return Err(invalid("letter must not be empty".into()));
        }
        if !(band.lower_bound.is_finite() && band.upper_bound.is_finite()) {
            return Err(invalid("bounds must be finite numbers".into()));
        }
        if band.lower_bound >= band.upper_bound {
            return Err(invalid(format!(
                "lower bound {} must be below upper bound {}",
                band.lower_bound, band.upper_bound
            )));
        }
        if band.lower_bound < self.domain.min || band.upper_bound > self.domain.max {
            return Err(invalid(format!(
                "range [{}, {}) leaves the domain {}..={}",
                band.lower_bound, band.upper_bound, self.domain.min, self.domain.max
            )));
        }
        if !band.gpa.is_finite() || band.gpa < 0.0 || band.gpa > self.max_gpa {
            return Err(invalid(format!(
                "GPA {} must be between 0 and {}",
                band.gpa, self.max_gpa
            )));
        }
        Ok(())
    }

    /// Rejects `band` if it collides with any band other than `skip`.
    /// Overlap takes precedence over a reused letter.
    fn check_fits(&self, band: &GradeBand, skip: Option<usize>) -> Result<()> {
        let others = || {
            self.bands
                .iter()
                .enumerate()
                .filter(move |(i, _)| Some(*i) != skip)
                .map(|(_, existing)| existing)
        };

        if let Some(existing) = others().find(|existing| existing.overlaps(band)) {
            return Err(GradingError::Overlap {
                letter: band.label(&self.domain),
                existing: existing.label(&self.domain),
            });
        }
        if others().any(|existing| existing.letter == band.letter) {
            return Err(GradingError::DuplicateLetter(band.letter.clone()));
        }
        Ok(())
    }
}
