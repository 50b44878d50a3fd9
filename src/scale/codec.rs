//! Text encodings for exporting and importing a [`GradingScale`].
//!
//! Two formats are supported:
//!
//! ```json
//! {
//!   "domain": { "min": 0.0, "max": 100.0 },
//!   "max_gpa": 5.0,
//!   "bands": [
//!     { "lower_bound": 0.0, "upper_bound": 40.0, "gpa": 1.0, "letter": "F", "is_passing": false }
//!   ]
//! }
//! ```
//!
//! and a CSV table with the header `lower_bound,upper_bound,gpa,letter,is_passing`
//! that always uses the default 0–100 domain and 5.0 maximum GPA.
//!
//! Import decodes everything first and only then builds a fresh scale, so a
//! bad document never yields a half-loaded table.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

use super::{DEFAULT_MAX_GPA, GradeBand, GradingError, GradingScale, Result, ScoreDomain};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleFormat {
    #[default]
    Json,
    Csv,
}

impl ScaleFormat {
    /// Picks CSV for a `.csv` extension and JSON for anything else.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ScaleFormat::Csv,
            _ => ScaleFormat::Json,
        }
    }
}

impl FromStr for ScaleFormat {
    type Err = GradingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ScaleFormat::Json),
            "csv" => Ok(ScaleFormat::Csv),
            other => Err(GradingError::MalformedData(format!(
                "unknown scale format {other:?} (expected json or csv)"
            ))),
        }
    }
}

fn default_max_gpa() -> f64 {
    DEFAULT_MAX_GPA
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScaleDocument {
    #[serde(default)]
    domain: ScoreDomain,
    #[serde(default = "default_max_gpa")]
    max_gpa: f64,
    bands: Vec<GradeBand>,
}

impl GradingScale {
    /// Serializes all bands in ascending `lower_bound` order.
    pub fn export_scale(&self, format: ScaleFormat) -> Result<String> {
        match format {
            ScaleFormat::Json => {
                let doc = ScaleDocument {
                    domain: self.domain(),
                    max_gpa: self.max_gpa(),
                    bands: self.bands().to_vec(),
                };
                serde_json::to_string_pretty(&doc).map_err(|e| GradingError::Encode(e.to_string()))
            }
            ScaleFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                for band in self.bands() {
                    writer
                        .serialize(band)
                        .map_err(|e| GradingError::Encode(e.to_string()))?;
                }
                let bytes = writer
                    .into_inner()
                    .map_err(|e| GradingError::Encode(e.to_string()))?;
                String::from_utf8(bytes).map_err(|e| GradingError::Encode(e.to_string()))
            }
        }
    }

    /// Parses `text` into a new, fully validated scale.
    ///
    /// # Errors
    ///
    /// [`GradingError::MalformedData`] if the text does not decode into valid
    /// band records, [`GradingError::Overlap`] if the decoded bands intersect.
    pub fn import_scale(text: &str, format: ScaleFormat) -> Result<Self> {
        let doc = match format {
            ScaleFormat::Json => serde_json::from_str::<ScaleDocument>(text)
                .map_err(|e| GradingError::MalformedData(e.to_string()))?,
            ScaleFormat::Csv => ScaleDocument {
                domain: ScoreDomain::default(),
                max_gpa: DEFAULT_MAX_GPA,
                bands: decode_csv_bands(text)?,
            },
        };

        if doc.bands.is_empty() {
            return Err(GradingError::MalformedData("scale has no bands".into()));
        }

        // A band that decodes but cannot stand is bad data; overlaps keep their own kind.
        let scale =
            GradingScale::from_bands(doc.domain, doc.max_gpa, doc.bands).map_err(|e| match e {
                GradingError::InvalidBand { .. } | GradingError::DuplicateLetter(_) => {
                    GradingError::MalformedData(e.to_string())
                }
                other => other,
            })?;
        debug!(bands = scale.len(), ?format, "Imported grading scale");

        for (from, to) in scale.coverage_gaps() {
            warn!(from, to, "Grading scale leaves scores uncovered");
        }
        Ok(scale)
    }
}

fn decode_csv_bands(text: &str) -> Result<Vec<GradeBand>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .deserialize::<GradeBand>()
        .enumerate()
        .map(|(row, record)| {
            record.map_err(|e| GradingError::MalformedData(format!("row {}: {e}", row + 1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::BandKey;

    const PROBES: &[f64] = &[0.0, 12.5, 39.99, 40.0, 50.0, 64.9, 80.0, 89.99, 90.0, 98.0, 100.0];

    fn edited_scale() -> GradingScale {
        let mut scale = GradingScale::alu();
        scale.remove_band(&BandKey::letter("D")).unwrap();
        scale
            .add_band(GradeBand::new("E", 40.0, 50.0, 1.7, false))
            .unwrap();
        scale
            .update_band(
                &BandKey::letter("A"),
                GradeBand::new("A", 90.0, 98.0, 4.85, true),
            )
            .unwrap();
        scale
    }

    #[test]
    fn test_json_export_import_preserves_lookups() {
        let scale = edited_scale();
        let text = scale.export_scale(ScaleFormat::Json).unwrap();
        let imported = GradingScale::import_scale(&text, ScaleFormat::Json).unwrap();

        assert_eq!(imported, scale);
        for &probe in PROBES {
            assert_eq!(imported.lookup(probe), scale.lookup(probe));
        }
    }

    #[test]
    fn test_csv_export_import_preserves_lookups() {
        let scale = edited_scale();
        let text = scale.export_scale(ScaleFormat::Csv).unwrap();
        let imported = GradingScale::import_scale(&text, ScaleFormat::Csv).unwrap();

        assert_eq!(imported, scale);
        for &probe in PROBES {
            assert_eq!(imported.lookup(probe), scale.lookup(probe));
        }
    }

    #[test]
    fn test_csv_export_is_ascending_with_header() {
        let text = GradingScale::alu().export_scale(ScaleFormat::Csv).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("lower_bound,upper_bound,gpa,letter,is_passing")
        );
        assert!(lines.next().unwrap().ends_with(",F,false"));
        assert!(lines.last().unwrap().ends_with(",A+,true"));
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        for text in [
            "not json",
            r#"{"bands": [{"lower_bound": 0, "upper_bound": 100, "gpa": 1.0}]}"#,
            r#"{"bands": [], "extra": 1}"#,
            r#"{"bands": []}"#,
        ] {
            assert!(
                matches!(
                    GradingScale::import_scale(text, ScaleFormat::Json),
                    Err(GradingError::MalformedData(_))
                ),
                "{text} should be malformed"
            );
        }
    }

    #[test]
    fn test_import_rejects_overlapping_bands() {
        let text = r#"{
            "bands": [
                {"lower_bound": 0, "upper_bound": 60, "gpa": 1.0, "letter": "F", "is_passing": false},
                {"lower_bound": 50, "upper_bound": 100, "gpa": 4.0, "letter": "P", "is_passing": true}
            ]
        }"#;

        assert!(matches!(
            GradingScale::import_scale(text, ScaleFormat::Json),
            Err(GradingError::Overlap { .. })
        ));
    }

    #[test]
    fn test_import_rejects_invalid_decoded_bands_as_malformed() {
        let inverted = r#"{"bands": [
            {"lower_bound": 50, "upper_bound": 10, "gpa": 1.0, "letter": "F", "is_passing": false}
        ]}"#;
        let too_high = "lower_bound,upper_bound,gpa,letter,is_passing\n0,100,6.5,A,true\n";
        let repeated = "lower_bound,upper_bound,gpa,letter,is_passing\n0,50,1.0,F,false\n50,100,4.0,F,true\n";

        for (text, format) in [
            (inverted, ScaleFormat::Json),
            (too_high, ScaleFormat::Csv),
            (repeated, ScaleFormat::Csv),
        ] {
            match GradingScale::import_scale(text, format) {
                Err(GradingError::MalformedData(_)) => {}
                other => panic!("expected malformed data for {text}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_import_csv_reports_bad_row() {
        let text = "lower_bound,upper_bound,gpa,letter,is_passing\n0,50,1.0,F,false\n50,abc,4.0,P,true\n";

        let err = GradingScale::import_scale(text, ScaleFormat::Csv).unwrap_err();
        match err {
            GradingError::MalformedData(msg) => assert!(msg.starts_with("row 2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_import_json_uses_defaults_and_custom_domain() {
        let defaults = r#"{"bands": [
            {"lower_bound": 0, "upper_bound": 100, "gpa": 5.0, "letter": "P", "is_passing": true}
        ]}"#;
        let scale = GradingScale::import_scale(defaults, ScaleFormat::Json).unwrap();
        assert_eq!(scale.domain(), ScoreDomain::PERCENT);
        assert_eq!(scale.max_gpa(), DEFAULT_MAX_GPA);

        let custom = r#"{"domain": {"min": 0, "max": 20}, "max_gpa": 4.0, "bands": [
            {"lower_bound": 0, "upper_bound": 10, "gpa": 0.0, "letter": "F", "is_passing": false},
            {"lower_bound": 10, "upper_bound": 20, "gpa": 4.0, "letter": "P", "is_passing": true}
        ]}"#;
        let scale = GradingScale::import_scale(custom, ScaleFormat::Json).unwrap();
        assert_eq!(scale.lookup(20.0).unwrap().letter, "P");
        assert!(matches!(
            scale.lookup(50.0),
            Err(GradingError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_format_from_path_and_str() {
        assert_eq!(ScaleFormat::from_path("scale.CSV"), ScaleFormat::Csv);
        assert_eq!(ScaleFormat::from_path("scale.json"), ScaleFormat::Json);
        assert_eq!(ScaleFormat::from_path("scale"), ScaleFormat::Json);
        assert_eq!("csv".parse::<ScaleFormat>().unwrap(), ScaleFormat::Csv);
        assert!("yaml".parse::<ScaleFormat>().is_err());
    }
}
