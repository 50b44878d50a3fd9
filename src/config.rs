//! Runtime settings read from the environment.
//!
//! `.env` is loaded by the binary before [`Settings::from_env`] runs, so
//! either source works:
//!
//! ```text
//! GRADING_SCALE_PATH=scales/alu.json
//! LOG_FILE_PATH=logs/alu_grade_calc.log
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::scale::{GradingScale, ScaleFormat};

pub const DEFAULT_LOG_FILE: &str = "logs/alu_grade_calc.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub scale_path: Option<PathBuf>,
    pub log_file_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            scale_path: get("GRADING_SCALE_PATH").map(PathBuf::from),
            log_file_path: get("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }

    /// Loads the configured scale, or the default ALU scale when none is set.
    pub fn load_scale(&self) -> Result<GradingScale> {
        match &self.scale_path {
            Some(path) => load_scale_file(path, None),
            None => Ok(GradingScale::alu()),
        }
    }
}

/// Reads a scale file, inferring the format from its extension unless given.
pub fn load_scale_file(path: &Path, format: Option<ScaleFormat>) -> Result<GradingScale> {
    let format = format.unwrap_or_else(|| ScaleFormat::from_path(path));
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scale file {}", path.display()))?;
    let scale = GradingScale::import_scale(&text, format)
        .with_context(|| format!("failed to import scale from {}", path.display()))?;

    info!(path = %path.display(), bands = scale.len(), "Loaded grading scale");
    Ok(scale)
}
