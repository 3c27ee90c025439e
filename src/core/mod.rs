// imgprep/src/core/mod.rs
pub mod processor;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use processor::ImageProcessor;

/// Numeric knobs for the conversion and compression stages.
///
/// Quality levels use the encoder's 1..=31 scale where lower is better.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub conversion_quality: u8,
    pub start_quality: u8,
    pub quality_step: u8,
    pub max_quality: u8,
    pub max_attempts: usize,
    pub min_file_size: u64,
    pub target_size: u64,
    pub min_saving_bytes: u64,
    pub min_saving_percent: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            conversion_quality: 2,
            start_quality: 20,
            quality_step: 3,
            max_quality: 31,
            max_attempts: 8,
            min_file_size: 10_240,
            target_size: 30_720,
            min_saving_bytes: 1_024,
            min_saving_percent: 1,
        }
    }
}

impl ProcessConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, level) in [
            ("conversion quality", self.conversion_quality),
            ("start quality", self.start_quality),
            ("max quality", self.max_quality),
        ] {
            if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
                return Err(PrepError::InvalidParameter(format!(
                    "{} must be between {} and {}, got {}",
                    name, MIN_LEVEL, MAX_LEVEL, level
                )));
            }
        }

        if self.start_quality > self.max_quality {
            return Err(PrepError::InvalidParameter(
                "Start quality cannot exceed max quality".to_string(),
            ));
        }

        if self.quality_step == 0 {
            return Err(PrepError::InvalidParameter(
                "Quality step must be at least 1".to_string(),
            ));
        }

        if self.max_attempts == 0 {
            return Err(PrepError::InvalidParameter(
                "At least one compression attempt is required".to_string(),
            ));
        }

        if self.min_saving_percent > 100 {
            return Err(PrepError::InvalidParameter(
                "Minimum saving percent must be between 0 and 100".to_string(),
            ));
        }

        Ok(())
    }

    /// Quality levels tried by the compression loop, in order.
    pub fn quality_ladder(&self) -> Vec<u8> {
        (self.start_quality..=self.max_quality)
            .step_by(self.quality_step as usize)
            .take(self.max_attempts)
            .collect()
    }

    /// True when going from `original` to `best` bytes is worth a rewrite.
    pub fn is_worth_replacing(&self, original: u64, best: u64) -> bool {
        if best >= original {
            return false;
        }
        let saved = original - best;
        saved >= self.min_saving_bytes || saved * 100 >= original * self.min_saving_percent
    }
}

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 31;

/// Settings for one run, fixed once the prompts are answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub target_dir: PathBuf,
    /// `None` turns the rename stage off.
    pub prefix: Option<String>,
}

impl RunConfig {
    pub fn new(target_dir: impl Into<PathBuf>, prefix: Option<String>) -> Self {
        Self {
            target_dir: target_dir.into(),
            prefix: prefix.filter(|p| !p.is_empty()),
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn renaming_enabled(&self) -> bool {
        self.prefix.is_some()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub converted: usize,
    pub conversion_failures: usize,
    pub compressed: usize,
    pub skipped_small: usize,
    pub skipped_named: usize,
    pub unchanged: usize,
    pub compression_failures: usize,
    pub renamed: usize,
    pub total_size_before: u64,
    pub total_size_after: u64,
    pub errors: Vec<(String, String)>,
}

impl ProcessingStats {
    pub fn record_error(&mut self, file: impl Into<String>, message: impl Into<String>) {
        self.errors.push((file.into(), message.into()));
    }

    /// Percent saved by the compression stage over the files it rewrote.
    pub fn overall_savings(&self) -> f64 {
        if self.total_size_before == 0 {
            return 0.0;
        }

        let savings = (self.total_size_before as f64 - self.total_size_after as f64)
            / self.total_size_before as f64
            * 100.0;
        savings.clamp(0.0, 100.0)
    }
}

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Base image directory does not exist: {}", .0.display())]
    BaseDirMissing(PathBuf),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("{context}: {source}")]
    Pipeline {
        context: String,
        #[source]
        source: Box<PrepError>,
    },
}

impl PrepError {
    pub fn context(self, context: impl Into<String>) -> Self {
        PrepError::Pipeline {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;

pub fn validate_config(config: &ProcessConfig) -> Result<()> {
    config.validate()
}
