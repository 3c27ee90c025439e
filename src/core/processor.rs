// imgprep/src/core/processor.rs
use super::{PrepError, ProcessConfig, ProcessingStats, Result, RunConfig};
use crate::processors::{Compressor, Converter, Encoder, NamingPattern, Renamer};
use std::path::Path;

/// Runs conversion, compression and renaming over one target directory.
pub struct ImageProcessor<'a> {
    config: ProcessConfig,
    encoder: &'a dyn Encoder,
}

impl<'a> ImageProcessor<'a> {
    pub fn new(config: ProcessConfig, encoder: &'a dyn Encoder) -> Self {
        Self { config, encoder }
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    pub fn process(&self, run: &RunConfig) -> Result<ProcessingStats> {
        self.process_inner(run).map_err(|e| {
            e.context(format!(
                "Error while processing {}",
                run.target_dir().display()
            ))
        })
    }

    fn process_inner(&self, run: &RunConfig) -> Result<ProcessingStats> {
        self.config.validate()?;
        validate_target(run.target_dir())?;

        let pattern = run.prefix.as_deref().map(NamingPattern::new).transpose()?;
        let mut stats = ProcessingStats::default();

        log::info!("Processing directory: {}", run.target_dir().display());

        log::info!("=== Converting non-JPG images ===");
        Converter::new(self.encoder, self.config.conversion_quality)
            .convert_directory(run.target_dir(), &mut stats)?;

        log::info!(
            "=== Compressing JPG images over {} bytes ===",
            self.config.min_file_size
        );
        Compressor::new(self.encoder, &self.config)
            .with_naming(pattern.as_ref())
            .compress_directory(run.target_dir(), &mut stats)?;

        match pattern {
            Some(pattern) => {
                log::info!("=== Renaming images with prefix {} ===", pattern.prefix());
                Renamer::new(pattern).rename_directory(run.target_dir(), &mut stats)?;
            }
            None => log::info!("No prefix given, skipping rename"),
        }

        Ok(stats)
    }
}

fn validate_target(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(PrepError::InvalidParameter(format!(
            "Target directory does not exist: {}",
            dir.display()
        )));
    }

    if !dir.is_dir() {
        return Err(PrepError::InvalidParameter(format!(
            "Target path is not a directory: {}",
            dir.display()
        )));
    }

    Ok(())
}
