// imgprep/src/processors/compressor.rs
use crate::core::{ProcessConfig, ProcessingStats, Result};
use crate::processors::discovery::list_files;
use crate::processors::encoder::Encoder;
use crate::processors::renamer::NamingPattern;
use crate::utils::{file_name, format_kib, is_jpeg, remove_if_exists, temp_path};
use std::path::Path;

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionOutcome {
    SkippedNamed,
    SkippedSmall { size: u64 },
    Replaced { before: u64, after: u64, level: u8 },
    Unchanged { size: u64, best: Option<u64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Attempt {
    level: u8,
    size: u64,
}

/// Re-encodes JPEGs at increasingly lossy levels and keeps the smallest result.
pub struct Compressor<'a> {
    encoder: &'a dyn Encoder,
    config: &'a ProcessConfig,
    naming: Option<&'a NamingPattern>,
}

impl<'a> Compressor<'a> {
    pub fn new(encoder: &'a dyn Encoder, config: &'a ProcessConfig) -> Self {
        Self {
            encoder,
            config,
            naming: None,
        }
    }

    /// Files already matching `pattern` are treated as done.
    pub fn with_naming(mut self, pattern: Option<&'a NamingPattern>) -> Self {
        self.naming = pattern;
        self
    }

    pub fn compress_directory(&self, dir: &Path, stats: &mut ProcessingStats) -> Result<()> {
        for path in list_files(dir, is_jpeg)? {
            let outcome = match self.compress_file(&path, stats) {
                Ok(outcome) => outcome,
                Err(e) => {
                    stats.compression_failures += 1;
                    log::error!("Compression failed: {}: {}", file_name(&path), e);
                    stats.record_error(file_name(&path), e.to_string());
                    continue;
                }
            };

            match outcome {
                CompressionOutcome::SkippedNamed => stats.skipped_named += 1,
                CompressionOutcome::SkippedSmall { .. } => stats.skipped_small += 1,
                CompressionOutcome::Replaced { before, after, .. } => {
                    stats.compressed += 1;
                    stats.total_size_before += before;
                    stats.total_size_after += after;
                }
                CompressionOutcome::Unchanged { .. } => stats.unchanged += 1,
            }
        }
        Ok(())
    }

    pub fn compress_file(
        &self,
        path: &Path,
        stats: &mut ProcessingStats,
    ) -> Result<CompressionOutcome> {
        let name = file_name(path);

        if self.naming.map(|p| p.is_named(&name)).unwrap_or(false) {
            log::debug!("Skipping already named file: {}", name);
            return Ok(CompressionOutcome::SkippedNamed);
        }

        let size = std::fs::metadata(path)?.len();
        if size < self.config.min_file_size {
            log::debug!("Skipping small file: {} ({})", name, format_kib(size));
            return Ok(CompressionOutcome::SkippedSmall { size });
        }

        log::info!("Compressing: {} (size: {})", name, format_kib(size));

        let best_path = temp_path(path, None);
        let attempt_path = temp_path(path, Some("attempt"));
        let result = self.search(path, &best_path, &attempt_path, stats);

        let outcome = match result {
            Ok(Some(best)) if self.config.is_worth_replacing(size, best.size) => {
                std::fs::rename(&best_path, path)
                    .map(|_| {
                        log::info!(
                            "Compressed: {} ({} -> {}, q:v {})",
                            name,
                            format_kib(size),
                            format_kib(best.size),
                            best.level
                        );
                        CompressionOutcome::Replaced {
                            before: size,
                            after: best.size,
                            level: best.level,
                        }
                    })
                    .map_err(Into::into)
            }
            Ok(best) => {
                log::info!("Keeping original: {} (no worthwhile saving)", name);
                Ok(CompressionOutcome::Unchanged {
                    size,
                    best: best.map(|b| b.size),
                })
            }
            Err(e) => Err(e),
        };

        remove_if_exists(&attempt_path)?;
        remove_if_exists(&best_path)?;
        outcome
    }

    /// Walks the quality ladder, keeping the smallest output in `best_path`.
    /// The first failing level ends the search.
    fn search(
        &self,
        input: &Path,
        best_path: &Path,
        attempt_path: &Path,
        stats: &mut ProcessingStats,
    ) -> Result<Option<Attempt>> {
        let mut best: Option<Attempt> = None;

        for level in self.config.quality_ladder() {
            let size = match self.encoder.encode(input, attempt_path, level) {
                Ok(size) => size,
                Err(e) => {
                    stats.compression_failures += 1;
                    log::error!("Compression failed: {} at q:v {}: {}", file_name(input), level, e);
                    stats.record_error(file_name(input), e.to_string());
                    break;
                }
            };

            log::debug!("{} at q:v {}: {} bytes", file_name(input), level, size);

            if best.map(|b| size < b.size).unwrap_or(true) {
                std::fs::rename(attempt_path, best_path)?;
                best = Some(Attempt { level, size });
            }

            if best.map(|b| b.size <= self.config.target_size).unwrap_or(false) {
                break;
            }
        }

        Ok(best)
    }
}
