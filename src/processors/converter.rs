// imgprep/src/processors/converter.rs
use crate::core::{PrepError, ProcessingStats, Result};
use crate::processors::discovery::list_files;
use crate::processors::encoder::{verify_output, Encoder};
use crate::utils::{file_name, is_convertible, remove_if_exists};
use std::path::{Path, PathBuf};

/// Turns PNG/GIF/BMP/WebP files into sibling `.jpg` files.
pub struct Converter<'a> {
    encoder: &'a dyn Encoder,
    quality: u8,
}

impl<'a> Converter<'a> {
    pub fn new(encoder: &'a dyn Encoder, quality: u8) -> Self {
        Self { encoder, quality }
    }

    pub fn convert_directory(&self, dir: &Path, stats: &mut ProcessingStats) -> Result<()> {
        for path in list_files(dir, is_convertible)? {
            match self.convert_file(&path) {
                Ok(output) => {
                    stats.converted += 1;
                    log::info!("Removed original: {}", file_name(&path));
                    log::debug!("Converted {} -> {}", path.display(), output.display());
                }
                Err(e) => {
                    stats.conversion_failures += 1;
                    log::error!("Conversion failed: {}: {}", file_name(&path), e);
                    stats.record_error(file_name(&path), e.to_string());
                }
            }
        }
        Ok(())
    }

    /// Converts one file and deletes the original once the output checks out.
    pub fn convert_file(&self, input: &Path) -> Result<PathBuf> {
        let output = input.with_extension("jpg");
        if output.exists() {
            return Err(PrepError::InvalidParameter(format!(
                "{} already exists",
                file_name(&output)
            )));
        }

        log::info!("Converting: {} -> {}", file_name(input), file_name(&output));

        let encoded = self
            .encoder
            .encode(input, &output, self.quality)
            .and_then(|_| {
                verify_output(&output).ok_or_else(|| {
                    PrepError::Encoder(format!("no usable output for {}", file_name(input)))
                })
            });

        match encoded {
            Ok(_) => {
                std::fs::remove_file(input)?;
                Ok(output)
            }
            Err(e) => {
                remove_if_exists(&output)?;
                Err(e)
            }
        }
    }
}
