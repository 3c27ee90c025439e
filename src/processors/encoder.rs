// imgprep/src/processors/encoder.rs
use crate::core::{PrepError, Result, MAX_LEVEL, MIN_LEVEL};
use crate::utils::{file_size, remove_if_exists};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Re-encodes a raster image to JPEG at a quality level (1..=31, lower is better).
///
/// Returns the size of the written output. An implementation only reports
/// success once the output exists and is non-empty.
pub trait Encoder {
    fn encode(&self, input: &Path, output: &Path, level: u8) -> Result<u64>;
}

/// Checks the artifact an encoder left behind.
pub fn verify_output(output: &Path) -> Option<u64> {
    file_size(output).filter(|&size| size > 0)
}

/// Shells out to ffmpeg: `ffmpeg -i <input> -q:v <level> <output> -y`.
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, input: &Path, output: &Path, level: u8) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-i")
            .arg(input)
            .arg("-q:v")
            .arg(level.to_string())
            .arg(output)
            .arg("-y")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, input: &Path, output: &Path, level: u8) -> Result<u64> {
        log::debug!(
            "Running {} on {} at q:v {}",
            self.program.display(),
            input.display(),
            level
        );

        // a stale artifact must not pass for this run's output
        remove_if_exists(output)?;

        let status = self.command(input, output, level).status().map_err(|e| {
            PrepError::Encoder(format!(
                "Failed to execute {}: {}",
                self.program.display(),
                e
            ))
        })?;

        match verify_output(output) {
            Some(size) => {
                if !status.success() {
                    log::debug!(
                        "{} exited with {} but wrote {} bytes, keeping output",
                        self.program.display(),
                        status,
                        size
                    );
                }
                Ok(size)
            }
            None => Err(PrepError::Encoder(format!(
                "{} produced no output for {} ({})",
                self.program.display(),
                input.display(),
                status
            ))),
        }
    }
}

/// In-process encoder built on the `image` crate.
pub struct NativeEncoder;

impl NativeEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Maps the 1..=31 level scale onto JPEG quality 100..=1.
    pub fn jpeg_quality(level: u8) -> u8 {
        let level = level.clamp(MIN_LEVEL, MAX_LEVEL) as u32;
        (100 - (level - 1) * 99 / 30) as u8
    }

    fn write_jpeg(&self, image: &DynamicImage, output: &Path, level: u8) -> Result<()> {
        let file = File::create(output)?;
        let mut writer = BufWriter::new(file);
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, Self::jpeg_quality(level));
        // JPEG has no alpha channel
        let rgb = image.to_rgb8();
        encoder.encode_image(&rgb)?;
        writer.flush()?;
        Ok(())
    }
}

impl Default for NativeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for NativeEncoder {
    fn encode(&self, input: &Path, output: &Path, level: u8) -> Result<u64> {
        log::debug!("Encoding {} at level {}", input.display(), level);

        let image = image::open(input)?;
        if let Err(e) = self.write_jpeg(&image, output, level) {
            remove_if_exists(output)?;
            return Err(e);
        }

        verify_output(output).ok_or_else(|| {
            PrepError::Encoder(format!("Empty output for {}", input.display()))
        })
    }
}
