// imgprep/src/cli/mod.rs
pub mod interactive;

use crate::processors::{Encoder, FfmpegEncoder, NativeEncoder};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub use interactive::{run_session, CancelReason, Session, SessionOutcome, Step};

#[derive(Parser, Debug)]
#[command(name = "imgprep")]
#[command(about = "Convert, compress and rename site images", long_about = None)]
pub struct Cli {
    /// Image directory whose root and immediate subdirectories are offered
    #[arg(long, default_value = "static/img")]
    pub base_dir: PathBuf,

    /// Encoder backend
    #[arg(long, value_enum, default_value_t = EncoderKind::Ffmpeg)]
    pub encoder: EncoderKind,

    /// ffmpeg executable used by the ffmpeg backend
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EncoderKind {
    Ffmpeg,
    Native,
}

impl Cli {
    pub fn build_encoder(&self) -> Box<dyn Encoder> {
        match self.encoder {
            EncoderKind::Ffmpeg => Box::new(FfmpegEncoder::with_program(&self.ffmpeg)),
            EncoderKind::Native => Box::new(NativeEncoder::new()),
        }
    }
}
