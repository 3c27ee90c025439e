// imgprep/src/processors/mod.rs
mod compressor;
mod converter;
mod discovery;
mod encoder;
mod renamer;

pub use compressor::{CompressionOutcome, Compressor};
pub use converter::Converter;
pub use discovery::{collect_image_files, list_files, Discovery, ProcessingTarget};
pub use encoder::{verify_output, Encoder, FfmpegEncoder, NativeEncoder};
pub use renamer::{NamingPattern, NamingState, Renamer};
