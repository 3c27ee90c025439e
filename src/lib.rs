pub mod cli;
mod core;
mod processors;
mod utils;

pub use crate::cli::{run_session, CancelReason, Cli, EncoderKind, Session, SessionOutcome, Step};
pub use crate::core::{
    validate_config, ImageProcessor, PrepError, ProcessConfig, ProcessingStats, Result, RunConfig,
};
pub use crate::processors::{
    collect_image_files, list_files, verify_output, CompressionOutcome, Compressor, Converter,
    Discovery, Encoder, FfmpegEncoder, NamingPattern, NamingState, NativeEncoder,
    ProcessingTarget, Renamer,
};
pub use crate::utils::{
    file_name, format_file_size, format_kib, get_file_extension, is_convertible, is_jpeg,
    is_supported_format, is_temp_file, TEMP_SUFFIX,
};

pub mod prelude {
    pub use crate::{
        Compressor, Converter, Discovery, Encoder, ImageProcessor, ProcessConfig, Renamer,
        RunConfig,
    };
}
