// imgprep/src/utils/mod.rs
use crate::core::Result;
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];
pub const CONVERTIBLE_EXTENSIONS: [&str; 4] = ["png", "gif", "bmp", "webp"];
pub const JPEG_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// Suffix of the scratch files written next to an image during compression.
pub const TEMP_SUFFIX: &str = ".temp.jpg";

pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    get_file_extension(path)
        .map(|ext| extensions.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn is_supported_format(path: &Path) -> bool {
    has_extension(path, &IMAGE_EXTENSIONS)
}

pub fn is_convertible(path: &Path) -> bool {
    has_extension(path, &CONVERTIBLE_EXTENSIONS)
}

pub fn is_jpeg(path: &Path) -> bool {
    has_extension(path, &JPEG_EXTENSIONS) && !is_temp_file(path)
}

pub fn is_temp_file(path: &Path) -> bool {
    file_name(path).to_lowercase().ends_with(TEMP_SUFFIX)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<path>.temp.jpg`, or `<path>.<tag>.temp.jpg` when a tag is given.
pub fn temp_path(path: &Path, tag: Option<&str>) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    if let Some(tag) = tag {
        name.push(".");
        name.push(tag);
    }
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Size of a regular file, `None` when it is missing.
pub fn file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
}

pub fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Rounded kibibytes, for log lines only.
pub fn format_kib(bytes: u64) -> String {
    format!("{} KB", (bytes as f64 / 1024.0).round() as u64)
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let exponent = ((bytes as f64).log(1024.0).floor() as usize).min(UNITS.len() - 1);
    let size = bytes as f64 / 1024_f64.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}
