// imgprep/src/processors/discovery.rs
use crate::core::{PrepError, Result};
use crate::utils::{file_name, is_supported_format, is_temp_file};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory that can be picked in the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingTarget {
    pub path: PathBuf,
    pub label: String,
    pub file_count: usize,
}

/// Lists the base directory and its immediate subdirectories that hold images.
pub struct Discovery {
    base_dir: PathBuf,
}

impl Discovery {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Base directory first, then subdirectories in enumeration order.
    /// Candidates without images are left out.
    pub fn discover(&self) -> Result<Vec<ProcessingTarget>> {
        if !self.base_dir.is_dir() {
            return Err(PrepError::BaseDirMissing(self.base_dir.clone()));
        }

        let mut targets = Vec::new();

        let root_count = collect_image_files(&self.base_dir).len();
        if root_count > 0 {
            targets.push(ProcessingTarget {
                path: self.base_dir.clone(),
                label: format!("Root directory ({} files)", root_count),
                file_count: root_count,
            });
        }

        for dir in self.subdirectories() {
            let count = collect_image_files(&dir).len();
            if count == 0 {
                log::debug!("Skipping {} (no images)", dir.display());
                continue;
            }

            targets.push(ProcessingTarget {
                label: format!("~/{} ({} files)", file_name(&dir), count),
                path: dir,
                file_count: count,
            });
        }

        Ok(targets)
    }

    fn subdirectories(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for entry in entries(&self.base_dir) {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => dirs.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => log::warn!("Failed to read entry in {}: {}", self.base_dir.display(), e),
            }
        }
        dirs
    }
}

fn entries(dir: &Path) -> walkdir::IntoIter {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
}

/// Eligible images directly inside `dir`. An unreadable directory yields none.
pub fn collect_image_files(dir: &Path) -> Vec<PathBuf> {
    entries(dir)
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_supported_format(entry.path()) && !is_temp_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Regular files directly inside `dir` matching `predicate`, sorted by name.
pub fn list_files<F>(dir: &Path, predicate: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && predicate(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
