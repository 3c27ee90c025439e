// imgprep/src/processors/renamer.rs
use crate::core::{PrepError, ProcessingStats, Result};
use crate::processors::discovery::list_files;
use crate::utils::{file_name, is_jpeg};
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf};

/// `<prefix><N>.jpg` / `<prefix><N>.jpeg`, matched case-insensitively.
#[derive(Debug, Clone)]
pub struct NamingPattern {
    prefix: String,
    regex: Regex,
}

impl NamingPattern {
    pub fn new(prefix: &str) -> Result<Self> {
        let regex = RegexBuilder::new(&format!(r"^{}([0-9]+)\.(jpg|jpeg)$", regex::escape(prefix)))
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                PrepError::InvalidParameter(format!("Invalid prefix {:?}: {}", prefix, e))
            })?;

        Ok(Self {
            prefix: prefix.to_string(),
            regex,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Sequence number of an already named file.
    pub fn sequence_number(&self, name: &str) -> Option<u64> {
        self.regex
            .captures(name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn file_name(&self, number: u64, extension: &str) -> String {
        format!("{}{}.{}", self.prefix, number, extension)
    }
}

/// Next free sequence number for one run, `None` once `u64` is used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingState {
    next: Option<u64>,
}

impl NamingState {
    pub fn starting_at(next: u64) -> Self {
        Self { next: Some(next) }
    }

    /// Seeds from the highest `<prefix><N>` in `dir`, starting at 1 if none.
    pub fn scan(dir: &Path, pattern: &NamingPattern) -> Result<Self> {
        let max = list_files(dir, is_jpeg)?
            .iter()
            .filter_map(|path| pattern.sequence_number(&file_name(path)))
            .max()
            .unwrap_or(0);

        Ok(Self {
            next: max.checked_add(1),
        })
    }

    pub fn peek(&self) -> Option<u64> {
        self.next
    }

    pub fn advance(&mut self) -> Option<u64> {
        let current = self.next?;
        self.next = current.checked_add(1);
        Some(current)
    }
}

impl Default for NamingState {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

pub struct Renamer {
    pattern: NamingPattern,
}

impl Renamer {
    pub fn new(pattern: NamingPattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> &NamingPattern {
        &self.pattern
    }

    /// Gives every unnamed JPEG the next number, in filename order.
    pub fn rename_directory(&self, dir: &Path, stats: &mut ProcessingStats) -> Result<()> {
        let mut state = NamingState::scan(dir, &self.pattern)?;
        match state.peek() {
            Some(next) => log::info!("Numbering starts at {}", next),
            None => log::warn!("No sequence numbers left for prefix {}", self.pattern.prefix()),
        }

        for path in list_files(dir, is_jpeg)? {
            let name = file_name(&path);
            if self.pattern.is_named(&name) {
                log::info!("Skipping already named file: {}", name);
                continue;
            }

            match self.rename_file(dir, &path, &mut state) {
                Ok(target) => {
                    stats.renamed += 1;
                    log::info!("Renamed: {} -> {}", name, file_name(&target));
                }
                Err(e) => {
                    log::error!("Rename failed: {}: {}", name, e);
                    stats.record_error(name, e.to_string());
                }
            }
        }

        Ok(())
    }

    fn rename_file(&self, dir: &Path, source: &Path, state: &mut NamingState) -> Result<PathBuf> {
        let target = self.next_free_path(dir, source, state)?;
        std::fs::rename(source, &target)?;
        Ok(target)
    }

    fn next_free_path(
        &self,
        dir: &Path,
        source: &Path,
        state: &mut NamingState,
    ) -> Result<PathBuf> {
        // keep the original extension spelling
        let extension = source
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "jpg".to_string());

        while let Some(number) = state.advance() {
            let candidate = dir.join(self.pattern.file_name(number, &extension));
            if !candidate.exists() {
                return Ok(candidate);
            }
            log::warn!("{} already exists, trying next number", candidate.display());
        }

        Err(PrepError::InvalidParameter(format!(
            "no sequence numbers left for prefix {}",
            self.pattern.prefix()
        )))
    }
}
