use std::collections::HashSet;

use core_types::StoredFile;
use regex::{Regex, RegexBuilder};

use crate::view_models::Settings;

pub const HIDDEN_FILE_PATTERN: &str = r"^\.";
pub const BACKUP_FILE_PATTERNS: [&str; 2] = ["backup", "archive"];

/// File name patterns that are never reported as unused. Matching is case insensitive.
pub const DEFAULT_SKIP_PATTERNS: [&str; 6] = [
    HIDDEN_FILE_PATTERN,
    r"^thumbs\.db$",
    r"^\.ds_store$",
    r"^desktop\.ini$",
    "backup",
    "archive",
];

pub fn default_skip_patterns() -> Vec<String> {
    DEFAULT_SKIP_PATTERNS.iter().map(|p| p.to_string()).collect()
}

/// Decides which files are excluded from the unused set regardless of references.
#[derive(Debug, Clone)]
pub struct SkipFilter {
    patterns: Vec<Regex>,
    ignored_extensions: HashSet<String>,
}

impl SkipFilter {
    pub fn new(patterns: &[String], ignored_extensions: &[String]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            ignored_extensions: normalize_extensions(ignored_extensions),
        })
    }

    /// Builds the filter from settings. Invalid patterns are logged and left out.
    pub fn from_settings(settings: &Settings) -> Self {
        let patterns = settings
            .skip_patterns
            .iter()
            .filter(|pattern| {
                !(settings.include_hidden_files && pattern.as_str() == HIDDEN_FILE_PATTERN)
            })
            .filter(|pattern| {
                !(settings.include_backup_files
                    && BACKUP_FILE_PATTERNS.contains(&pattern.as_str()))
            })
            .filter_map(|pattern| match compile(pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Ignoring invalid skip pattern");
                    None
                }
            })
            .collect();
        Self {
            patterns,
            ignored_extensions: normalize_extensions(&settings.ignored_file_types),
        }
    }

    pub fn is_skipped(&self, file: &StoredFile) -> bool {
        if self.patterns.iter().any(|re| re.is_match(&file.file_name)) {
            return true;
        }
        file.extension()
            .is_some_and(|extension| self.ignored_extensions.contains(&extension))
    }
}

impl Default for SkipFilter {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn normalize_extensions(extensions: &[String]) -> HashSet<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
