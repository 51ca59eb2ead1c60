use std::collections::HashMap;

use chrono::{DateTime, Utc};
use core_types::{FileId, FileSize, Scope, SettingName};
use serde::Serialize;

use crate::{file_areas::FileAreaTable, skip_filter::default_skip_patterns};

pub const DEFAULT_CACHE_TTL_SECONDS: i64 = 300;
/// Largest TTL a `chrono::Duration` can hold in seconds.
pub const MAX_CACHE_TTL_SECONDS: i64 = i64::MAX / 1000;
pub const DEFAULT_MAX_FILES_PER_SCAN: usize = 5000;
pub const DEFAULT_FILE_SIZE_THRESHOLD: FileSize = 1_048_576;
pub const DEFAULT_IGNORED_FILE_TYPES: &str = "bak,tmp,swp,lock,tmp~";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub enabled: bool,
    /// Zero disables caching.
    pub cache_ttl_seconds: i64,
    /// Zero means no limit.
    pub max_files_per_scan: usize,
    /// Files at or above this size are flagged as large.
    pub file_size_threshold: FileSize,
    pub allow_deletion: bool,
    pub require_confirmation: bool,
    pub include_hidden_files: bool,
    pub include_backup_files: bool,
    pub ignored_file_types: Vec<String>,
    pub skip_patterns: Vec<String>,
    pub file_areas: FileAreaTable,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            max_files_per_scan: DEFAULT_MAX_FILES_PER_SCAN,
            file_size_threshold: DEFAULT_FILE_SIZE_THRESHOLD,
            allow_deletion: true,
            require_confirmation: true,
            include_hidden_files: false,
            include_backup_files: false,
            ignored_file_types: split_list(DEFAULT_IGNORED_FILE_TYPES, ','),
            skip_patterns: default_skip_patterns(),
            file_areas: FileAreaTable::default(),
        }
    }
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parsed_or<T: std::str::FromStr>(map: &HashMap<String, String>, name: SettingName, default: T) -> T {
    match map.get(name.as_str()) {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(setting = name.as_str(), value = %value, "Invalid setting value, using default");
            default
        }),
    }
}

fn bool_or(map: &HashMap<String, String>, name: SettingName, default: bool) -> bool {
    match map.get(name.as_str()) {
        None => default,
        Some(value) => parse_bool(value).unwrap_or_else(|| {
            tracing::warn!(setting = name.as_str(), value = %value, "Invalid setting value, using default");
            default
        }),
    }
}

impl From<HashMap<String, String>> for Settings {
    fn from(map: HashMap<String, String>) -> Self {
        let defaults = Settings::default();
        let file_areas = match map.get(SettingName::FileAreas.as_str()) {
            None => defaults.file_areas,
            Some(json) => FileAreaTable::from_json(json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Invalid file area table, using default");
                FileAreaTable::default()
            }),
        };
        Self {
            enabled: bool_or(&map, SettingName::Enabled, defaults.enabled),
            cache_ttl_seconds: parsed_or(&map, SettingName::CacheTtl, defaults.cache_ttl_seconds)
                .clamp(0, MAX_CACHE_TTL_SECONDS),
            max_files_per_scan: parsed_or(
                &map,
                SettingName::MaxFilesPerScan,
                defaults.max_files_per_scan,
            ),
            file_size_threshold: parsed_or(
                &map,
                SettingName::FileSizeThreshold,
                defaults.file_size_threshold,
            ),
            allow_deletion: bool_or(&map, SettingName::AllowDeletion, defaults.allow_deletion),
            require_confirmation: bool_or(
                &map,
                SettingName::RequireConfirmation,
                defaults.require_confirmation,
            ),
            include_hidden_files: bool_or(
                &map,
                SettingName::IncludeHiddenFiles,
                defaults.include_hidden_files,
            ),
            include_backup_files: bool_or(
                &map,
                SettingName::IncludeBackupFiles,
                defaults.include_backup_files,
            ),
            ignored_file_types: map
                .get(SettingName::IgnoredFileTypes.as_str())
                .map(|value| split_list(value, ','))
                .unwrap_or(defaults.ignored_file_types),
            skip_patterns: map
                .get(SettingName::SkipPatterns.as_str())
                .map(|value| split_list(value, '\n'))
                .unwrap_or(defaults.skip_patterns),
            file_areas,
        }
    }
}

impl Settings {
    /// Key/value form as stored in the settings table.
    pub fn to_setting_map(&self) -> Result<HashMap<SettingName, String>, serde_json::Error> {
        Ok(HashMap::from([
            (SettingName::Enabled, self.enabled.to_string()),
            (SettingName::CacheTtl, self.cache_ttl_seconds.to_string()),
            (
                SettingName::MaxFilesPerScan,
                self.max_files_per_scan.to_string(),
            ),
            (
                SettingName::FileSizeThreshold,
                self.file_size_threshold.to_string(),
            ),
            (SettingName::AllowDeletion, self.allow_deletion.to_string()),
            (
                SettingName::RequireConfirmation,
                self.require_confirmation.to_string(),
            ),
            (
                SettingName::IncludeHiddenFiles,
                self.include_hidden_files.to_string(),
            ),
            (
                SettingName::IncludeBackupFiles,
                self.include_backup_files.to_string(),
            ),
            (
                SettingName::IgnoredFileTypes,
                self.ignored_file_types.join(","),
            ),
            (SettingName::SkipPatterns, self.skip_patterns.join("\n")),
            (
                SettingName::FileAreas,
                serde_json::to_string(&self.file_areas)?,
            ),
        ]))
    }
}

/// One unused file as presented in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnusedFileViewModel {
    pub file_id: FileId,
    pub file_name: String,
    pub file_path: String,
    pub file_size: FileSize,
    pub file_size_formatted: String,
    pub mime_type: Option<String>,
    pub scope: Scope,
    pub location: String,
    pub activity_type: String,
    pub file_area: String,
    pub time_created: DateTime<Utc>,
    pub is_large: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub course_id: i64,
    pub entries: Vec<UnusedFileViewModel>,
    pub scanned_file_count: usize,
    pub truncated: bool,
    pub notices: Vec<String>,
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub total_count: usize,
    pub total_size: FileSize,
    pub total_size_formatted: String,
    pub affected_location_count: usize,
    pub has_unused_files: bool,
}
