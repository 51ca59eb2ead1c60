pub mod events;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::string::ToString;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

pub type Sha1Checksum = [u8; 20];
pub type FileSize = u64;
pub type FileId = i64;
pub type CourseId = i64;
pub type ModuleId = i64;
pub type UserId = i64;

/// Filename the file store uses for directory marker entries.
pub const DIRECTORY_MARKER: &str = ".";

pub const COURSE_COMPONENT: &str = "course";
pub const MODULE_COMPONENT_PREFIX: &str = "mod_";

#[derive(Debug, Clone)]
pub enum CoreTypeError {
    ConversionError(String),
}

impl std::fmt::Display for CoreTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreTypeError::ConversionError(msg) => write!(f, "Conversion Error: {}", msg),
        }
    }
}

/// Owning scope of a stored file: either the course itself or one of its modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Scope {
    Course(CourseId),
    Module(ModuleId),
}

impl Scope {
    pub fn kind_to_db_int(&self) -> u8 {
        match self {
            Scope::Course(_) => 1,
            Scope::Module(_) => 2,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Scope::Course(id) | Scope::Module(id) => *id,
        }
    }

    pub fn from_db(kind: u8, id: i64) -> Result<Self, CoreTypeError> {
        match kind {
            1 => Ok(Scope::Course(id)),
            2 => Ok(Scope::Module(id)),
            _ => Err(CoreTypeError::ConversionError(format!(
                "Failed convert {} to Scope",
                kind
            ))),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Course(id) => write!(f, "course {}", id),
            Scope::Module(id) => write!(f, "module {}", id),
        }
    }
}

/// Component name the file store uses for files owned by a module of the given type.
pub fn module_component(module_type: &str) -> String {
    format!("{}{}", MODULE_COMPONENT_PREFIX, module_type)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: FileId,
    pub scope: Scope,
    pub component: String,
    pub file_area: String,
    pub item_id: i64,
    pub file_path: String,
    pub file_name: String,
    pub file_size: FileSize,
    pub mime_type: Option<String>,
    #[serde(with = "hex::serde")]
    pub content_hash: Sha1Checksum,
    pub time_created: DateTime<Utc>,
    pub time_modified: DateTime<Utc>,
}

impl StoredFile {
    pub fn is_directory(&self) -> bool {
        self.file_name == DIRECTORY_MARKER
    }

    /// Lower case extension of the file name, `None` when the name has no extension.
    pub fn extension(&self) -> Option<String> {
        let (stem, extension) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() && !extension.is_empty() && !self.file_name[1..].contains('.') {
            // dot files such as ".htaccess" have no extension
            return None;
        }
        if extension.is_empty() {
            None
        } else {
            Some(extension.to_lowercase())
        }
    }

    pub fn content_hash_hex(&self) -> String {
        hex::encode(self.content_hash)
    }
}

/// Activity instance in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub module_id: ModuleId,
    pub module_type: String,
    pub instance_id: i64,
    pub display_name: String,
}

impl ModuleInfo {
    pub fn scope(&self) -> Scope {
        Scope::Module(self.module_id)
    }

    pub fn component(&self) -> String {
        module_component(&self.module_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Capability {
    #[strum(serialize = "report/fileusechecker:view")]
    View,
    #[strum(serialize = "report/fileusechecker:delete")]
    Delete,
}

impl Capability {
    pub fn from_name(name: &str) -> Result<Self, CoreTypeError> {
        Capability::iter()
            .find(|capability| capability.to_string() == name)
            .ok_or_else(|| {
                CoreTypeError::ConversionError(format!("Unknown capability {}", name))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum SettingName {
    Enabled,
    CacheTtl,
    MaxFilesPerScan,
    FileSizeThreshold,
    AllowDeletion,
    RequireConfirmation,
    IncludeHiddenFiles,
    IncludeBackupFiles,
    IgnoredFileTypes,
    SkipPatterns,
    FileAreas,
}

impl SettingName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingName::Enabled => "enabled",
            SettingName::CacheTtl => "cache_ttl",
            SettingName::MaxFilesPerScan => "max_files_per_scan",
            SettingName::FileSizeThreshold => "file_size_threshold",
            SettingName::AllowDeletion => "allow_deletion",
            SettingName::RequireConfirmation => "require_confirmation",
            SettingName::IncludeHiddenFiles => "include_hidden_files",
            SettingName::IncludeBackupFiles => "include_backup_files",
            SettingName::IgnoredFileTypes => "ignored_file_types",
            SettingName::SkipPatterns => "skip_patterns",
            SettingName::FileAreas => "file_areas",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        SettingName::iter().find(|name| name.as_str() == key)
    }
}
