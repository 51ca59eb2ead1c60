use core_types::{CourseId, Scope};
use serde::Serialize;

/// Diagnostic attached to a scan or analysis whose result is partial.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanNotice {
    ModuleListUnavailable {
        course_id: CourseId,
        message: String,
    },
    AreaUnavailable {
        scope: Scope,
        file_area: String,
        message: String,
    },
    ReferencesUnresolved {
        scope: Scope,
        file_area: String,
        message: String,
    },
    Truncated {
        limit: usize,
    },
}

impl std::fmt::Display for ScanNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanNotice::ModuleListUnavailable { course_id, message } => write!(
                f,
                "Activities of course {} could not be listed, only course files were checked: {}",
                course_id, message
            ),
            ScanNotice::AreaUnavailable {
                scope,
                file_area,
                message,
            } => write!(
                f,
                "Files in area '{}' of {} could not be listed: {}",
                file_area, scope, message
            ),
            ScanNotice::ReferencesUnresolved {
                scope,
                file_area,
                message,
            } => write!(
                f,
                "References in area '{}' of {} could not be resolved, its files are not reported: {}",
                file_area, scope, message
            ),
            ScanNotice::Truncated { limit } => write!(
                f,
                "Scan stopped after {} files, results are incomplete",
                limit
            ),
        }
    }
}
