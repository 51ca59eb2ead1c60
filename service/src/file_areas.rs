use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which file areas belong to which module type, plus the course level areas.
///
/// Module areas listed here are scanned for files. Files in a listed area count as referenced
/// unless a reference rule governs that area for the module type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAreaTable {
    pub module_areas: HashMap<String, Vec<String>>,
    /// Used for module types missing from `module_areas`.
    pub fallback_areas: Vec<String>,
    pub course_scanned_areas: Vec<String>,
    /// Course level areas whose files are referenced by course content.
    pub course_referenced_areas: Vec<String>,
}

fn areas(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl Default for FileAreaTable {
    fn default() -> Self {
        let module_areas = HashMap::from([
            (
                "assign".to_string(),
                areas(&["intro", "introattachments", "submission_files", "feedback_files"]),
            ),
            ("book".to_string(), areas(&["intro", "chapter"])),
            ("forum".to_string(), areas(&["intro", "post", "attachment"])),
            ("glossary".to_string(), areas(&["intro", "entry", "attachment"])),
            ("resource".to_string(), areas(&["intro", "content"])),
            ("page".to_string(), areas(&["intro", "content"])),
            ("label".to_string(), areas(&["intro", "content"])),
            (
                "lesson".to_string(),
                areas(&["intro", "page_contents", "page_answers", "page_responses"]),
            ),
            ("quiz".to_string(), areas(&["intro", "question"])),
            ("scorm".to_string(), areas(&["intro", "content"])),
            ("url".to_string(), areas(&["intro"])),
        ]);
        Self {
            module_areas,
            fallback_areas: areas(&["intro", "content", "description"]),
            course_scanned_areas: areas(&["summary", "overviewfiles", "section", "legacy"]),
            course_referenced_areas: areas(&["summary", "overviewfiles", "section"]),
        }
    }
}

impl FileAreaTable {
    pub fn areas_for(&self, module_type: &str) -> &[String] {
        self.module_areas
            .get(module_type)
            .map(Vec::as_slice)
            .unwrap_or(&self.fallback_areas)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_fallback_areas() {
        let table = FileAreaTable::default();
        assert_eq!(table.areas_for("book"), ["intro", "chapter"]);
        assert_eq!(table.areas_for("wiki"), ["intro", "content", "description"]);
        assert!(table.course_scanned_areas.contains(&"legacy".to_string()));
        assert!(!table.course_referenced_areas.contains(&"legacy".to_string()));
    }

    #[test]
    fn test_partial_json_keeps_defaults_for_missing_fields() {
        let table =
            FileAreaTable::from_json(r#"{"module_areas": {"wiki": ["intro", "attachments"]}}"#)
                .unwrap();
        assert_eq!(table.areas_for("wiki"), ["intro", "attachments"]);
        // replaced map, so book now falls back
        assert_eq!(table.areas_for("book"), ["intro", "content", "description"]);
        assert_eq!(
            table.course_scanned_areas,
            FileAreaTable::default().course_scanned_areas
        );
    }
}
