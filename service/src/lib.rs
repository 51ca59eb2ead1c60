pub mod access_control;
pub mod app_services;
pub mod audit;
pub mod clock;
pub mod content_graph;
pub mod course_catalog;
pub mod error;
pub mod file_areas;
pub mod file_deletion;
pub mod file_storage;
pub mod pipeline;
pub mod reference_resolver;
pub mod reference_rules;
pub mod report_service;
pub mod scan_notice;
pub mod scan_cache;
pub mod settings_service;
pub mod skip_filter;
pub mod unused_file_scanner;
pub mod usage_analyzer;
pub mod view_models;

#[cfg(test)]
mod test_fixtures;
