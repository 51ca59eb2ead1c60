use std::collections::HashSet;

use core_types::{
    Capability,
    events::{AuditEventType, AuditRecord},
};

use crate::{
    error::Error,
    file_deletion::{
        context::DeletionContext,
        model::{FileDeletionResult, FileDeletionStatus},
    },
    pipeline::{PipelineStep, StepAction},
    unused_file_scanner::FileStatus,
};

/// Step 1: The actor must hold the delete capability on the course
pub struct ValidateCapabilityStep;

#[async_trait::async_trait]
impl PipelineStep<DeletionContext> for ValidateCapabilityStep {
    fn name(&self) -> &'static str {
        "validate_capability"
    }

    async fn execute(&self, context: &mut DeletionContext) -> StepAction {
        let capability = Capability::Delete;
        if context
            .access
            .has_capability(context.actor_id, capability, context.course_id)
            .await
        {
            StepAction::Continue
        } else {
            tracing::warn!(
                actor_id = context.actor_id,
                course_id = context.course_id,
                "Deletion requested without {}",
                capability
            );
            StepAction::Abort(Error::NotAuthorized(format!(
                "User {} lacks {} on course {}",
                context.actor_id, capability, context.course_id
            )))
        }
    }
}

/// Step 2: Reject empty or malformed requests and collapse duplicate ids
pub struct ValidateRequestStep;

#[async_trait::async_trait]
impl PipelineStep<DeletionContext> for ValidateRequestStep {
    fn name(&self) -> &'static str {
        "validate_request"
    }

    async fn execute(&self, context: &mut DeletionContext) -> StepAction {
        if context.requested_ids.is_empty() {
            return StepAction::Abort(Error::InvalidInput("No files selected".to_string()));
        }
        if let Some(id) = context.requested_ids.iter().find(|id| **id <= 0) {
            return StepAction::Abort(Error::InvalidInput(format!("Invalid file id {}", id)));
        }

        let mut seen = HashSet::new();
        context.deletion_results = context
            .requested_ids
            .iter()
            .filter(|id| seen.insert(**id))
            .map(|id| FileDeletionResult::new(*id))
            .collect();
        tracing::info!(
            course_id = context.course_id,
            requested = context.requested_ids.len(),
            distinct = context.deletion_results.len(),
            "Deletion request accepted"
        );
        StepAction::Continue
    }
}

/// Step 3: Build a fresh content graph; cached scans are never trusted for deletion
pub struct BuildContentGraphStep;

#[async_trait::async_trait]
impl PipelineStep<DeletionContext> for BuildContentGraphStep {
    fn name(&self) -> &'static str {
        "build_content_graph"
    }

    async fn execute(&self, context: &mut DeletionContext) -> StepAction {
        match context.scanner.content_graph(context.course_id).await {
            Ok(graph) => {
                context.graph = Some(graph);
                StepAction::Continue
            }
            Err(e) => {
                tracing::error!(
                    course_id = context.course_id,
                    error = %e,
                    "Cannot verify files without the course content graph"
                );
                StepAction::Abort(e)
            }
        }
    }
}

/// Step 4: Fetch every requested file; missing files and files of other courses are not found
pub struct FetchFilesStep;

#[async_trait::async_trait]
impl PipelineStep<DeletionContext> for FetchFilesStep {
    fn name(&self) -> &'static str {
        "fetch_files"
    }

    async fn execute(&self, context: &mut DeletionContext) -> StepAction {
        let Some(graph) = context.graph.as_ref() else {
            return StepAction::Abort(Error::StorageLookupFailure(
                "Content graph missing".to_string(),
            ));
        };

        for result in context.deletion_results.iter_mut() {
            match context.storage.get_file(result.file_id).await {
                Ok(Some(file)) if graph.locate(file.scope).is_some() => {
                    result.file = Some(file);
                }
                Ok(Some(file)) => {
                    tracing::warn!(
                        file_id = result.file_id,
                        scope = %file.scope,
                        course_id = context.course_id,
                        "Requested file belongs to another course"
                    );
                    result.status = FileDeletionStatus::NotFound;
                }
                Ok(None) => {
                    tracing::info!(file_id = result.file_id, "Requested file no longer exists");
                    result.status = FileDeletionStatus::NotFound;
                }
                Err(e) => {
                    tracing::error!(file_id = result.file_id, error = %e, "File lookup failed");
                    result.status = FileDeletionStatus::Failed(e.to_string());
                }
            }
        }
        StepAction::Continue
    }
}

/// Step 5: Re-run the single file check so files referenced since the scan are kept
pub struct VerifyStillUnusedStep;

#[async_trait::async_trait]
impl PipelineStep<DeletionContext> for VerifyStillUnusedStep {
    fn name(&self) -> &'static str {
        "verify_still_unused"
    }

    fn should_execute(&self, context: &DeletionContext) -> bool {
        context
            .deletion_results
            .iter()
            .any(FileDeletionResult::is_pending_with_file)
    }

    async fn execute(&self, context: &mut DeletionContext) -> StepAction {
        let Some(graph) = context.graph.as_ref() else {
            return StepAction::Abort(Error::StorageLookupFailure(
                "Content graph missing".to_string(),
            ));
        };

        for result in context.deletion_results.iter_mut() {
            if !result.is_pending_with_file() {
                continue;
            }
            let Some(file) = result.file.as_ref() else {
                continue;
            };
            result.status = match context.scanner.file_status(graph, file).await {
                Ok(FileStatus::Unused) => FileDeletionStatus::Verified,
                Ok(FileStatus::NotInCourse) => FileDeletionStatus::NotFound,
                Ok(status) => {
                    tracing::info!(
                        file_id = result.file_id,
                        ?status,
                        "File is no longer unused, keeping it"
                    );
                    FileDeletionStatus::NoLongerUnused(status)
                }
                Err(e) => {
                    tracing::error!(
                        file_id = result.file_id,
                        error = %e,
                        "Could not verify file is unused"
                    );
                    FileDeletionStatus::Failed(e.to_string())
                }
            };
        }
        StepAction::Continue
    }
}

/// Step 6: Delete verified files and write an audit record for each one removed
pub struct DeleteFilesStep;

#[async_trait::async_trait]
impl PipelineStep<DeletionContext> for DeleteFilesStep {
    fn name(&self) -> &'static str {
        "delete_files"
    }

    fn should_execute(&self, context: &DeletionContext) -> bool {
        context
            .deletion_results
            .iter()
            .any(|r| r.status == FileDeletionStatus::Verified)
    }

    async fn execute(&self, context: &mut DeletionContext) -> StepAction {
        for result in context.deletion_results.iter_mut() {
            if result.status != FileDeletionStatus::Verified {
                continue;
            }
            result.status = match context.storage.delete_file(result.file_id).await {
                Ok(true) => {
                    let record = AuditRecord {
                        event_id: utils::generate_random_uuid(),
                        event_type: AuditEventType::FileDeleted,
                        file_id: result.file_id,
                        file_name: result
                            .file
                            .as_ref()
                            .map(|f| f.file_name.clone())
                            .unwrap_or_default(),
                        actor_id: context.actor_id,
                        course_id: context.course_id,
                        time_created: context.clock.now(),
                    };
                    context.audit.record(&record).await;
                    context.audit_records.push(record);
                    tracing::info!(
                        file_id = result.file_id,
                        course_id = context.course_id,
                        actor_id = context.actor_id,
                        "Deleted unused file"
                    );
                    FileDeletionStatus::Deleted
                }
                Ok(false) => {
                    tracing::info!(file_id = result.file_id, "File was already deleted");
                    FileDeletionStatus::NotFound
                }
                Err(e) => {
                    tracing::error!(file_id = result.file_id, error = %e, "Failed to delete file");
                    FileDeletionStatus::Failed(e.to_string())
                }
            };
        }
        StepAction::Continue
    }
}
