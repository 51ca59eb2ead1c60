use crate::error::Error;

/// What the pipeline does after a step returns.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    Continue,
    /// Stop successfully without running the remaining steps.
    Skip,
    /// Stop and return the error to the caller.
    Abort(Error),
}

/// One stage of a [`Pipeline`](super::Pipeline) operating on a shared context.
///
/// Steps that only act on part of the context (for example on files still pending deletion)
/// override `should_execute` so they are passed over when there is nothing for them to do.
///
/// ```ignore
/// struct RejectEmptyRequest;
///
/// #[async_trait::async_trait]
/// impl PipelineStep<DeletionContext> for RejectEmptyRequest {
///     fn name(&self) -> &'static str {
///         "reject_empty_request"
///     }
///
///     async fn execute(&self, context: &mut DeletionContext) -> StepAction {
///         if context.requested_ids.is_empty() {
///             return StepAction::Abort(Error::InvalidInput("No files selected".into()));
///         }
///         StepAction::Continue
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait PipelineStep<T>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Checked before `execute`; returning `false` passes over this step only.
    fn should_execute(&self, _context: &T) -> bool {
        true
    }

    async fn execute(&self, context: &mut T) -> StepAction;
}
