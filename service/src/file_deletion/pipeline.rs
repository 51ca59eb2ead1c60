use crate::{
    file_deletion::{
        context::DeletionContext,
        steps::{
            BuildContentGraphStep, DeleteFilesStep, FetchFilesStep, ValidateCapabilityStep,
            ValidateRequestStep, VerifyStillUnusedStep,
        },
    },
    pipeline::Pipeline,
};

impl Pipeline<DeletionContext> {
    pub fn new() -> Self {
        Self::with_steps(vec![
            Box::new(ValidateCapabilityStep),
            Box::new(ValidateRequestStep),
            Box::new(BuildContentGraphStep),
            Box::new(FetchFilesStep),
            Box::new(VerifyStillUnusedStep),
            Box::new(DeleteFilesStep),
        ])
    }
}
