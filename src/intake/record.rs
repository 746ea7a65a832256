use super::form::Submission;
use crate::error::IntakeError;
use crate::model::{GenerationRequest, JobStatus, NewGenerationRequest};
use crate::store::JobStore;

pub fn new_job(submission: Submission, images: Vec<String>) -> NewGenerationRequest {
    NewGenerationRequest {
        prompt: submission.prompt,
        images,
        aspect_ratio: submission.aspect_ratio,
        resolution: submission.resolution,
        output_format: submission.output_format,
        status: JobStatus::Running,
    }
}

/// Insert the job in the `running` state. Call only once every asset is stored.
pub async fn record_job(
    jobs: &dyn JobStore,
    submission: Submission,
    images: Vec<String>,
) -> Result<GenerationRequest, IntakeError> {
    jobs.insert(new_job(submission, images)).await.map_err(|err| {
        tracing::error!(error = %err, "Error inserting record");
        IntakeError::Persistence(err)
    })
}
