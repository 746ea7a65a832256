//! The request-intake pipeline: validate, upload assets, record the job, notify.
//!
//! ```text
//! received ─ validate ─┬─ rejected (400)
//!                      └─ upload × N ─┬─ upload-failed (500)
//!                                     └─ record ─┬─ persist-failed (500)
//!                                                └─ notify (best effort) ─ responded
//! ```

pub mod form;
pub mod record;
pub mod upload;

use std::sync::Arc;

pub use form::{ImageUpload, IntakeForm, Submission};
pub use record::record_job;
pub use upload::upload_assets;

use crate::error::IntakeError;
use crate::model::GenerationRequest;
use crate::notify::{Delivery, WebhookNotifier};
use crate::storage::ObjectStorage;
use crate::store::JobStore;

/// Everything one request needs, built once at start-up and shared by handlers.
#[derive(Clone)]
pub struct IntakeService {
    storage: Arc<dyn ObjectStorage>,
    jobs: Arc<dyn JobStore>,
    notifier: WebhookNotifier,
}

impl IntakeService {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        jobs: Arc<dyn JobStore>,
        notifier: WebhookNotifier,
    ) -> Self {
        Self {
            storage,
            jobs,
            notifier,
        }
    }

    pub async fn submit(&self, form: IntakeForm) -> Result<GenerationRequest, IntakeError> {
        let submission = form.validate()?;
        let images = upload_assets(self.storage.as_ref(), &submission.images).await?;
        let job = record_job(self.jobs.as_ref(), submission, images).await?;
        tracing::info!(id = %job.id, images = job.images.len(), "generation request created");
        self.announce(&job).await;
        Ok(job)
    }

    /// Tell the worker about a new job. The outcome is logged and dropped.
    async fn announce(&self, job: &GenerationRequest) {
        match self.notifier.notify(&job.id).await {
            Ok(Delivery::Delivered(status)) => {
                tracing::debug!(id = %job.id, %status, "webhook delivered");
            }
            Ok(Delivery::Disabled) => {}
            Err(err) => {
                tracing::warn!(id = %job.id, error = %err, "Error sending webhook");
            }
        }
    }
}
