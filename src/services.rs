use crate::error::Result;
use crate::forms::EndpointUpdatePayload;
use crate::models::{Endpoint, EndpointId, Group};
use async_trait::async_trait;

/// Intermediate upload-progress callback. Receives a fraction in `0.0..=1.0`;
/// purely observational, it neither resolves nor rejects the operation.
pub type ProgressSink = dyn Fn(f32) + Send + Sync;

#[async_trait]
pub trait EndpointService: Send + Sync {
    /// Fetch every known endpoint, for the list view.
    async fn endpoints(&self) -> Result<Vec<Endpoint>>;

    /// Fetch a single endpoint record.
    async fn endpoint(&self, id: EndpointId) -> Result<Endpoint>;

    /// Apply a partial update to an endpoint. `CertUpdate::Keep` fields leave
    /// the stored value untouched. The request is atomic from the caller's
    /// perspective: it either fully succeeds or fully fails.
    async fn update_endpoint(
        &self,
        id: EndpointId,
        payload: &EndpointUpdatePayload,
        progress: &ProgressSink,
    ) -> Result<Endpoint>;
}

#[async_trait]
pub trait GroupService: Send + Sync {
    /// Fetch the available endpoint groups.
    async fn groups(&self) -> Result<Vec<Group>>;
}
