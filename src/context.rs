use crate::models::EndpointId;

/// Application-wide state for the endpoint currently being worked on. Held by
/// the [`App`](crate::app::App) and mutated only through explicit setters
/// after a successful mutation, so later views address the endpoint by its
/// current public URL.
#[derive(Debug, Default)]
pub struct EndpointContext {
    active_endpoint: Option<EndpointId>,
    public_url: Option<String>,
}

impl EndpointContext {
    pub fn set_active(&mut self, id: EndpointId) {
        self.active_endpoint = Some(id);
    }

    pub fn set_public_url(&mut self, url: Option<String>) {
        tracing::debug!("Endpoint context public URL set to {:?}", url);
        self.public_url = url;
    }

    pub fn active_endpoint(&self) -> Option<EndpointId> {
        self.active_endpoint
    }

    pub fn public_url(&self) -> Option<&str> {
        self.public_url.as_deref()
    }
}
