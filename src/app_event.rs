use crate::models::{Endpoint, Group};

/// Events sent by the list-loading worker task.
#[derive(Debug)]
pub enum ListEvent {
    Loaded(Vec<Endpoint>),
    Failed(String),
}

/// Events sent by the edit-view worker tasks (initial load and update).
#[derive(Debug)]
pub enum EditEvent {
    Loaded {
        endpoint: Endpoint,
        groups: Vec<Group>,
    },
    LoadFailed(String),
    UploadProgress(f32),
    Updated(Endpoint),
    UpdateFailed(String),
}
