use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

use crate::app_event::{EditEvent, ListEvent};
use crate::context::EndpointContext;
use crate::forms::SecurityFormData;
use crate::models::{Endpoint, EndpointKind, Group};
use crate::services::{EndpointService, GroupService};
use ratatui::widgets::ListState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Edit,
}

/// Submission state for one edit session. A new submit is rejected while a
/// request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusField {
    Name,
    Url,
    PublicUrl,
    Group,
    Tls,
    Mode,
    CaCert,
    Cert,
    Key,
}

impl FocusField {
    const ORDER: [FocusField; 9] = [
        FocusField::Name,
        FocusField::Url,
        FocusField::PublicUrl,
        FocusField::Group,
        FocusField::Tls,
        FocusField::Mode,
        FocusField::CaCert,
        FocusField::Cert,
        FocusField::Key,
    ];

    pub fn next(&self) -> Self {
        let idx = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn previous(&self) -> Self {
        let idx = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub detail: String,
    pub shown_at: Instant,
}

/// State for one activation of the edit view. Built only once both fetches of
/// the view initializer have completed; discarded on navigation away.
#[derive(Debug)]
pub struct EditSession {
    /// The endpoint as edited. Its URL is already stripped of the protocol
    /// prefix for display; `kind` was classified from the original URL.
    pub endpoint: Endpoint,
    pub kind: EndpointKind,
    /// Scheme prefix removed from the URL for display (e.g. `unix://`).
    /// Reattached when the update is submitted; the stored URL keeps it.
    pub scheme: Option<String>,
    pub groups: Vec<Group>,
    pub group_index: usize,
    pub form: SecurityFormData,
    pub focus: FocusField,
    pub submit: SubmitState,
    pub upload_progress: Option<f32>,
}

pub struct App {
    pub should_quit: bool,
    pub view: View,

    // Endpoint list
    pub endpoints: Vec<Endpoint>,
    pub selected: usize,
    pub list_state: ListState,
    pub list_loading: bool,

    // Edit view
    pub edit: Option<EditSession>,
    pub edit_loading: bool,

    pub context: EndpointContext,
    pub notification: Option<Notification>,

    pub endpoint_service: Arc<dyn EndpointService>,
    pub group_service: Arc<dyn GroupService>,
    /// Backing file for the `e` (open in editor) shortcut, when the store is
    /// file-backed.
    pub endpoints_file: Option<PathBuf>,

    pub list_rx: Option<Receiver<ListEvent>>,
    pub edit_tx: Option<Sender<EditEvent>>,
    pub edit_rx: Option<Receiver<EditEvent>>,
}
