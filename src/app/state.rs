use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use crate::app::types::{App, Notification, Severity, View};
use crate::app_event::ListEvent;
use crate::context::EndpointContext;
use crate::services::{EndpointService, GroupService};
use anyhow::{Context, Result};
use ratatui::widgets::ListState;

impl App {
    pub fn new(
        endpoint_service: Arc<dyn EndpointService>,
        group_service: Arc<dyn GroupService>,
        endpoints_file: Option<PathBuf>,
    ) -> Self {
        Self {
            should_quit: false,
            view: View::List,
            endpoints: Vec::new(),
            selected: 0,
            list_state: ListState::default(),
            list_loading: false,
            edit: None,
            edit_loading: false,
            context: EndpointContext::default(),
            notification: None,
            endpoint_service,
            group_service,
            endpoints_file,
            list_rx: None,
            edit_tx: None,
            edit_rx: None,
        }
    }

    pub fn notify(&mut self, severity: Severity, title: &str, detail: impl Into<String>) {
        let detail = detail.into();
        match severity {
            Severity::Error => tracing::error!("{}: {}", title, detail),
            Severity::Warning => tracing::warn!("{}: {}", title, detail),
            _ => tracing::info!("{}: {}", title, detail),
        }
        self.notification = Some(Notification {
            severity,
            title: title.to_string(),
            detail,
            shown_at: Instant::now(),
        });
    }

    pub fn clear_notification(&mut self) {
        self.notification = None;
    }

    /// Spawn a fetch of the full endpoint list. The result arrives as a
    /// [`ListEvent`] drained by `process_events`.
    pub fn reload_endpoints(&mut self) {
        let (tx, rx) = mpsc::channel();
        self.list_rx = Some(rx);
        self.list_loading = true;

        let service = Arc::clone(&self.endpoint_service);
        tokio::spawn(async move {
            let event = match service.endpoints().await {
                Ok(endpoints) => ListEvent::Loaded(endpoints),
                Err(e) => ListEvent::Failed(e.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    /// Navigate back to the endpoint list, dropping the edit session. With
    /// `reload` set the list data is fetched again so stale entries are never
    /// shown.
    pub fn go_to_list(&mut self, reload: bool) {
        self.view = View::List;
        self.edit = None;
        self.edit_loading = false;
        self.edit_tx = None;
        self.edit_rx = None;
        if reload {
            self.reload_endpoints();
        }
    }

    pub fn select_next(&mut self) {
        if self.endpoints.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.endpoints.len();
        self.list_state.select(Some(self.selected));
    }

    pub fn select_previous(&mut self) {
        if self.endpoints.is_empty() {
            return;
        }
        let total = self.endpoints.len();
        self.selected = (self.selected + total - 1) % total;
        self.list_state.select(Some(self.selected));
    }

    /// Open the backing endpoints file in the system editor, then reload.
    pub fn open_endpoints_editor(&mut self) -> Result<()> {
        let Some(path) = self.endpoints_file.clone() else {
            self.notify(
                Severity::Warning,
                "No backing file",
                "The endpoint store is not file-backed",
            );
            return Ok(());
        };

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, "")?;
        }

        open::that(&path).context("Failed to open editor")?;
        self.reload_endpoints();
        Ok(())
    }

    /// Drain pending worker events. Non-blocking; called once per UI tick.
    pub fn process_events(&mut self) {
        if let Some(rx) = &self.list_rx {
            if let Ok(event) = rx.try_recv() {
                self.list_rx = None;
                self.list_loading = false;
                match event {
                    ListEvent::Loaded(endpoints) => {
                        tracing::debug!("Loaded {} endpoint(s)", endpoints.len());
                        self.endpoints = endpoints;
                        if self.endpoints.is_empty() {
                            self.selected = 0;
                            self.list_state.select(None);
                        } else {
                            if self.selected >= self.endpoints.len() {
                                self.selected = self.endpoints.len() - 1;
                            }
                            self.list_state.select(Some(self.selected));
                        }
                    }
                    ListEvent::Failed(detail) => {
                        self.notify(
                            Severity::Error,
                            "Failure",
                            format!("Unable to retrieve endpoints: {}", detail),
                        );
                    }
                }
            }
        }

        while let Some(event) = self
            .edit_rx
            .as_ref()
            .and_then(|rx| rx.try_recv().ok())
        {
            self.apply_edit_event(event);
        }
    }
}
