use std::sync::mpsc;
use std::sync::Arc;

use crate::app::types::{App, EditSession, FocusField, Severity, SubmitState, View};
use crate::app_event::EditEvent;
use crate::forms::SecurityFormData;
use crate::models::{strip_protocol, Endpoint, EndpointId, Group};

impl App {
    /// Open the edit view for an endpoint. The endpoint record and the group
    /// list are fetched concurrently; the session is only installed once both
    /// have arrived, the first failure short-circuits to the error path.
    pub fn open_edit(&mut self, id: EndpointId) {
        let (tx, rx) = mpsc::channel();
        self.edit_tx = Some(tx.clone());
        self.edit_rx = Some(rx);
        self.edit = None;
        self.edit_loading = true;
        self.view = View::Edit;
        self.context.set_active(id);

        let endpoints = Arc::clone(&self.endpoint_service);
        let groups = Arc::clone(&self.group_service);
        tokio::spawn(async move {
            let event = match tokio::try_join!(endpoints.endpoint(id), groups.groups()) {
                Ok((endpoint, groups)) => EditEvent::Loaded { endpoint, groups },
                Err(e) => EditEvent::LoadFailed(e.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    pub(crate) fn apply_edit_event(&mut self, event: EditEvent) {
        match event {
            EditEvent::Loaded { endpoint, groups } => {
                tracing::debug!("Edit view loaded for endpoint {}", endpoint.id);
                self.edit_loading = false;
                self.edit = Some(EditSession::from_loaded(endpoint, groups));
            }
            EditEvent::LoadFailed(detail) => {
                self.edit_loading = false;
                self.notify(
                    Severity::Error,
                    "Failure",
                    format!("Unable to retrieve endpoint details: {}", detail),
                );
            }
            EditEvent::UploadProgress(fraction) => {
                if let Some(session) = &mut self.edit {
                    session.upload_progress = Some(fraction);
                }
            }
            EditEvent::Updated(endpoint) => {
                let name = endpoint.name.clone();
                if let Some(session) = &mut self.edit {
                    session.submit = SubmitState::Done;
                }
                self.notify(Severity::Success, "Endpoint updated", name);
                // Propagate the possibly changed public URL before navigating
                // away so later views address the endpoint correctly.
                self.context.set_public_url(endpoint.public_url.clone());
                self.go_to_list(true);
            }
            EditEvent::UpdateFailed(detail) => {
                if let Some(session) = &mut self.edit {
                    session.submit = SubmitState::Failed;
                    session.upload_progress = None;
                }
                self.notify(
                    Severity::Error,
                    "Failure",
                    format!("Unable to update endpoint: {}", detail),
                );
            }
        }
    }

    /// Submit the edit form as a partial update. Rejected while another
    /// submission is in flight; on failure the user stays on the form with
    /// state intact and retry is manual.
    pub fn submit_update(&mut self) {
        let Some(tx) = self.edit_tx.clone() else {
            return;
        };
        let Some(session) = &mut self.edit else {
            return;
        };

        if session.submit == SubmitState::Submitting {
            self.notify(
                Severity::Warning,
                "Update in progress",
                "The previous update has not finished yet",
            );
            return;
        }

        // An empty public URL field means "no public URL".
        if session.endpoint.public_url.as_deref() == Some("") {
            session.endpoint.public_url = None;
        }

        // The form edits the stripped URL; the transmitted URL keeps the
        // original scheme so the stored record is unaffected by stripping.
        let mut endpoint = session.endpoint.clone();
        endpoint.url = session.full_url();
        let payload = session.form.build_payload(&endpoint, session.kind);
        let id = session.endpoint.id;
        session.submit = SubmitState::Submitting;
        session.upload_progress = None;

        tracing::info!("Submitting update for endpoint {}", id);
        let service = Arc::clone(&self.endpoint_service);
        tokio::spawn(async move {
            let progress_tx = tx.clone();
            let progress = move |fraction: f32| {
                let _ = progress_tx.send(EditEvent::UploadProgress(fraction));
            };
            let event = match service.update_endpoint(id, &payload, &progress).await {
                Ok(endpoint) => EditEvent::Updated(endpoint),
                Err(e) => EditEvent::UpdateFailed(e.to_string()),
            };
            let _ = tx.send(event);
        });
    }
}

impl EditSession {
    /// Build the session from freshly loaded data: classify the connection
    /// kind from the original URL, then strip the protocol prefix for the
    /// editable display value and prefill the security form from the stored
    /// TLS configuration.
    fn from_loaded(mut endpoint: Endpoint, groups: Vec<Group>) -> Self {
        let kind = endpoint.kind();
        let scheme = endpoint
            .url
            .split_once("://")
            .map(|(scheme, _)| format!("{}://", scheme));
        endpoint.url = strip_protocol(&endpoint.url).to_string();
        let form = SecurityFormData::from_tls_config(&endpoint.tls_config);
        let group_index = groups
            .iter()
            .position(|g| g.id == endpoint.group_id)
            .unwrap_or(0);

        Self {
            endpoint,
            kind,
            scheme,
            groups,
            group_index,
            form,
            focus: FocusField::Name,
            submit: SubmitState::Idle,
            upload_progress: None,
        }
    }

    /// The URL as it will be transmitted: the edited value with the original
    /// scheme prefix reattached, unless the operator typed a scheme themselves.
    pub fn full_url(&self) -> String {
        match &self.scheme {
            Some(scheme) if !self.endpoint.url.contains("://") => {
                format!("{}{}", scheme, self.endpoint.url)
            }
            _ => self.endpoint.url.clone(),
        }
    }

    /// Whether a field currently has a rendered row. The TLS detail fields
    /// only exist while TLS is enabled.
    fn field_visible(&self, field: FocusField) -> bool {
        self.form.tls
            || !matches!(
                field,
                FocusField::Mode | FocusField::CaCert | FocusField::Cert | FocusField::Key
            )
    }

    pub fn focus_next(&mut self) {
        let mut field = self.focus.next();
        while !self.field_visible(field) {
            field = field.next();
        }
        self.focus = field;
    }

    pub fn focus_previous(&mut self) {
        let mut field = self.focus.previous();
        while !self.field_visible(field) {
            field = field.previous();
        }
        self.focus = field;
    }

    /// Toggle TLS, pulling focus back onto a visible field if the current one
    /// just disappeared.
    pub fn toggle_tls(&mut self) {
        self.form.tls = !self.form.tls;
        if !self.field_visible(self.focus) {
            self.focus = FocusField::Tls;
        }
    }

    /// Cycle the group selector, keeping the endpoint's group id in sync.
    pub fn cycle_group(&mut self) {
        if self.groups.is_empty() {
            return;
        }
        self.group_index = (self.group_index + 1) % self.groups.len();
        self.endpoint.group_id = self.groups[self.group_index].id;
    }

    pub fn selected_group_name(&self) -> &str {
        self.groups
            .get(self.group_index)
            .map(|g| g.name.as_str())
            .unwrap_or("-")
    }

    /// The submit action is only available once a session exists and nothing
    /// is in flight.
    pub fn can_submit(&self) -> bool {
        self.submit != SubmitState::Submitting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ServiceError};
    use crate::forms::EndpointUpdatePayload;
    use crate::models::{EndpointKind, TlsConfig, UNASSIGNED_GROUP_ID};
    use crate::services::{EndpointService, GroupService, ProgressSink};
    use crate::store::EndpointStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn endpoint() -> Endpoint {
        Endpoint {
            id: 3,
            name: "docker-local".to_string(),
            url: "unix:///var/run/docker.sock".to_string(),
            public_url: None,
            group_id: UNASSIGNED_GROUP_ID,
            tls_config: TlsConfig::default(),
        }
    }

    fn groups() -> Vec<Group> {
        vec![Group {
            id: UNASSIGNED_GROUP_ID,
            name: "Unassigned".to_string(),
        }]
    }

    /// Test double for both services. `update_calls` counts submissions;
    /// `complete_updates` controls whether updates resolve or hang.
    struct FakeServices {
        update_calls: AtomicUsize,
        complete_updates: bool,
        fail_groups: bool,
    }

    impl FakeServices {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                update_calls: AtomicUsize::new(0),
                complete_updates: true,
                fail_groups: false,
            })
        }
    }

    #[async_trait]
    impl EndpointService for FakeServices {
        async fn endpoints(&self) -> Result<Vec<Endpoint>> {
            Ok(vec![endpoint()])
        }

        async fn endpoint(&self, _id: EndpointId) -> Result<Endpoint> {
            Ok(endpoint())
        }

        async fn update_endpoint(
            &self,
            _id: EndpointId,
            payload: &EndpointUpdatePayload,
            progress: &ProgressSink,
        ) -> Result<Endpoint> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if !self.complete_updates {
                std::future::pending::<()>().await;
            }
            progress(1.0);
            let mut updated = endpoint();
            updated.name = payload.name.clone();
            updated.public_url = payload.public_url.clone();
            Ok(updated)
        }
    }

    #[async_trait]
    impl GroupService for FakeServices {
        async fn groups(&self) -> Result<Vec<Group>> {
            if self.fail_groups {
                Err(ServiceError::Validation("groups unavailable".to_string()))
            } else {
                Ok(groups())
            }
        }
    }

    fn app(services: Arc<FakeServices>) -> App {
        App::new(services.clone(), services, None)
    }

    /// Poll worker events until the predicate holds or the deadline passes.
    async fn wait_for(app: &mut App, mut done: impl FnMut(&App) -> bool) {
        for _ in 0..100 {
            app.process_events();
            if done(app) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached within deadline");
    }

    #[test]
    fn focus_skips_tls_fields_while_tls_disabled() {
        let mut session = EditSession::from_loaded(endpoint(), groups());
        assert!(!session.form.tls);

        session.focus = FocusField::Tls;
        session.focus_next();
        assert_eq!(session.focus, FocusField::Name);
        session.focus_previous();
        assert_eq!(session.focus, FocusField::Tls);

        session.toggle_tls();
        session.focus_next();
        assert_eq!(session.focus, FocusField::Mode);

        // Disabling TLS while a detail field is focused pulls focus back.
        session.toggle_tls();
        assert_eq!(session.focus, FocusField::Tls);
    }

    #[tokio::test]
    async fn submit_round_trip_preserves_stored_url_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let seed = r#"
[[endpoints]]
id = 9
name = "docker-local"
url = "unix:///var/run/docker.sock"
group_id = 1
"#;
        std::fs::write(dir.path().join("endpoints.toml"), seed).unwrap();
        let store = Arc::new(EndpointStore::new(Some(dir.path().to_path_buf())).unwrap());
        let mut app = App::new(store.clone(), store.clone(), None);

        app.open_edit(9);
        wait_for(&mut app, |a| a.edit.is_some()).await;
        assert_eq!(app.edit.as_ref().unwrap().endpoint.url, "/var/run/docker.sock");

        // Submit with no edits, then reload: stripping the URL for display
        // must not leak into the stored record.
        app.submit_update();
        wait_for(&mut app, |a| a.view == View::List).await;

        let reloaded = store.endpoint(9).await.unwrap();
        assert_eq!(reloaded.url, "unix:///var/run/docker.sock");
        assert_eq!(reloaded.kind(), EndpointKind::Local);
    }

    #[tokio::test]
    async fn load_strips_url_and_classifies_kind() {
        let services = FakeServices::new();
        let mut app = app(services);

        app.open_edit(3);
        wait_for(&mut app, |a| a.edit.is_some()).await;

        let session = app.edit.as_ref().unwrap();
        // Scenario: unix socket endpoint shows without scheme, classified local.
        assert_eq!(session.kind, EndpointKind::Local);
        assert_eq!(session.endpoint.url, "/var/run/docker.sock");
        assert_eq!(session.groups.len(), 1);
        assert!(!app.edit_loading);
    }

    #[tokio::test]
    async fn group_fetch_failure_leaves_view_unpopulated() {
        let mut services = FakeServices::new();
        Arc::get_mut(&mut services).unwrap().fail_groups = true;
        let mut app = app(services);

        app.open_edit(3);
        wait_for(&mut app, |a| a.notification.is_some()).await;

        // No partial rendering of a half-loaded endpoint, submit unavailable.
        assert!(app.edit.is_none());
        assert!(!app.edit_loading);
        let notification = app.notification.as_ref().unwrap();
        assert_eq!(notification.severity, Severity::Error);
        assert!(notification.detail.contains("Unable to retrieve endpoint details"));

        // Submitting without a session is a no-op.
        app.submit_update();
        assert!(app.edit.is_none());
    }

    #[tokio::test]
    async fn successful_update_propagates_public_url_and_navigates() {
        let services = FakeServices::new();
        let mut app = app(services.clone());

        app.open_edit(3);
        wait_for(&mut app, |a| a.edit.is_some()).await;

        {
            let session = app.edit.as_mut().unwrap();
            session.endpoint.public_url = Some("edge.example.com".to_string());
        }
        app.submit_update();
        wait_for(&mut app, |a| a.view == View::List).await;

        assert_eq!(services.update_calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.context.public_url(), Some("edge.example.com"));
        assert_eq!(app.context.active_endpoint(), Some(3));
        // Navigation back forces a list reload.
        assert!(app.edit.is_none());
        assert!(app.list_loading || !app.endpoints.is_empty());
        let notification = app.notification.as_ref().unwrap();
        assert_eq!(notification.severity, Severity::Success);
        assert_eq!(notification.title, "Endpoint updated");
    }

    #[tokio::test]
    async fn second_submit_is_rejected_while_in_flight() {
        let mut services = FakeServices::new();
        Arc::get_mut(&mut services).unwrap().complete_updates = false;
        let mut app = app(services.clone());

        app.open_edit(3);
        wait_for(&mut app, |a| a.edit.is_some()).await;

        app.submit_update();
        assert_eq!(app.edit.as_ref().unwrap().submit, SubmitState::Submitting);
        assert!(!app.edit.as_ref().unwrap().can_submit());

        // Give the first task a chance to start before re-invoking.
        tokio::time::sleep(Duration::from_millis(20)).await;
        app.submit_update();

        let notification = app.notification.as_ref().unwrap();
        assert_eq!(notification.severity, Severity::Warning);
        assert_eq!(services.update_calls.load(Ordering::SeqCst), 1);
        // Still on the edit view with the session intact.
        assert_eq!(app.view, View::Edit);
        assert!(app.edit.is_some());
    }

    #[tokio::test]
    async fn failed_update_keeps_form_state() {
        struct FailingUpdate;

        #[async_trait]
        impl EndpointService for FailingUpdate {
            async fn endpoints(&self) -> Result<Vec<Endpoint>> {
                Ok(Vec::new())
            }
            async fn endpoint(&self, _id: EndpointId) -> Result<Endpoint> {
                Ok(endpoint())
            }
            async fn update_endpoint(
                &self,
                _id: EndpointId,
                _payload: &EndpointUpdatePayload,
                _progress: &ProgressSink,
            ) -> Result<Endpoint> {
                Err(ServiceError::Validation("name must not be empty".to_string()))
            }
        }

        #[async_trait]
        impl GroupService for FailingUpdate {
            async fn groups(&self) -> Result<Vec<Group>> {
                Ok(groups())
            }
        }

        let services = Arc::new(FailingUpdate);
        let mut app = App::new(services.clone(), services, None);

        app.open_edit(3);
        wait_for(&mut app, |a| a.edit.is_some()).await;

        app.edit.as_mut().unwrap().endpoint.name = "renamed".to_string();
        app.submit_update();
        wait_for(&mut app, |a| {
            a.edit
                .as_ref()
                .is_some_and(|s| s.submit == SubmitState::Failed)
        })
        .await;

        // No navigation, no data loss, retry is manual.
        assert_eq!(app.view, View::Edit);
        let session = app.edit.as_ref().unwrap();
        assert_eq!(session.endpoint.name, "renamed");
        assert!(session.can_submit());
        assert_eq!(app.notification.as_ref().unwrap().severity, Severity::Error);
    }
}
