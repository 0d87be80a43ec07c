use crate::models::{Endpoint, EndpointKind, GroupId, TlsConfig};

/// Security posture selectable in the edit form. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// CA and client certificate, nothing skipped.
    Mutual,
    /// Verify the server against a CA, skip the client certificate check.
    CaOnly,
    /// Present a client certificate, skip server verification.
    ClientOnly,
    /// TLS with no additional verification on either side.
    NoVerify,
}

impl TlsMode {
    pub fn label(&self) -> &'static str {
        match self {
            TlsMode::Mutual => "TLS with server and client verification",
            TlsMode::CaOnly => "TLS with server verification only",
            TlsMode::ClientOnly => "TLS with client verification only",
            TlsMode::NoVerify => "TLS only",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            TlsMode::Mutual => TlsMode::CaOnly,
            TlsMode::CaOnly => TlsMode::ClientOnly,
            TlsMode::ClientOnly => TlsMode::NoVerify,
            TlsMode::NoVerify => TlsMode::Mutual,
        }
    }
}

/// Transient TLS form state for one edit session.
#[derive(Debug, Clone)]
pub struct SecurityFormData {
    pub tls: bool,
    pub mode: TlsMode,
    pub ca_cert: String,
    pub cert: String,
    pub key: String,
}

/// Update decision for one certificate field. `Keep` means the field is
/// omitted from the update and the stored value survives; it is a distinct
/// state, not a null sentinel colliding with "clear this field".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CertUpdate {
    #[default]
    Keep,
    Replace(String),
}

impl CertUpdate {
    pub fn is_keep(&self) -> bool {
        matches!(self, CertUpdate::Keep)
    }
}

/// Partial-update payload consumed by the endpoint service.
#[derive(Debug, Clone)]
pub struct EndpointUpdatePayload {
    pub name: String,
    pub url: String,
    pub public_url: Option<String>,
    pub group_id: GroupId,
    pub tls: bool,
    pub tls_skip_verify: bool,
    pub tls_skip_client_verify: bool,
    pub ca_cert: CertUpdate,
    pub cert: CertUpdate,
    pub key: CertUpdate,
    pub kind: EndpointKind,
}

impl SecurityFormData {
    /// Prefill the form from an endpoint's stored TLS configuration. The mode
    /// is inverse-derived from the stored skip-flag pair.
    pub fn from_tls_config(config: &TlsConfig) -> Self {
        let mode = match (config.tls_skip_verify, config.tls_skip_client_verify) {
            (true, true) => TlsMode::NoVerify,
            (true, false) => TlsMode::ClientOnly,
            (false, true) => TlsMode::CaOnly,
            (false, false) => TlsMode::Mutual,
        };
        Self {
            tls: config.tls,
            mode,
            ca_cert: config.ca_cert.clone().unwrap_or_default(),
            cert: config.cert.clone().unwrap_or_default(),
            key: config.key.clone().unwrap_or_default(),
        }
    }

    /// Derive the (skip server verification, skip client verification) pair
    /// the backend expects from the selected mode.
    pub fn derived_flags(&self) -> (bool, bool) {
        let skip_verify = self.tls && matches!(self.mode, TlsMode::ClientOnly | TlsMode::NoVerify);
        let skip_client_verify = self.tls && matches!(self.mode, TlsMode::CaOnly | TlsMode::NoVerify);
        (skip_verify, skip_client_verify)
    }

    /// Assemble the update payload for the endpoint as currently edited.
    ///
    /// A certificate field is kept (omitted from the update) when the relevant
    /// skip flag makes it irrelevant, or when the form value is byte-identical
    /// to the stored value, so unchanged material is never re-uploaded.
    pub fn build_payload(&self, endpoint: &Endpoint, kind: EndpointKind) -> EndpointUpdatePayload {
        let (tls_skip_verify, tls_skip_client_verify) = self.derived_flags();
        let stored = &endpoint.tls_config;

        EndpointUpdatePayload {
            name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            public_url: endpoint.public_url.clone(),
            group_id: endpoint.group_id,
            tls: self.tls,
            tls_skip_verify,
            tls_skip_client_verify,
            ca_cert: cert_update(tls_skip_verify, &self.ca_cert, stored.ca_cert.as_deref()),
            cert: cert_update(tls_skip_client_verify, &self.cert, stored.cert.as_deref()),
            key: cert_update(tls_skip_client_verify, &self.key, stored.key.as_deref()),
            kind,
        }
    }
}

fn cert_update(suppressed: bool, form_value: &str, stored: Option<&str>) -> CertUpdate {
    if suppressed || Some(form_value) == stored {
        CertUpdate::Keep
    } else {
        CertUpdate::Replace(form_value.to_string())
    }
}
