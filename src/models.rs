use serde::{Deserialize, Serialize};

pub type EndpointId = u64;
pub type GroupId = u64;

/// Group every endpoint without an explicit assignment belongs to.
pub const UNASSIGNED_GROUP_ID: GroupId = 1;

const LOCAL_SCHEME_PREFIX: &str = "unix://";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    pub name: String,
    pub url: String,
    pub public_url: Option<String>,
    #[serde(default = "default_group_id")]
    pub group_id: GroupId,
    #[serde(default)]
    pub tls_config: TlsConfig,
}

fn default_group_id() -> GroupId {
    UNASSIGNED_GROUP_ID
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(default)]
    pub tls: bool,
    #[serde(default)]
    pub tls_skip_verify: bool,
    #[serde(default)]
    pub tls_skip_client_verify: bool,
    pub ca_cert: Option<String>,
    pub cert: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// Connection kind derived from the endpoint URL. Never stored; the
/// classification always runs against the original URL, not the stripped
/// form shown in the edit view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Local,
    Remote,
}

impl EndpointKind {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with(LOCAL_SCHEME_PREFIX) {
            EndpointKind::Local
        } else {
            EndpointKind::Remote
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Local => "local",
            EndpointKind::Remote => "remote",
        }
    }
}

impl Endpoint {
    pub fn kind(&self) -> EndpointKind {
        EndpointKind::from_url(&self.url)
    }
}

/// Strip a `<scheme>://` prefix for display purposes.
pub fn strip_protocol(url: &str) -> &str {
    match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    }
}
