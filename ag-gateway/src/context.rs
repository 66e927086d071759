use std::collections::BTreeMap;

/// Transient per-request state (spec §3 "Request context (transient)").
/// Never persisted as-is; the orchestrator derives a `RequestObservation`
/// from it at the end of `process`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub endpoint_path: String,
    pub category: String,
    pub params: BTreeMap<String, String>,
    pub client_addr: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(endpoint_path: impl Into<String>, category: impl Into<String>, params: BTreeMap<String, String>) -> Self {
        Self {
            endpoint_path: endpoint_path.into(),
            category: category.into(),
            params,
            client_addr: None,
            user_agent: None,
        }
    }

    pub fn with_client(mut self, client_addr: Option<String>, user_agent: Option<String>) -> Self {
        self.client_addr = client_addr;
        self.user_agent = user_agent;
        self
    }
}
