use std::fmt;

use crate::lib::errors::ConfigError;

use super::{
    FieldCheck, RawCriblEnv, CLIENT_ID_ENV, CLIENT_SECRET_ENV, DOMAIN_ENV, ORG_ID_ENV,
    WORKSPACE_NAME_ENV,
};

pub const DEFAULT_WORKSPACE: &str = "main";
pub const DEFAULT_DOMAIN: &str = "cribl.cloud";

/// OAuth client credentials for a Cribl.Cloud organization.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudCredentials {
    pub org_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub workspace_name: String,
    pub domain: String,
}

impl fmt::Debug for CloudCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudCredentials")
            .field("org_id", &self.org_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("workspace_name", &self.workspace_name)
            .field("domain", &self.domain)
            .finish()
    }
}

/// `org_id`, `client_id` and `client_secret` are required; workspace and domain
/// fall back to `main` and `cribl.cloud`.
pub fn resolve_cloud_credentials(raw: &RawCriblEnv) -> Result<CloudCredentials, ConfigError> {
    let mut check = FieldCheck::default();
    let org_id = check.required(ORG_ID_ENV, raw.org_id.as_ref());
    let client_id = check.required(CLIENT_ID_ENV, raw.client_id.as_ref());
    let client_secret = check.required(CLIENT_SECRET_ENV, raw.client_secret.as_ref());
    let workspace_name =
        check.with_default(WORKSPACE_NAME_ENV, raw.workspace_name.as_ref(), DEFAULT_WORKSPACE);
    let domain = check.with_default(DOMAIN_ENV, raw.domain.as_ref(), DEFAULT_DOMAIN);
    check.finish()?;

    // Only the hostname parts are trimmed; the client credentials are sent as given.
    Ok(CloudCredentials {
        org_id: org_id.trim().to_string(),
        client_id,
        client_secret,
        workspace_name: workspace_name.trim().to_string(),
        domain: domain.trim().trim_end_matches('.').to_string(),
    })
}
