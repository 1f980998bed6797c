use tracing::{debug, info};

use super::{Credentials, RawCriblEnv};

pub fn log_env_loaded(raw: &RawCriblEnv) {
    debug!(
        target: "cribl_session::config",
        org_id = raw.org_id.is_some(),
        client_id = raw.client_id.is_some(),
        client_secret = raw.client_secret.is_some(),
        server_url = raw.server_url.is_some(),
        username = raw.username.is_some(),
        password = raw.password.is_some(),
        insecure_tls = raw.insecure_tls.as_deref().unwrap_or(""),
        deployment = raw.deployment.as_deref().unwrap_or(""),
        "Read CRIBL_* environment variables"
    );
}

pub fn log_resolved(credentials: &Credentials) {
    match credentials {
        Credentials::Cloud(cloud) => info!(
            target: "cribl_session::config",
            deployment = "cloud",
            org_id = %cloud.org_id,
            workspace = %cloud.workspace_name,
            domain = %cloud.domain,
            "Resolved cloud credentials"
        ),
        Credentials::OnPrem(onprem) => info!(
            target: "cribl_session::config",
            deployment = "on-prem",
            server_url = %onprem.server_url,
            username = %onprem.username,
            insecure_tls = onprem.insecure_tls,
            "Resolved on-prem credentials"
        ),
    }
}
