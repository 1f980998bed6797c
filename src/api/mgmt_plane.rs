use tracing::info;

use super::{ListResponse, Workspace};
use crate::{lib::errors::ApiError, session::Session};

/// `GET {base}/v1/organizations/{org_id}/workspaces`.
pub async fn list_workspaces(session: &Session, org_id: &str) -> Result<Vec<Workspace>, ApiError> {
    let url = session.endpoint(&["v1", "organizations", org_id, "workspaces"])?;
    let response: ListResponse<Workspace> = session.get_json(url).await?;
    let workspaces = response.into_items();

    info!(
        target: "cribl_session::api",
        org_id,
        count = workspaces.len(),
        "Listed workspaces"
    );
    Ok(workspaces)
}
