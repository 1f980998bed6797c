use clap::ValueEnum;
use tracing::info;

use super::{ListResponse, WorkerGroup};
use crate::{lib::errors::ApiError, session::Session};

/// Product whose worker groups are listed.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum Product {
    #[default]
    Stream,
    Edge,
}

impl Product {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Product::Stream => "stream",
            Product::Edge => "edge",
        }
    }
}

/// `GET {base}/products/{product}/groups`.
pub async fn list_worker_groups(
    session: &Session,
    product: Product,
) -> Result<Vec<WorkerGroup>, ApiError> {
    let url = session.endpoint(&["products", product.as_str(), "groups"])?;
    let response: ListResponse<WorkerGroup> = session.get_json(url).await?;
    let groups = response.into_items();

    info!(
        target: "cribl_session::api",
        product = product.as_str(),
        count = groups.len(),
        "Listed worker groups"
    );
    Ok(groups)
}
