//! List operations against an authenticated [`Session`](crate::session::Session).
use serde::Deserialize;

pub mod control_plane;
pub mod mgmt_plane;
pub mod models;
pub mod render;

pub use control_plane::{list_worker_groups, Product};
pub use mgmt_plane::list_workspaces;
pub use models::{FieldSchema, WorkerGroup, Workspace};
pub use render::render_listing;

/// `{ count?, items: T[] | null }` envelope shared by list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub count: Option<u64>,
    pub items: Option<Vec<T>>,
}

impl<T> ListResponse<T> {
    /// Absent and `null` items both mean an empty listing.
    pub fn into_items(self) -> Vec<T> {
        self.items.unwrap_or_default()
    }
}
