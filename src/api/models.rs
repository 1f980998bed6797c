//! Response models and the field schema used to print them.
use std::fmt::Display;

use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Field-by-field view of a listed item, in declared order.
pub trait FieldSchema {
    /// Header prefix, e.g. `Worker Group`.
    const LABEL: &'static str;
    /// Singular noun used in the summary line.
    const NOUN: &'static str;
    const PLURAL: &'static str;

    fn id(&self) -> Option<&str>;

    /// Declared fields first, then any keys the model does not name.
    fn fields(&self) -> Vec<(&str, String)>;

    /// Missing or empty ids print as `Unknown`.
    fn display_id(&self) -> &str {
        self.id().filter(|id| !id.is_empty()).unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerGroup {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub config_version: Option<String>,
    pub worker_count: Option<u64>,
    pub on_prem: Option<bool>,
    pub is_fleet: Option<bool>,
    pub provisioned: Option<bool>,
    pub worker_remote_access: Option<bool>,
    pub estimated_ingest_rate: Option<f64>,
    pub tags: Option<String>,
    pub streamtags: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub upgrade_version: Option<String>,
    #[serde(default)]
    pub cloud: Value,
    /// Keys returned by the leader that are not declared above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldSchema for WorkerGroup {
    const LABEL: &'static str = "Worker Group";
    const NOUN: &'static str = "worker group";
    const PLURAL: &'static str = "worker groups";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn fields(&self) -> Vec<(&str, String)> {
        let declared = vec![
            ("id", optional(&self.id)),
            ("name", optional(&self.name)),
            ("description", optional(&self.description)),
            ("configVersion", optional(&self.config_version)),
            ("workerCount", optional(&self.worker_count)),
            ("onPrem", optional(&self.on_prem)),
            ("isFleet", optional(&self.is_fleet)),
            ("provisioned", optional(&self.provisioned)),
            ("workerRemoteAccess", optional(&self.worker_remote_access)),
            ("estimatedIngestRate", optional(&self.estimated_ingest_rate)),
            ("tags", optional(&self.tags)),
            ("streamtags", list(&self.streamtags)),
            ("type", optional(&self.kind)),
            ("upgradeVersion", optional(&self.upgrade_version)),
            ("cloud", json_value(&self.cloud)),
        ];
        with_extra(declared, &self.extra)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub workspace_id: Option<String>,
    pub alias: Option<String>,
    pub description: Option<String>,
    pub region: Option<String>,
    #[serde(rename = "leaderFQDN")]
    pub leader_fqdn: Option<String>,
    pub state: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Epoch milliseconds on current gateways; kept loose for older ones.
    #[serde(default)]
    pub last_updated: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldSchema for Workspace {
    const LABEL: &'static str = "Workspace";
    const NOUN: &'static str = "workspace";
    const PLURAL: &'static str = "workspaces";

    fn id(&self) -> Option<&str> {
        self.workspace_id.as_deref()
    }

    fn fields(&self) -> Vec<(&str, String)> {
        let declared = vec![
            ("workspaceId", optional(&self.workspace_id)),
            ("alias", optional(&self.alias)),
            ("description", optional(&self.description)),
            ("region", optional(&self.region)),
            ("leaderFQDN", optional(&self.leader_fqdn)),
            ("state", optional(&self.state)),
            ("tags", list(&self.tags)),
            ("lastUpdated", timestamp(&self.last_updated)),
        ];
        with_extra(declared, &self.extra)
    }
}

const ABSENT: &str = "null";

fn with_extra<'a>(
    mut fields: Vec<(&'a str, String)>,
    extra: &'a Map<String, Value>,
) -> Vec<(&'a str, String)> {
    fields.extend(
        extra
            .iter()
            .map(|(name, value)| (name.as_str(), json_value(value))),
    );
    fields
}

fn optional<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| ABSENT.to_string(), ToString::to_string)
}

fn list(values: &Option<Vec<String>>) -> String {
    values
        .as_ref()
        .map_or_else(|| ABSENT.to_string(), |values| values.join(","))
}

fn json_value(value: &Value) -> String {
    match value {
        Value::Null => ABSENT.to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn timestamp(value: &Value) -> String {
    value
        .as_i64()
        .and_then(DateTime::from_timestamp_millis)
        .map_or_else(|| json_value(value), |at| at.to_rfc3339())
}
