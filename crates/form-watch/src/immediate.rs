//! Mount-time pass for immediate watches.

use serde_json::Value;

use crate::schema::SchemaContext;
use crate::watch::{values_watch, DispatchReport, WatchRegistry};

/// Fire every immediate watch once against the current values.
///
/// The whole value tree is treated as both the change and the full state,
/// so each immediate watcher sees its slice of the initial values.
pub fn immediate_watch(
    registry: &WatchRegistry,
    values: &Value,
    schema: Option<&SchemaContext>,
    flatten: bool,
) -> DispatchReport {
    let immediate = registry.immediate_only();
    tracing::debug!(immediate = immediate.len(), "running immediate watches");
    values_watch(values, values, &immediate, schema, flatten)
}
