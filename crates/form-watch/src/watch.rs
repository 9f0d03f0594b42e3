//! Watch registry and dispatch.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use form_watch_path::{parse_value_path, ValuePath};
use indexmap::IndexMap;
use serde_json::Value;

use crate::changes::{map_changes, IndexPath, PathEntry, ValuePathMap};
use crate::error::HandlerError;
use crate::flatten::Flattener;
use crate::schema::SchemaContext;
use crate::void::VoidContainerSet;

/// Callback invoked with the watched value and its index path.
pub type Handler = Rc<dyn Fn(&Value, &IndexPath) -> Result<(), HandlerError>>;

/// A registered watch.
#[derive(Clone)]
pub enum WatchEntry {
    /// Bare function form.
    Function(Handler),
    /// Object form. An entry without a handler never fires.
    Options {
        handler: Option<Handler>,
        immediate: bool,
    },
}

impl WatchEntry {
    pub fn function<F>(handler: F) -> Self
    where
        F: Fn(&Value, &IndexPath) -> Result<(), HandlerError> + 'static,
    {
        WatchEntry::Function(Rc::new(handler))
    }

    pub fn options<F>(handler: F, immediate: bool) -> Self
    where
        F: Fn(&Value, &IndexPath) -> Result<(), HandlerError> + 'static,
    {
        WatchEntry::Options { handler: Some(Rc::new(handler)), immediate }
    }

    pub fn handler(&self) -> Option<&Handler> {
        match self {
            WatchEntry::Function(handler) => Some(handler),
            WatchEntry::Options { handler, .. } => handler.as_ref(),
        }
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, WatchEntry::Options { immediate: true, .. })
    }
}

impl fmt::Debug for WatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchEntry::Function(_) => f.write_str("Function(..)"),
            WatchEntry::Options { handler, immediate } => f
                .debug_struct("Options")
                .field("handler", &handler.as_ref().map(|_| ".."))
                .field("immediate", immediate)
                .finish(),
        }
    }
}

/// Declared watch paths in registration order.
#[derive(Debug, Clone, Default)]
pub struct WatchRegistry {
    entries: IndexMap<String, WatchEntry>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bare-function watch.
    pub fn on<F>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(&Value, &IndexPath) -> Result<(), HandlerError> + 'static,
    {
        self.entries.insert(path.to_string(), WatchEntry::function(handler));
        self
    }

    /// Register a watch that also fires once at mount.
    pub fn immediate<F>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(&Value, &IndexPath) -> Result<(), HandlerError> + 'static,
    {
        self.entries.insert(path.to_string(), WatchEntry::options(handler, true));
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, entry: WatchEntry) -> Option<WatchEntry> {
        self.entries.insert(path.into(), entry)
    }

    pub fn get(&self, path: &str) -> Option<&WatchEntry> {
        self.entries.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WatchEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries flagged `immediate` that have a handler.
    pub fn immediate_only(&self) -> WatchRegistry {
        let entries = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_immediate() && entry.handler().is_some())
            .map(|(path, entry)| (path.clone(), entry.clone()))
            .collect();
        WatchRegistry { entries }
    }
}

/// A handler that returned an error or panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchFault {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handler calls made, failed ones included.
    pub invoked: usize,
    pub faults: Vec<WatchFault>,
}

/// Invoke every registered watch whose path is present in `map`.
///
/// With a container set and flattening off, a declared path is tried in
/// each of its variants and the first hit fires. When none hits, every map
/// path whose own variants contain the declared path fires the handler
/// with that map path's entry; this fallback may call one handler several
/// times in a single pass. Otherwise the declared path must be present
/// verbatim.
///
/// Handler errors and panics are logged and collected; they never stop
/// the remaining watches.
pub fn dispatch(
    registry: &WatchRegistry,
    map: &ValuePathMap,
    voids: Option<&VoidContainerSet>,
    flatten: bool,
) -> DispatchReport {
    let mut report = DispatchReport::default();
    for (watch_path, entry) in registry.iter() {
        let Some(handler) = entry.handler() else {
            tracing::debug!(watch_path = %watch_path, "watch entry without handler skipped");
            continue;
        };
        let declared = parse_value_path(watch_path);
        match voids {
            Some(voids) if !flatten => {
                if let Some(hit) = voids.path_variants(&declared).iter().find_map(|v| map.get(v)) {
                    invoke(handler, watch_path, hit, &mut report);
                    continue;
                }
                for (map_path, hit) in map {
                    if reduces_to(voids, map_path, &declared) {
                        invoke(handler, watch_path, hit, &mut report);
                    }
                }
            }
            _ => {
                if let Some(hit) = map.get(&declared) {
                    invoke(handler, watch_path, hit, &mut report);
                }
            }
        }
    }
    report
}

fn reduces_to(voids: &VoidContainerSet, map_path: &ValuePath, declared: &ValuePath) -> bool {
    voids.path_variants(map_path).contains(declared)
}

fn invoke(handler: &Handler, watch_path: &str, entry: &PathEntry, report: &mut DispatchReport) {
    report.invoked += 1;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(&entry.value, &entry.index)));
    let message = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(err)) => err.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };
    tracing::warn!(watch_path = %watch_path, error = %message, "watch handler failed");
    report.faults.push(WatchFault { path: watch_path.to_string(), message });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// Map a change event and dispatch it to `registry`.
///
/// When `flatten` is set and a schema is present, both trees are flattened
/// before mapping, and declared paths are then matched verbatim.
pub fn values_watch(
    changed: &Value,
    all: &Value,
    registry: &WatchRegistry,
    schema: Option<&SchemaContext>,
    flatten: bool,
) -> DispatchReport {
    if registry.is_empty() {
        return DispatchReport::default();
    }
    let map = match schema {
        Some(schema) if flatten => {
            let flattener = Flattener::new(&schema.voids);
            map_changes(&flattener.flatten(changed), &flattener.flatten(all))
        }
        _ => map_changes(changed, all),
    };
    tracing::debug!(paths = map.len(), watches = registry.len(), flatten, "dispatching value change");
    dispatch(registry, &map, schema.map(|s| &s.voids), flatten)
}
