//! form-watch: value change tracking for schema-driven forms.
//!
//! The engine answers one question per edit: which declared watch paths
//! changed, and with what value. It flattens the delta and the full value
//! tree into a [`ValuePathMap`], reconciles layout-only (void) container
//! levels between declared paths and value paths, and invokes the matching
//! handlers, containing any handler failure.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use form_watch::{values_watch, WatchRegistry};
//! use serde_json::json;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! let registry = WatchRegistry::new().on("user.name", move |value, _| {
//!     sink.borrow_mut().push(value.clone());
//!     Ok(())
//! });
//!
//! let all = json!({"user": {"name": "ada", "age": 36}});
//! values_watch(&json!({"user": {"name": "ada"}}), &all, &registry, None, false);
//! assert_eq!(*seen.borrow(), vec![json!("ada")]);
//! ```

pub mod changes;
pub mod cli;
pub mod counters;
pub mod error;
pub mod flatten;
pub mod form;
pub mod immediate;
pub mod schema;
pub mod usage;
pub mod value;
pub mod void;
pub mod watch;

pub use changes::{map_changes, ArrayChange, IndexPath, PathEntry, ValuePathMap};
pub use counters::{CounterStore, SessionCounters};
pub use error::{HandlerError, SchemaError};
pub use flatten::{flatten_values, ContainerOutcome, FlattenReport, Flattener};
pub use form::{BeforeFinish, FinishContext, FormConfig, FormCore, FormHost};
pub use form_watch_path::{format_value_path, parse_value_path, Segment, ValuePath};
pub use immediate::immediate_watch;
pub use schema::{resolve_schema_path, Bind, FlattenedSchemaIndex, SchemaContext, SchemaKind, SchemaNode};
pub use usage::{MountLog, SubmitLog, UsageLogger};
pub use void::{VoidContainerSet, LAYOUT_WIDGETS};
pub use watch::{dispatch, values_watch, DispatchReport, Handler, WatchEntry, WatchFault, WatchRegistry};
