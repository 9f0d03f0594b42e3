//! Value flattening: removes void-container levels from a value tree.

use form_watch_path::ValuePath;
use serde_json::Value;

use crate::schema::SchemaContext;
use crate::value::is_truthy;
use crate::void::VoidContainerSet;

/// What happened to one container during a flatten pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerOutcome {
    /// The container's children were lifted into its parent.
    Lifted { keys: usize },
    /// A parent segment is absent, falsy, or not an object.
    ParentMissing,
    /// The parent exists but has no key for the container.
    ContainerAbsent,
    /// The container key holds something other than an object.
    NotAnObject,
    /// The container path has no object keys once array markers are removed.
    RootContainer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlattenReport {
    pub value: Value,
    pub outcomes: Vec<(ValuePath, ContainerOutcome)>,
}

/// Lifts container children into their parents, deepest containers first.
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    containers: Vec<ValuePath>,
}

impl Flattener {
    pub fn new(voids: &VoidContainerSet) -> Self {
        let mut containers = voids.paths().to_vec();
        // Deeper containers first, so lifting a shallow one never moves the
        // parent a deeper one is located through.
        containers.sort_by_key(|path| std::cmp::Reverse(path.depth()));
        Self { containers }
    }

    /// Flatten a copy of `value`. The input is never modified.
    pub fn flatten(&self, value: &Value) -> Value {
        self.flatten_with_report(value).value
    }

    pub fn flatten_with_report(&self, value: &Value) -> FlattenReport {
        let mut result = value.clone();
        let mut outcomes = Vec::with_capacity(self.containers.len());
        if self.containers.is_empty() || !is_truthy(value) {
            return FlattenReport { value: result, outcomes };
        }
        for container in &self.containers {
            let outcome = lift(&mut result, container);
            tracing::trace!(container = %container, ?outcome, "flatten void container");
            outcomes.push((container.clone(), outcome));
        }
        FlattenReport { value: result, outcomes }
    }
}

/// Flatten `value` against the containers of a schema.
pub fn flatten_values(value: &Value, schema: &SchemaContext) -> Value {
    Flattener::new(&schema.voids).flatten(value)
}

fn lift(root: &mut Value, container: &ValuePath) -> ContainerOutcome {
    let keys = container.concrete_keys();
    let Some((container_key, parent_keys)) = keys.split_last() else {
        return ContainerOutcome::RootContainer;
    };

    let mut parent = root;
    for key in parent_keys {
        match parent.get_mut(*key) {
            Some(next) if is_truthy(next) => parent = next,
            _ => return ContainerOutcome::ParentMissing,
        }
    }
    let Value::Object(parent) = parent else {
        return ContainerOutcome::ParentMissing;
    };

    let children = match parent.get(*container_key) {
        Some(Value::Object(children)) => children.clone(),
        Some(_) => return ContainerOutcome::NotAnObject,
        None => return ContainerOutcome::ContainerAbsent,
    };
    let lifted = children.len();
    // Children are written before the container key is dropped: a lifted
    // sibling with the same name replaces the existing one in place.
    for (key, child) in children {
        parent.insert(key, child);
    }
    parent.shift_remove(*container_key);
    ContainerOutcome::Lifted { keys: lifted }
}
