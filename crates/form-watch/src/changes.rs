//! Change path mapping.
//!
//! Turns a changed-values delta plus the full value tree into a flat map
//! from value path to the value a watcher of that path should see.

use form_watch_path::ValuePath;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::value::is_truthy;

/// Where a recorded value sits inside its ancestor arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexPath {
    /// Element indices of the enclosing arrays, outermost first.
    Indices(Vec<usize>),
    /// The raw changed-values delta. Only used by the root (`#`) entry.
    Delta(Value),
}

impl IndexPath {
    pub fn indices(&self) -> Option<&[usize]> {
        match self {
            IndexPath::Indices(indices) => Some(indices),
            IndexPath::Delta(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry {
    pub value: Value,
    pub index: IndexPath,
}

/// Recorded paths in traversal order.
pub type ValuePathMap = IndexMap<ValuePath, PathEntry>;

/// How a changed array relates to the full array it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayChange {
    /// Number of changed slots that carry a truthy value.
    pub filter_len: usize,
    /// Whether leaves below the elements are recorded.
    pub flag: bool,
    /// Items are being removed: the array path itself is the event and no
    /// per-element entries are recorded.
    pub is_remove: bool,
}

impl ArrayChange {
    /// Classify a changed array against the length of its full counterpart.
    ///
    /// `null` slots stand for elements the edit did not touch, so only
    /// truthy slots count.
    pub fn classify(list: &[Value], full_len: usize) -> Self {
        let filter_len = list.iter().filter(|item| is_truthy(item)).count();
        if filter_len > 1 && filter_len < full_len {
            return Self { filter_len, flag: false, is_remove: true };
        }
        Self {
            filter_len,
            flag: filter_len != full_len || list.len() == 1,
            is_remove: false,
        }
    }
}

/// Map a change event onto value paths.
///
/// The root entry `#` holds the full values with the raw delta as its
/// index. Object and array paths are always recorded; a leaf is recorded
/// unless an enclosing array change was classified as non-uniform, in which
/// case the array path is the unit of notification.
///
/// ```
/// use form_watch::{map_changes, IndexPath, ValuePath};
/// use serde_json::json;
///
/// let all = json!({"list": [{"name": "a"}, {"name": "y"}, {"name": "c"}]});
/// let changed = json!({"list": [null, {"name": "y"}]});
/// let map = map_changes(&changed, &all);
/// let entry = &map[&ValuePath::from("list[].name")];
/// assert_eq!(entry.value, json!("y"));
/// assert_eq!(entry.index, IndexPath::Indices(vec![1]));
/// ```
pub fn map_changes(changed: &Value, all: &Value) -> ValuePathMap {
    let mut mapper = ChangeMapper { map: ValuePathMap::new() };
    mapper.map.insert(
        ValuePath::root(),
        PathEntry { value: all.clone(), index: IndexPath::Delta(changed.clone()) },
    );
    if let Value::Object(obj) = changed {
        mapper.object(obj, Some(all), &ValuePath::root(), &[], true);
    }
    mapper.map
}

struct ChangeMapper {
    map: ValuePathMap,
}

impl ChangeMapper {
    fn record(&mut self, path: ValuePath, value: Value, index: &[usize]) {
        self.map.insert(path, PathEntry { value, index: IndexPath::Indices(index.to_vec()) });
    }

    fn object(
        &mut self,
        obj: &Map<String, Value>,
        full: Option<&Value>,
        path: &ValuePath,
        index: &[usize],
        record_leaves: bool,
    ) {
        for (key, item) in obj {
            let full_item = full.and_then(|f| f.get(key.as_str()));
            let child = path.join_key(key.as_str());
            match item {
                Value::Array(list) => {
                    self.array(list, full_item, &child, index);
                    self.record(child, full_item.cloned().unwrap_or(Value::Null), index);
                }
                Value::Object(nested) => {
                    self.object(nested, full_item, &child, index, record_leaves);
                    self.record(child, item.clone(), index);
                }
                _ if record_leaves => self.record(child, item.clone(), index),
                _ => {}
            }
        }
    }

    fn array(&mut self, list: &[Value], full: Option<&Value>, path: &ValuePath, index: &[usize]) {
        if list.is_empty() {
            return;
        }
        let path = path.join_array();
        let full_list = full.and_then(Value::as_array);
        let change = ArrayChange::classify(list, full_list.map_or(0, Vec::len));

        for (idx, item) in list.iter().enumerate() {
            // Untouched slot.
            if item.is_null() {
                continue;
            }
            let full_item = full_list.and_then(|l| l.get(idx));
            if !change.is_remove {
                self.record(path.clone(), full_item.cloned().unwrap_or(Value::Null), index);
            }
            let mut nested = index.to_vec();
            nested.push(idx);
            match item {
                Value::Object(obj) => self.object(obj, full_item, &path, &nested, change.flag),
                Value::Array(inner) => self.array(inner, full_item, &path, &nested),
                _ => {}
            }
        }
    }
}
