//! Void-container resolution.
//!
//! A void container is a schema node that only exists for layout. Values
//! may or may not carry a level for it depending on whether they were
//! flattened, so watch paths and value-map paths are reconciled by
//! generating path variants with container segments removed.

use form_watch_path::{Segment, ValuePath};

use crate::schema::{FlattenedSchemaIndex, SchemaNode};

/// Widgets that only group other fields visually and never bind data.
pub const LAYOUT_WIDGETS: [&str; 11] = [
    "collapse",
    "boxCollapse",
    "card",
    "boxcard",
    "boxLineTitle",
    "boxSubInline",
    "lineTitle",
    "subInline",
    "box",
    "group",
    "fieldset",
];

pub fn is_layout_widget(widget: &str) -> bool {
    LAYOUT_WIDGETS.contains(&widget)
}

/// Whether a schema node is a pure layout container.
pub fn is_container_node(node: &SchemaNode) -> bool {
    (node.is_void() && !node.has_binding()) || node.widget.as_deref().is_some_and(is_layout_widget)
}

/// The container paths of one schema version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoidContainerSet {
    /// Schema order.
    paths: Vec<ValuePath>,
    /// Containers outside arrays, longest formatted path first, ties in
    /// schema order.
    by_length: Vec<ValuePath>,
}

impl VoidContainerSet {
    pub fn from_index(index: &FlattenedSchemaIndex) -> Self {
        let paths: Vec<ValuePath> = index
            .iter()
            .filter(|(path, node)| !path.is_root() && is_container_node(node))
            .map(|(path, _)| path.clone())
            .collect();
        let mut by_length: Vec<ValuePath> = paths
            .iter()
            .filter(|path| !path.segments().iter().any(Segment::is_array))
            .cloned()
            .collect();
        by_length.sort_by_key(|path| std::cmp::Reverse(path.to_string().len()));
        Self { paths, by_length }
    }

    pub fn is_void_container(&self, path: &ValuePath) -> bool {
        self.paths.contains(path)
    }

    /// Container paths in schema order.
    pub fn paths(&self) -> &[ValuePath] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// All renderings of `path` with zero or more container levels removed.
    ///
    /// The original path always comes first. Containers are applied
    /// innermost (longest) first; for each one, every candidate collected so
    /// far that runs through the container gets a copy with the container
    /// segments removed. A candidate equal to a container path yields
    /// nothing new. Containers below an array level never rewrite a path,
    /// so an array row's fields keep their array scope. The result is
    /// deduplicated in discovery order.
    pub fn path_variants(&self, path: &ValuePath) -> Vec<ValuePath> {
        let mut variants = vec![path.clone()];
        for container in &self.by_length {
            let removed: Vec<ValuePath> = variants
                .iter()
                .filter_map(|variant| variant.remove_window(container))
                .collect();
            for variant in removed {
                if !variants.contains(&variant) {
                    variants.push(variant);
                }
            }
        }
        variants
    }
}
