mod common;

use common::context;
use form_watch::{Flattener, SchemaContext, Segment, ValuePath};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn schema() -> SchemaContext {
    context(json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "card": {
                "type": "void",
                "properties": {
                    "name": { "type": "string" },
                    "inner": {
                        "type": "object",
                        "widget": "box",
                        "properties": { "deep": { "type": "number" } }
                    }
                }
            },
            "group": {
                "type": "object",
                "properties": {
                    "panel": { "type": "void", "properties": { "z": { "type": "string" } } },
                    "w": { "type": "number" }
                }
            },
            "list": {
                "type": "array",
                "items": { "type": "object", "properties": { "n": { "type": "string" } } }
            }
        }
    }))
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-5i64..5).prop_map(|n| json!(n)),
        "[a-c]{0,3}".prop_map(Value::String),
    ]
}

fn object(fields: Vec<(&'static str, Option<Value>)>) -> Value {
    let map: Map<String, Value> = fields
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect();
    Value::Object(map)
}

fn maybe_object_or_leaf(inner: BoxedStrategy<Value>) -> impl Strategy<Value = Option<Value>> {
    prop::option::of(prop_oneof![inner, leaf()])
}

fn form_values() -> impl Strategy<Value = Value> {
    let inner = prop::option::of(leaf())
        .prop_map(|deep| object(vec![("deep", deep)]))
        .boxed();
    let card = (prop::option::of(leaf()), maybe_object_or_leaf(inner))
        .prop_map(|(name, inner)| object(vec![("name", name), ("inner", inner)]))
        .boxed();
    let panel = prop::option::of(leaf()).prop_map(|z| object(vec![("z", z)])).boxed();
    let group = (maybe_object_or_leaf(panel), prop::option::of(leaf()))
        .prop_map(|(panel, w)| object(vec![("panel", panel), ("w", w)]))
        .boxed();
    let list = prop::collection::vec(
        prop::option::of(leaf()).prop_map(|n| object(vec![("n", n)])),
        0..3,
    )
    .prop_map(Value::Array);

    (
        prop::option::of(leaf()),
        maybe_object_or_leaf(card),
        maybe_object_or_leaf(group),
        prop::option::of(list),
    )
        .prop_map(|(title, card, group, list)| {
            object(vec![("title", title), ("card", card), ("group", group), ("list", list)])
        })
}

fn declared_path() -> impl Strategy<Value = ValuePath> {
    let segment = prop_oneof![
        prop::sample::select(vec!["card", "inner", "group", "panel", "name", "z", "list", "n"])
            .prop_map(|k| Segment::Key(k.to_string())),
        Just(Segment::Array),
    ];
    prop::collection::vec(segment, 0..6).prop_map(ValuePath::from_segments)
}

proptest! {
    #[test]
    fn flatten_is_idempotent(value in form_values()) {
        let flattener = Flattener::new(&schema().voids);
        let once = flattener.flatten(&value);
        let twice = flattener.flatten(&once);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn flatten_never_touches_its_input(value in form_values()) {
        let before = value.clone();
        let _ = Flattener::new(&schema().voids).flatten(&value);
        prop_assert_eq!(value, before);
    }

    #[test]
    fn variants_contain_identity_first(path in declared_path()) {
        let variants = schema().voids.path_variants(&path);
        prop_assert_eq!(variants.first(), Some(&path));
        for variant in &variants {
            prop_assert!(variant.len() <= path.len());
        }
        let mut unique = variants.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), variants.len());
    }
}

#[test]
fn flatten_lifts_nested_and_grouped_containers() {
    let value = json!({
        "title": "t",
        "card": { "name": "n", "inner": { "deep": 1 } },
        "group": { "panel": { "z": "zz" }, "w": 2 },
        "list": [{ "n": "a" }]
    });
    let out = Flattener::new(&schema().voids).flatten(&value);
    assert_eq!(
        out,
        json!({
            "title": "t",
            "name": "n",
            "deep": 1,
            "group": { "z": "zz", "w": 2 },
            "list": [{ "n": "a" }]
        })
    );
}
