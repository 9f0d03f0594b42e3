mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{calls, recorder, tags};
use form_watch::counters::{FAILED_ATTEMPTS, NUMBER_OF_SUBMITS};
use form_watch::{
    CounterStore, FormConfig, FormCore, FormHost, SessionCounters, UsageLogger, WatchEntry,
    WatchRegistry,
};
use serde_json::{json, Value};

struct Host {
    values: Value,
    mount_calls: usize,
}

impl FormHost for Host {
    fn full_values(&self) -> Value {
        self.values.clone()
    }

    fn mount(&mut self) {
        self.mount_calls += 1;
        // The mount hook may seed values before immediate watches run.
        self.values["seeded"] = json!(true);
    }
}

fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "user": {
                "type": "object",
                "properties": {
                    "age": { "type": "number" },
                    "extra": {
                        "type": "void",
                        "widget": "collapse",
                        "properties": { "nick": { "type": "string" } }
                    }
                }
            },
            "tags": { "type": "array", "items": { "type": "string" } },
            "seeded": { "type": "boolean" }
        }
    })
}

#[test]
fn immediate_watches_fire_once_with_initial_slices() {
    let seen = calls();
    let mut registry = WatchRegistry::new()
        .immediate("name", recorder(&seen, "name"))
        .immediate("user.age", recorder(&seen, "user.age"))
        .immediate("tags", recorder(&seen, "tags"))
        .immediate("seeded", recorder(&seen, "seeded"))
        .on("user", recorder(&seen, "user"));
    registry.insert("broken", WatchEntry::Options { handler: None, immediate: true });

    let mut core = FormCore::new(FormConfig::default(), registry);
    core.set_schema(&schema()).unwrap();
    let mut host = Host {
        values: json!({"name": "ada", "user": {"age": 36}, "tags": ["x", "y"]}),
        mount_calls: 0,
    };

    let report = core.on_mount(&mut host, 1_000).expect("first mount runs");
    assert_eq!(report.invoked, 4);
    assert!(report.faults.is_empty());
    assert_eq!(host.mount_calls, 1);

    let mut got = tags(&seen);
    got.sort();
    assert_eq!(got, vec!["name", "seeded", "tags", "user.age"]);
    for (tag, value, _) in seen.borrow().iter() {
        let expected = match tag.as_str() {
            "name" => json!("ada"),
            "user.age" => json!(36),
            "tags" => json!(["x", "y"]),
            "seeded" => json!(true),
            other => panic!("unexpected watch {other}"),
        };
        assert_eq!(value, &expected);
    }

    assert!(core.on_mount(&mut host, 2_000).is_none());
    assert_eq!(host.mount_calls, 1);
    assert_eq!(seen.borrow().len(), 4);
}

#[test]
fn value_change_respects_flatten_config() {
    let seen = calls();
    let registry = WatchRegistry::new()
        .on("user.nick", recorder(&seen, "user.nick"))
        .on("user.extra.nick", recorder(&seen, "user.extra.nick"))
        .on("nick", recorder(&seen, "nick"));
    let changed = json!({"user": {"extra": {"nick": "n"}}});

    let mut core = FormCore::new(FormConfig::default(), registry.clone());
    core.set_schema(&schema()).unwrap();
    core.on_values_change(&changed, &changed);
    // Unflattened: the container path is removed as a whole, so the short
    // form of `user.extra.nick` is `nick`.
    assert_eq!(tags(&seen), vec!["user.extra.nick", "nick"]);

    seen.borrow_mut().clear();
    let config = FormConfig::from_json(&json!({"flattenData": true})).unwrap();
    let mut core = FormCore::new(config, registry);
    core.set_schema(&schema()).unwrap();
    core.on_values_change(&changed, &changed);
    assert_eq!(tags(&seen), vec!["user.nick"]);
}

#[test]
fn submit_flattens_and_counts_attempts() {
    let logs = Rc::new(RefCell::new(Vec::new()));
    let sink = logs.clone();
    let config = FormConfig { flatten_data: true, id: Some("profile".to_string()), ..Default::default() };
    let usage = UsageLogger::new(SessionCounters::new())
        .with_id(config.id.clone())
        .on_submit(move |log| sink.borrow_mut().push(log.clone()));
    let mut core = FormCore::with_usage(config, WatchRegistry::new(), usage);
    core.set_schema(&schema()).unwrap();

    let mut host = Host { values: json!({}), mount_calls: 0 };
    core.on_mount(&mut host, 10_000);

    let submitted =
        core.on_submit(&json!({"user": {"age": 1, "extra": {"nick": "n"}}}), &[], 12_000).unwrap();
    assert_eq!(submitted, json!({"user": {"age": 1, "nick": "n"}}));
    core.on_submit(&submitted, &[json!({"name": ["user", "age"], "errors": ["too young"]})], 13_000)
        .unwrap();

    let logs = logs.borrow();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].ms, 2_000);
    assert_eq!(logs[0].duration, "00:00:02");
    assert_eq!(logs[0].id.as_deref(), Some("profile"));
    assert_eq!(logs[1].number_of_submits, 2);
    assert_eq!(logs[1].failed_attempts, 1);
    assert_eq!(core.usage().counters().get(NUMBER_OF_SUBMITS), 2);
    assert_eq!(core.usage().counters().get(FAILED_ATTEMPTS), 1);
}

#[test]
fn submit_without_flatten_returns_values_unchanged() {
    let mut core = FormCore::new(FormConfig::default(), WatchRegistry::new());
    core.set_schema(&schema()).unwrap();
    let values = json!({"user": {"extra": {"nick": "n"}}});
    assert_eq!(core.submit_values(&values), values);
}

#[test]
fn schema_path_resolution() {
    let mut core = FormCore::new(FormConfig::default(), WatchRegistry::new());
    assert_eq!(core.resolve_schema_path("user.age"), None);
    core.set_schema(&schema()).unwrap();
    assert_eq!(
        core.resolve_schema_path("user.extra.nick").as_deref(),
        Some("properties.user.properties.extra.properties.nick")
    );
    assert_eq!(core.resolve_schema_path("tags[]").as_deref(), Some("properties.tags.items"));
}

fn submit_core(logs: &Rc<RefCell<Vec<form_watch::SubmitLog>>>) -> FormCore {
    let sink = logs.clone();
    let config = FormConfig { flatten_data: true, ..Default::default() };
    let usage = UsageLogger::new(SessionCounters::new())
        .on_submit(move |log| sink.borrow_mut().push(log.clone()));
    let mut core = FormCore::with_usage(config, WatchRegistry::new(), usage).before_finish(|ctx| {
        if ctx.data["user"]["age"].as_i64().unwrap_or(0) < 18 {
            vec![json!({"name": ["user", "age"], "errors": ["too young"]})]
        } else {
            Vec::new()
        }
    });
    core.set_schema(&schema()).unwrap();
    core
}

#[test]
fn before_finish_veto_skips_submit_log() {
    let logs = Rc::new(RefCell::new(Vec::new()));
    let mut core = submit_core(&logs);

    let vetoed = core.on_submit(&json!({"user": {"age": 12, "extra": {"nick": "n"}}}), &[], 5_000);
    assert_eq!(vetoed, Err(vec![json!({"name": ["user", "age"], "errors": ["too young"]})]));
    assert!(logs.borrow().is_empty());
    assert_eq!(core.usage().counters().get(NUMBER_OF_SUBMITS), 0);
}

#[test]
fn before_finish_sees_prepared_values_and_lets_submit_through() {
    let logs = Rc::new(RefCell::new(Vec::new()));
    let mut core = submit_core(&logs);

    let submitted = core.on_submit(&json!({"user": {"age": 30, "extra": {"nick": "n"}}}), &[], 5_000);
    assert_eq!(submitted, Ok(json!({"user": {"age": 30, "nick": "n"}})));
    assert_eq!(logs.borrow().len(), 1);
    assert_eq!(logs.borrow()[0].number_of_submits, 1);
}

#[test]
fn before_finish_is_skipped_for_failed_validation() {
    let logs = Rc::new(RefCell::new(Vec::new()));
    let mut core = submit_core(&logs);

    let errors = [json!({"name": ["name"], "errors": ["required"]})];
    let submitted = core.on_submit(&json!({"user": {"age": 3}}), &errors, 5_000);
    assert!(submitted.is_ok());
    assert_eq!(logs.borrow()[0].failed_attempts, 1);
}

#[test]
fn checkbox_array_field_keeps_containers_active() {
    let seen = calls();
    let registry = WatchRegistry::new().on("b", recorder(&seen, "b"));
    let config = FormConfig::from_json(&json!({"flattenData": true})).unwrap();
    let mut core = FormCore::new(config, registry);
    core.set_schema(&json!({
        "type": "object",
        "properties": {
            "card": { "type": "void", "properties": { "b": { "type": "string" } } },
            "colors": { "type": "array", "widget": "checkboxes", "props": { "options": ["r", "g"] } }
        }
    }))
    .unwrap();

    let values = json!({"card": {"b": "x"}, "colors": ["r"]});
    assert_eq!(core.submit_values(&values), json!({"b": "x", "colors": ["r"]}));
    core.on_values_change(&values, &values);
    assert_eq!(tags(&seen), vec!["b"]);
}
