#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use form_watch::{HandlerError, IndexPath, SchemaContext, SchemaNode};
use serde_json::Value;

pub type Calls = Rc<RefCell<Vec<(String, Value, IndexPath)>>>;

pub fn calls() -> Calls {
    Rc::new(RefCell::new(Vec::new()))
}

/// Handler that records `(tag, value, index)` for every call.
pub fn recorder(
    calls: &Calls,
    tag: &str,
) -> impl Fn(&Value, &IndexPath) -> Result<(), HandlerError> + 'static {
    let calls = calls.clone();
    let tag = tag.to_string();
    move |value: &Value, index: &IndexPath| {
        calls.borrow_mut().push((tag.clone(), value.clone(), index.clone()));
        Ok(())
    }
}

pub fn tags(calls: &Calls) -> Vec<String> {
    calls.borrow().iter().map(|(tag, _, _)| tag.clone()).collect()
}

pub fn context(schema: Value) -> SchemaContext {
    SchemaContext::new(SchemaNode::from_json(&schema).expect("valid schema"))
}
