//! Host-facing form core: wires value-change and mount events into the
//! watch engine.

use serde::Deserialize;
use serde_json::Value;

use crate::counters::{CounterStore, SessionCounters};
use crate::error::SchemaError;
use crate::flatten::flatten_values;
use crate::immediate::immediate_watch;
use crate::schema::{resolve_schema_path, SchemaContext, SchemaNode};
use crate::usage::UsageLogger;
use crate::watch::{values_watch, DispatchReport, WatchRegistry};

/// Form-level options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormConfig {
    /// Remove void-container levels from values before watching and submit.
    pub flatten_data: bool,
    /// Accepted for compatibility; hidden-field filtering happens in the host.
    pub remove_hidden_data: bool,
    pub id: Option<String>,
}

impl FormConfig {
    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

/// What the core needs from the host form.
pub trait FormHost {
    /// The authoritative current values.
    fn full_values(&self) -> Value;

    /// Host mount hook, completed before immediate watches run.
    fn mount(&mut self) {}
}

/// What a pre-submit hook sees: the prepared values, the raw schema and
/// the validation errors of the attempt.
#[derive(Debug, Clone, Copy)]
pub struct FinishContext<'a> {
    pub data: &'a Value,
    pub schema: &'a Value,
    pub errors: &'a [Value],
}

/// Pre-submit hook. Returning any field errors vetoes the submit.
pub type BeforeFinish = Box<dyn Fn(&FinishContext<'_>) -> Vec<Value>>;

pub struct FormCore<S = SessionCounters> {
    config: FormConfig,
    watch: WatchRegistry,
    schema: Option<SchemaContext>,
    schema_json: Value,
    usage: UsageLogger<S>,
    before_finish: Option<BeforeFinish>,
    mounted: bool,
}

impl FormCore<SessionCounters> {
    pub fn new(config: FormConfig, watch: WatchRegistry) -> Self {
        let usage = UsageLogger::default().with_id(config.id.clone());
        Self::with_usage(config, watch, usage)
    }
}

impl<S: CounterStore> FormCore<S> {
    pub fn with_usage(config: FormConfig, watch: WatchRegistry, usage: UsageLogger<S>) -> Self {
        Self {
            config,
            watch,
            schema: None,
            schema_json: Value::Null,
            usage,
            before_finish: None,
            mounted: false,
        }
    }

    pub fn before_finish(
        mut self,
        hook: impl Fn(&FinishContext<'_>) -> Vec<Value> + 'static,
    ) -> Self {
        self.before_finish = Some(Box::new(hook));
        self
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn usage(&self) -> &UsageLogger<S> {
        &self.usage
    }

    pub fn schema(&self) -> Option<&SchemaContext> {
        self.schema.as_ref()
    }

    /// Replace the schema, rebuilding the index and the container set.
    ///
    /// # Errors
    ///
    /// On an invalid schema the previous one is kept.
    pub fn set_schema(&mut self, schema: &Value) -> Result<(), SchemaError> {
        let root = SchemaNode::from_json(schema)?;
        let context = SchemaContext::new(root);
        tracing::debug!(
            nodes = context.index.len(),
            containers = context.voids.paths().len(),
            "schema loaded"
        );
        self.schema = Some(context);
        self.schema_json = schema.clone();
        Ok(())
    }

    /// Dispatch one edit to the registered watches.
    pub fn on_values_change(&self, changed: &Value, all: &Value) -> DispatchReport {
        values_watch(changed, all, &self.watch, self.schema.as_ref(), self.config.flatten_data)
    }

    /// Run the host mount hook, log the mount, then fire immediate watches.
    ///
    /// Only the first call does anything; later calls return `None`.
    pub fn on_mount(&mut self, host: &mut impl FormHost, now_ms: i64) -> Option<DispatchReport> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        host.mount();
        let values = host.full_values();
        self.usage.mounted(now_ms, &values, &self.schema_json);
        Some(immediate_watch(&self.watch, &values, self.schema.as_ref(), self.config.flatten_data))
    }

    /// Values as handed to finish callbacks.
    pub fn submit_values(&self, values: &Value) -> Value {
        match &self.schema {
            Some(schema) if self.config.flatten_data => flatten_values(values, schema),
            _ => values.clone(),
        }
    }

    /// Prepare values for a submit and record the attempt.
    ///
    /// A clean attempt first goes through the pre-submit hook. When the hook
    /// returns field errors they come back as `Err` for the host to show,
    /// and the attempt is neither logged nor counted.
    pub fn on_submit(
        &mut self,
        values: &Value,
        errors: &[Value],
        now_ms: i64,
    ) -> Result<Value, Vec<Value>> {
        let values = self.submit_values(values);
        if errors.is_empty() {
            if let Some(hook) = &self.before_finish {
                let field_errors =
                    hook(&FinishContext { data: &values, schema: &self.schema_json, errors: &[] });
                if !field_errors.is_empty() {
                    tracing::debug!(fields = field_errors.len(), "submit vetoed before finish");
                    return Err(field_errors);
                }
            }
        }
        self.usage.submitted(now_ms, &values, errors, &self.schema_json);
        Ok(values)
    }

    /// See [`resolve_schema_path`]. `None` until a schema is set.
    pub fn resolve_schema_path(&self, data_path: &str) -> Option<String> {
        self.schema.as_ref().map(|schema| resolve_schema_path(data_path, &schema.root))
    }
}
