//! Optional usage logging: mount time, submit counts and failures.

use chrono::{Local, TimeZone};
use serde::Serialize;
use serde_json::Value;

use crate::counters::{
    CounterStore, SessionCounters, FAILED_ATTEMPTS, FORM_MOUNT_TIME, FORM_START, NUMBER_OF_SUBMITS,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MountLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub schema: Value,
    pub form_data: String,
    pub form_mount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub form_mount: String,
    pub ms: i64,
    pub duration: String,
    pub number_of_submits: i64,
    pub failed_attempts: i64,
    pub form_data: String,
    pub errors: String,
    pub schema: String,
}

type Callback<T> = Box<dyn Fn(&T)>;

/// Emits [`MountLog`] and [`SubmitLog`] records through optional callbacks,
/// keeping its running totals in a [`CounterStore`].
pub struct UsageLogger<S = SessionCounters> {
    counters: S,
    id: Option<String>,
    on_mount: Option<Callback<MountLog>>,
    on_submit: Option<Callback<SubmitLog>>,
}

impl Default for UsageLogger<SessionCounters> {
    fn default() -> Self {
        Self::new(SessionCounters::new())
    }
}

impl<S: CounterStore> UsageLogger<S> {
    pub fn new(counters: S) -> Self {
        Self { counters, id: None, on_mount: None, on_submit: None }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn on_mount(mut self, callback: impl Fn(&MountLog) + 'static) -> Self {
        self.on_mount = Some(Box::new(callback));
        self
    }

    pub fn on_submit(mut self, callback: impl Fn(&SubmitLog) + 'static) -> Self {
        self.on_submit = Some(Box::new(callback));
        self
    }

    pub fn counters(&self) -> &S {
        &self.counters
    }

    pub fn is_enabled(&self) -> bool {
        self.on_mount.is_some() || self.on_submit.is_some()
    }

    /// Record the mount. Resets the submit totals when submit logging is on.
    pub fn mounted(&mut self, now_ms: i64, form_data: &Value, schema: &Value) {
        if self.is_enabled() {
            self.counters.set(FORM_MOUNT_TIME, now_ms);
            self.counters.set(FORM_START, now_ms);
        }
        if let Some(callback) = &self.on_mount {
            callback(&MountLog {
                id: self.id.clone(),
                schema: schema.clone(),
                form_data: form_data.to_string(),
                form_mount: format_timestamp(now_ms),
            });
        }
        if self.on_submit.is_some() {
            self.counters.set(NUMBER_OF_SUBMITS, 0);
            self.counters.set(FAILED_ATTEMPTS, 0);
        }
    }

    /// Record a submit attempt. Non-empty `errors` count as a failure.
    pub fn submitted(&mut self, now_ms: i64, values: &Value, errors: &[Value], schema: &Value) {
        let Some(callback) = &self.on_submit else {
            return;
        };
        let start = self.counters.get(FORM_START);
        let mount = self.counters.get(FORM_MOUNT_TIME);
        let number_of_submits = self.counters.get(NUMBER_OF_SUBMITS) + 1;
        let mut failed_attempts = self.counters.get(FAILED_ATTEMPTS);
        if !errors.is_empty() {
            failed_attempts += 1;
        }
        let ms = now_ms - start;
        callback(&SubmitLog {
            id: self.id.clone(),
            form_mount: format_timestamp(mount),
            ms,
            duration: format_duration(ms),
            number_of_submits,
            failed_attempts,
            form_data: values.to_string(),
            errors: Value::Array(errors.to_vec()).to_string(),
            schema: schema.to_string(),
        });
        self.counters.set(FORM_START, now_ms);
        self.counters.set(NUMBER_OF_SUBMITS, number_of_submits);
        self.counters.set(FAILED_ATTEMPTS, failed_attempts);
    }
}

/// `YYYY-MM-DD HH:MM:SS` in local time.
pub fn format_timestamp(ms: i64) -> String {
    format_timestamp_in(ms, &Local)
}

pub fn format_timestamp_in<Tz: TimeZone>(ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(ms).earliest() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}

/// `HH:MM:SS` for a duration in milliseconds. Hours wrap at 24.
pub fn format_duration(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let seconds = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    let hours = (total_seconds / 3600) % 24;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
