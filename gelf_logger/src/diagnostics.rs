/*!
Diagnostics for the GELF emitter itself.

Events are written as CLEF to `stderr`, so they never mix with the
result record a caller reads from `stdout`.
*/

use std::{fmt::Display, sync::Mutex};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/**
Diagnostics configuration.
*/
#[derive(Debug, Clone)]
pub struct Config {
    /**
    The minimum level of events to write.
    */
    pub min_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_level: Level::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

lazy_static! {
    static ref ACTIVE: Mutex<Option<Config>> = Mutex::new(None);
}

/**
Start writing diagnostics with the given configuration.
*/
pub fn init(config: Config) {
    if let Ok(mut active) = ACTIVE.lock() {
        *active = Some(config);
    }
}

/**
Stop writing diagnostics.

Any collected metrics are written before returning.
*/
pub fn stop() -> Result<(), anyhow::Error> {
    emit_metrics();

    let mut active = ACTIVE
        .lock()
        .map_err(|_| anyhow::anyhow!("diagnostics state is poisoned"))?;

    match active.take() {
        Some(_) => Ok(()),
        None => Err(anyhow::anyhow!("diagnostics were never initialized")),
    }
}

fn enabled(level: Level) -> bool {
    let min_level = ACTIVE
        .lock()
        .ok()
        .and_then(|active| active.as_ref().map(|config| config.min_level))
        .unwrap_or(Config::default().min_level);

    level >= min_level
}

#[derive(Serialize)]
struct DiagnosticEvent<'a> {
    #[serde(rename = "@t")]
    timestamp: DateTime<Utc>,

    #[serde(rename = "@l")]
    level: &'static str,

    #[serde(rename = "@mt")]
    message_template: &'a str,

    #[serde(rename = "@x")]
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,

    #[serde(flatten)]
    properties: Map<String, Value>,
}

impl<'a> DiagnosticEvent<'a> {
    fn new(
        level: Level,
        error: Option<&'a str>,
        message_template: &'a str,
        properties: &[(&str, Value)],
    ) -> DiagnosticEvent<'a> {
        DiagnosticEvent {
            timestamp: Utc::now(),
            level: level.as_str(),
            message_template,
            error,
            properties: properties
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect(),
        }
    }
}

fn write(level: Level, error: Option<&str>, message_template: &str, properties: &[(&str, Value)]) {
    if !enabled(level) {
        return;
    }

    let evt = DiagnosticEvent::new(level, error, message_template, properties);
    if let Ok(json) = serde_json::to_string(&evt) {
        eprintln!("{}", json);
    }
}

pub fn emit(message_template: &str) {
    write(Level::Info, None, message_template, &[])
}

pub fn emit_debug(message_template: &str, properties: &[(&str, Value)]) {
    write(Level::Debug, None, message_template, properties)
}

pub fn emit_warn(message_template: &str, properties: &[(&str, Value)]) {
    write(Level::Warn, None, message_template, properties)
}

pub fn emit_err(error: &impl Display, message_template: &str) {
    let err_str = format!("{}", error);
    write(Level::Error, Some(&err_str), message_template, &[])
}

fn emit_metrics() {
    let properties: Vec<(&str, Value)> = crate::send::metrics::snapshot()
        .into_iter()
        .map(|(name, count)| (name, Value::from(count)))
        .collect();

    write(
        Level::Debug,
        None,
        "Collected delivery metrics",
        &properties,
    );
}

/**
Declare a set of counters for the enclosing module.

Counters are bumped with `increment!(module.counter)`.
*/
macro_rules! metrics {
    ($($metric:ident),* $(,)?) => {
        #[allow(non_upper_case_globals)]
        pub(crate) mod metrics {
            use std::sync::atomic::{AtomicUsize, Ordering};

            $(
                pub(crate) static $metric: AtomicUsize = AtomicUsize::new(0);
            )*

            pub(crate) fn snapshot() -> Vec<(&'static str, usize)> {
                vec![
                    $(
                        (stringify!($metric), $metric.load(Ordering::Relaxed)),
                    )*
                ]
            }
        }
    };
}

macro_rules! increment {
    ($module:ident.$metric:ident) => {
        $crate::$module::metrics::$metric.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    };
}
