/*!
Canonical GELF messages.

A [`Message`] is a typed record with a fixed set of GELF fields and one extension map.
The extension map is flattened into `_`-prefixed sibling keys when the message is serialized.
See: <https://go2docs.graylog.org/current/getting_in_log_data/gelf.html#GELFPayloadSpecification>
*/

use std::{collections::BTreeMap, convert::TryFrom, fmt, str::FromStr};

use chrono::Utc;
use serde::{
    de::{self, Deserialize, Deserializer, Visitor},
    ser::{Serialize, SerializeMap, Serializer},
};

use crate::error::{Error, ErrorKind, ResultExt};

/**
The GELF version written into every message.
*/
pub const VERSION: &str = "1.1";

/**
Field names that an extension can't shadow once prefixed.

`id` is included because GELF collectors refuse an `_id` field.
*/
pub const RESERVED: &[&str] = &[
    "version",
    "host",
    "short_message",
    "full_message",
    "timestamp",
    "level",
    "id",
];

/**
A GELF message ready to be serialized.
*/
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    version: &'static str,
    host: String,
    short_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<Level>,
    timestamp: Timestamp,
    #[serde(flatten)]
    extensions: Extensions,
}

impl Message {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn short_message(&self) -> &str {
        &self.short_message
    }

    pub fn full_message(&self) -> Option<&str> {
        self.full_message.as_deref()
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /**
    Extension fields, keyed by their unprefixed name.
    */
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extensions.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /**
    Serialize the message as a single flat JSON object.
    */
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).kind(ErrorKind::Serialization, "failed to serialize GELF message")
    }
}

/**
Start building a message.
*/
pub fn builder() -> Builder {
    Builder::default()
}

/**
Build a message from its parts.

The timestamp is the current time.
*/
pub fn build(
    host: impl Into<String>,
    short_message: impl Into<String>,
    full_message: Option<String>,
    level: Option<Level>,
    extensions: impl IntoIterator<Item = (String, Value)>,
) -> Result<Message, Error> {
    let mut builder = builder().host(host).short_message(short_message);

    builder.full_message = full_message;
    builder.level = level;

    builder.fields(extensions).build()
}

/**
A builder for a [`Message`].

Building validates the required fields and extension keys.
Nothing is validated until [`Builder::build`] is called.
*/
#[derive(Debug, Default, Clone)]
pub struct Builder {
    host: Option<String>,
    short_message: Option<String>,
    full_message: Option<String>,
    level: Option<Level>,
    timestamp: Option<f64>,
    extensions: Vec<(String, Value)>,
}

impl Builder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn short_message(mut self, short_message: impl Into<String>) -> Self {
        self.short_message = Some(short_message.into());
        self
    }

    pub fn full_message(mut self, full_message: impl Into<String>) -> Self {
        self.full_message = Some(full_message.into());
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /**
    Override the timestamp, in seconds since the Unix epoch.

    Without an override the message is stamped with the time it's built at,
    so building the same input twice gives two different timestamps.
    */
    pub fn timestamp(mut self, secs: f64) -> Self {
        self.timestamp = Some(secs);
        self
    }

    /**
    Add an extension field.

    The key is given without its `_` prefix.
    */
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.push((key.into(), value.into()));
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.extensions.extend(fields);
        self
    }

    pub fn build(self) -> Result<Message, Error> {
        let host = match self.host {
            Some(host) if !host.is_empty() => host,
            _ => bail!(Validation, "the `host` field is required"),
        };

        let short_message = match self.short_message {
            Some(short_message) if !short_message.is_empty() => short_message,
            _ => bail!(Validation, "the `short_message` field is required"),
        };

        let timestamp = match self.timestamp {
            Some(secs) => Timestamp::from_secs(secs)?,
            None => Timestamp::now(),
        };

        let mut extensions = BTreeMap::new();
        for (key, value) in self.extensions {
            validate_key(&key)?;

            if extensions.insert(key.clone(), value).is_some() {
                bail!(Validation, "the extension field `{}` is set more than once", key);
            }
        }

        Ok(Message {
            version: VERSION,
            host,
            short_message,
            full_message: self.full_message,
            level: self.level,
            timestamp,
            extensions: Extensions(extensions),
        })
    }
}

fn validate_key(key: &str) -> Result<(), Error> {
    if key.is_empty() {
        bail!(Validation, "extension field names can't be empty");
    }

    // GELF field names are restricted to `^[\w\.\-]*$`
    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '.' || *c == '-'))
    {
        bail!(
            Validation,
            "the extension field `{}` contains the invalid character {:?}",
            key,
            c
        );
    }

    if RESERVED.contains(&key) {
        bail!(
            Validation,
            "the extension field `{}` would shadow the reserved `{}` field",
            key,
            key
        );
    }

    Ok(())
}

/**
A syslog severity level.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Informational = 6,
    Debug = 7,
}

impl Level {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /**
    The standard syslog name of the level.
    */
    pub fn name(&self) -> &'static str {
        match self {
            Level::Emergency => "emerg",
            Level::Alert => "alert",
            Level::Critical => "crit",
            Level::Error => "err",
            Level::Warning => "warning",
            Level::Notice => "notice",
            Level::Informational => "info",
            Level::Debug => "debug",
        }
    }
}

impl TryFrom<i64> for Level {
    type Error = Error;

    fn try_from(level: i64) -> Result<Self, Error> {
        Ok(match level {
            0 => Level::Emergency,
            1 => Level::Alert,
            2 => Level::Critical,
            3 => Level::Error,
            4 => Level::Warning,
            5 => Level::Notice,
            6 => Level::Informational,
            7 => Level::Debug,
            level => bail!(Validation, "the level {} is outside the syslog range 0-7", level),
        })
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(level) = s.parse::<i64>() {
            return Level::try_from(level);
        }

        Ok(match s.to_ascii_lowercase().as_str() {
            "emerg" | "emergency" => Level::Emergency,
            "alert" => Level::Alert,
            "crit" | "critical" => Level::Critical,
            "err" | "error" => Level::Error,
            "warning" | "warn" => Level::Warning,
            "notice" => Level::Notice,
            "info" | "informational" => Level::Informational,
            "debug" => Level::Debug,
            _ => bail!(Validation, "`{}` is not a syslog level", s),
        })
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LevelVisitor;

        impl<'de> Visitor<'de> for LevelVisitor {
            type Value = Level;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a syslog level number or name")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Level::try_from(value).map_err(|e| E::custom(e.message()))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match i64::try_from(value) {
                    Ok(value) => self.visit_i64(value),
                    Err(_) => Err(E::custom(format_args!(
                        "the level {} is outside the syslog range 0-7",
                        value
                    ))),
                }
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(|e: Error| E::custom(e.message()))
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}

/**
A GELF timestamp, in fractional seconds since the Unix epoch.
*/
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Timestamp(f64);

impl Timestamp {
    /**
    The current time, with millisecond precision.
    */
    pub fn now() -> Self {
        Timestamp(Utc::now().timestamp_millis() as f64 / 1_000f64)
    }

    pub fn from_secs(secs: f64) -> Result<Self, Error> {
        if !secs.is_finite() || secs.is_sign_negative() {
            bail!(Validation, "the timestamp {} is not a valid time since the epoch", secs);
        }

        Ok(Timestamp(secs))
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

/**
The value of an extension field.

GELF only supports scalar values, so arrays, objects and nulls can't be represented.
*/
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl TryFrom<serde_json::Value> for Value {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Null => bail!(Serialization, "extension fields can't be null"),
            serde_json::Value::Array(_) => {
                bail!(Serialization, "extension fields can't be arrays")
            }
            serde_json::Value::Object(_) => {
                bail!(Serialization, "extension fields can't be objects")
            }
        })
    }
}

impl<'a> From<&'a str> for Value {
    fn from(v: &'a str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Number(v.into())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Number(n) => n.serialize(serializer),
            Value::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Extensions(BTreeMap<String, Value>);

struct Prefixed<'a>(&'a str);

impl<'a> fmt::Display for Prefixed<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "_{}", self.0)
    }
}

impl<'a> Serialize for Prefixed<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl Serialize for Extensions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;

        for (k, v) in &self.0 {
            map.serialize_entry(&Prefixed(k), v)?;
        }

        map.end()
    }
}
