/*!
The call boundary between an automation tool and the GELF emitter.

A caller hands over typed [`Params`] along with an execution [`Mode`] and gets
an [`Outcome`] back. The outcome has the same shape whether or not anything was
sent, so a dry run reports exactly the message a real run would deliver.
*/

use std::{collections::BTreeMap, convert::TryFrom, time::Duration};

use crate::{
    dest,
    diagnostics::emit,
    error::{Error, ErrorKind, ResultExt},
    message::{self, Level, Message, Value},
    send::{self, Dispatcher},
};

/**
The parameters of a single invocation.
*/
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    /**
    Where to deliver the message, like `udp://collector:12201`.
    */
    #[serde(default)]
    pub dest: String,
    /**
    The host the message is from.

    Defaults to the host name of the local machine.
    */
    #[serde(default)]
    pub host: Option<String>,
    /**
    The short message.
    */
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub full_message: Option<String>,
    #[serde(default)]
    pub level: Option<Level>,
    /**
    Seconds since the Unix epoch.

    Defaults to the time the message is built.
    */
    #[serde(default)]
    pub timestamp: Option<f64>,
    /**
    Additional fields, without their `_` prefix.
    */
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /**
    Overrides the configured network timeout.

    Must be greater than zero.
    */
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/**
How an invocation is executed.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /**
    Build the message and deliver it.
    */
    Apply,
    /**
    Build and serialize the message, but don't deliver it.

    The destination isn't parsed and no network activity happens.
    */
    Check,
}

/**
The result reported back to the caller.
*/
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /**
    The serialized GELF message.
    */
    pub gelf: String,
    /**
    Whether a message was delivered, or in check mode, would have been.
    */
    pub changed: bool,
    /**
    Whether the message was delivered.

    For `udp` destinations this only means the datagram was sent.
    */
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/**
Run a single invocation.

Failures to build or serialize the message, and invalid destinations, are
returned as errors since there's nothing to deliver. Failed deliveries are
reported on the [`Outcome`].
*/
pub fn run(params: Params, mode: Mode, config: &send::Config) -> Result<Outcome, Error> {
    let msg = build(&params)?;

    if params.timeout_ms == Some(0) {
        bail!(Validation, "`timeout_ms` must be greater than zero");
    }

    match mode {
        Mode::Check => {
            let gelf = msg.to_json()?;

            emit("Running in check mode; the message won't be delivered");

            Ok(Outcome {
                gelf,
                changed: true,
                delivered: false,
                error: None,
            })
        }
        Mode::Apply => {
            let dest = dest::parse(&params.dest)?;

            let mut config = config.clone();
            if let Some(timeout_ms) = params.timeout_ms {
                config.timeout = Some(Duration::from_millis(timeout_ms));
            }

            let delivery = Dispatcher::new(config).deliver(&msg, &dest)?;

            Ok(Outcome {
                gelf: delivery.payload,
                changed: delivery.delivered,
                delivered: delivery.delivered,
                error: delivery.error.map(|err| err.to_string()),
            })
        }
    }
}

fn build(params: &Params) -> Result<Message, Error> {
    let host = match params.host {
        Some(ref host) => host.clone(),
        None => local_hostname()?,
    };

    let mut builder = message::builder()
        .host(host)
        .short_message(params.message.clone());

    if let Some(ref full_message) = params.full_message {
        builder = builder.full_message(full_message.clone());
    }

    if let Some(level) = params.level {
        builder = builder.level(level);
    }

    if let Some(timestamp) = params.timestamp {
        builder = builder.timestamp(timestamp);
    }

    for (key, value) in &params.fields {
        builder = builder.field(key.clone(), Value::try_from(value.clone())?);
    }

    builder.build()
}

fn local_hostname() -> Result<String, Error> {
    hostname::get()
        .kind(
            ErrorKind::Validation,
            "no `host` was given and the local host name can't be read",
        )?
        .into_string()
        .map_err(|_| Error::msg(ErrorKind::Validation, "the local host name isn't valid UTF-8"))
}
