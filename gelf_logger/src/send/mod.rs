/*!
Deliver serialized messages to a collector.

Each transport has its own sender. The [`Dispatcher`] serializes a message once
and hands it to the sender for the destination's scheme.
*/

use std::{future::Future, io, time::Duration};

use bytes::Bytes;

use futures::future::BoxFuture;

use serde_json::Value;

use tokio::runtime;

use crate::{
    dest::{Destination, Scheme},
    diagnostics::*,
    error::{Error, ErrorKind, ResultExt},
    message::Message,
};

mod http;
mod tcp;
mod udp;

pub use self::{http::HttpSender, tcp::TcpSender, udp::UdpSender};

metrics! {
    tcp_ok,
    tcp_err,
    udp_ok,
    udp_err,
    udp_oversized,
    http_ok,
    http_err
}

/**
Delivery configuration.
*/
#[derive(Debug, Default, Clone)]
pub struct Config {
    /**
    The maximum time to spend on each network operation.

    This applies separately to connecting, writing, and waiting for an HTTP response.
    With no timeout, a delivery to an unresponsive collector may block indefinitely.
    */
    pub timeout: Option<Duration>,
}

/**
A transport that can deliver a serialized message.

A sender owns any socket or connection it opens for the lifetime of the
returned future. Dropping the future, whether it completed or not, releases it.
*/
pub trait Sender {
    fn deliver<'a>(
        &'a self,
        payload: Bytes,
        dest: &'a Destination,
    ) -> BoxFuture<'a, Result<(), Error>>;
}

/**
The outcome of a delivery attempt.
*/
#[derive(Debug)]
pub struct Delivery {
    /**
    The serialized message, whether or not it was delivered.
    */
    pub payload: String,
    /**
    Whether the message was handed to the collector.

    For UDP this only means the datagram left the local socket.
    The collector may still never receive it.
    */
    pub delivered: bool,
    /**
    Why the message wasn't delivered.
    */
    pub error: Option<Error>,
}

/**
Route messages to the sender for their destination.
*/
pub struct Dispatcher {
    tcp: TcpSender,
    udp: UdpSender,
    http: HttpSender,
}

impl Dispatcher {
    pub fn new(config: Config) -> Self {
        Dispatcher {
            tcp: TcpSender::new(config.timeout),
            udp: UdpSender::new(config.timeout),
            http: HttpSender::new(config.timeout),
        }
    }

    fn sender(&self, scheme: Scheme) -> &dyn Sender {
        match scheme {
            Scheme::Tcp => &self.tcp,
            Scheme::Udp => &self.udp,
            Scheme::Http => &self.http,
        }
    }

    /**
    Serialize a message and attempt to deliver it exactly once.

    Only a message that can't be serialized returns an error.
    Delivery failures are reported on the returned [`Delivery`].

    Delivery blocks the calling thread on its own runtime, so it fails with a
    `ConnectionError` when called from within an async runtime.
    */
    pub fn deliver(&self, msg: &Message, dest: &Destination) -> Result<Delivery, Error> {
        let payload = msg.to_json()?;

        Ok(match self.deliver_payload(Bytes::from(payload.clone()), dest) {
            Ok(()) => Delivery {
                payload,
                delivered: true,
                error: None,
            },
            Err(err) => Delivery {
                payload,
                delivered: false,
                error: Some(err),
            },
        })
    }

    /**
    Attempt to deliver an already serialized message exactly once.

    This can't be called from within an async runtime.
    */
    pub fn deliver_payload(&self, payload: Bytes, dest: &Destination) -> Result<(), Error> {
        emit_debug(
            "Delivering {PayloadBytes} bytes to {Destination}",
            &[
                ("PayloadBytes", Value::from(payload.len())),
                ("Destination", Value::from(dest.to_string())),
            ],
        );

        if runtime::Handle::try_current().is_ok() {
            bail!(
                Connection,
                "can't block on a delivery to {} from within an async runtime",
                dest
            );
        }

        // Run the delivery on a fresh runtime
        // Dropping it when we're done releases any sockets and
        // resolver threads the delivery used
        let runtime = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .kind(ErrorKind::Connection, "failed to start a runtime for delivery")?;

        let result = runtime.block_on(self.sender(dest.scheme()).deliver(payload, dest));

        match (dest.scheme(), &result) {
            (Scheme::Tcp, Ok(())) => increment!(send.tcp_ok),
            (Scheme::Tcp, Err(_)) => increment!(send.tcp_err),
            (Scheme::Udp, Ok(())) => increment!(send.udp_ok),
            (Scheme::Udp, Err(_)) => increment!(send.udp_err),
            (Scheme::Http, Ok(())) => increment!(send.http_ok),
            (Scheme::Http, Err(_)) => increment!(send.http_err),
        };

        if let Err(ref err) = result {
            emit_err(err, "GELF delivery failed");
        }

        result
    }
}

/**
Run a network operation, failing with `TimedOut` if it takes longer than `timeout`.
*/
pub(crate) async fn bounded<T>(
    timeout: Option<Duration>,
    op: impl Future<Output = io::Result<T>>,
) -> io::Result<T> {
    match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("timed out after {}", humantime::format_duration(timeout)),
            )),
        },
        None => op.await,
    }
}
