use std::{
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    time::Duration,
};

use bytes::Bytes;

use futures::{future::BoxFuture, FutureExt, SinkExt};

use serde_json::Value;

use tokio::net::{lookup_host, UdpSocket};

use tokio_util::{codec::BytesCodec, udp::UdpFramed};

use crate::{
    dest::Destination,
    diagnostics::*,
    error::{Error, ErrorKind, ResultExt},
    send::{bounded, Sender},
};

/**
The largest payload GELF expects in a single, unchunked datagram.
*/
pub const CHUNK_THRESHOLD: usize = 8192;

/**
Deliver messages over UDP.

Each message is sent as exactly one datagram containing the raw payload.
Messages aren't chunked, so payloads larger than [`CHUNK_THRESHOLD`] may be
dropped or truncated on their way to the collector.

A successful delivery only means the datagram was sent from the local socket.
UDP gives no confirmation that the collector received it.
*/
#[derive(Debug, Clone)]
pub struct UdpSender {
    timeout: Option<Duration>,
}

impl UdpSender {
    pub fn new(timeout: Option<Duration>) -> Self {
        UdpSender { timeout }
    }

    async fn send(&self, payload: Bytes, dest: &Destination) -> Result<(), Error> {
        let addr = bounded(self.timeout, lookup_host((dest.host(), dest.port())))
            .await
            .kind(
                ErrorKind::Connection,
                format!("failed to resolve {}", dest.authority()),
            )?
            .next();

        let addr = match addr {
            Some(addr) => addr,
            None => bail!(
                Connection,
                "{} didn't resolve to any address",
                dest.authority()
            ),
        };

        if payload.len() > CHUNK_THRESHOLD {
            increment!(send.udp_oversized);

            emit_warn(
                "The {PayloadBytes} byte payload is larger than {ChunkThreshold} bytes and may be truncated",
                &[
                    ("PayloadBytes", Value::from(payload.len())),
                    ("ChunkThreshold", Value::from(CHUNK_THRESHOLD)),
                ],
            );
        }

        // Bind an ephemeral socket in the same family as the collector
        let local: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let sock = UdpSocket::bind(local)
            .await
            .kind(ErrorKind::Connection, "failed to bind a local UDP socket")?;

        let mut framed = UdpFramed::new(sock, BytesCodec::new());

        bounded(self.timeout, framed.send((payload, addr)))
            .await
            .kind(
                ErrorKind::Connection,
                format!("failed to send a datagram to {}", addr),
            )?;

        Ok(())
    }
}

impl Sender for UdpSender {
    fn deliver<'a>(
        &'a self,
        payload: Bytes,
        dest: &'a Destination,
    ) -> BoxFuture<'a, Result<(), Error>> {
        self.send(payload, dest).boxed()
    }
}
