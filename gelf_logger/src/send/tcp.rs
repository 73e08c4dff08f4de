use std::{io, time::Duration};

use bytes::{BufMut, Bytes, BytesMut};

use futures::{future::BoxFuture, FutureExt, SinkExt};

use tokio::{io::AsyncWriteExt, net::TcpStream};

use tokio_util::codec::{Encoder, FramedWrite};

use crate::{
    dest::Destination,
    error::{Error, ErrorKind, ResultExt},
    send::{bounded, Sender},
};

/**
Deliver messages over TCP.

Each message is written to a new connection, terminated by a null byte.
The connection is shut down once the message has been flushed.
*/
#[derive(Debug, Clone)]
pub struct TcpSender {
    timeout: Option<Duration>,
}

impl TcpSender {
    pub fn new(timeout: Option<Duration>) -> Self {
        TcpSender { timeout }
    }

    async fn send(&self, payload: Bytes, dest: &Destination) -> Result<(), Error> {
        let stream = bounded(self.timeout, TcpStream::connect((dest.host(), dest.port())))
            .await
            .kind(
                ErrorKind::Connection,
                format!("failed to connect to {}", dest.authority()),
            )?;

        // NOTE: The stream is owned by this future
        // If we return early, or the future is dropped, the connection
        // is closed along with it
        let mut framed = FramedWrite::new(stream, NullDelimited);

        bounded(self.timeout, framed.send(payload))
            .await
            .kind(
                ErrorKind::Connection,
                format!("failed to write to {}", dest.authority()),
            )?;

        let mut stream = framed.into_inner();
        bounded(self.timeout, stream.shutdown())
            .await
            .kind(
                ErrorKind::Connection,
                format!("failed to close the connection to {}", dest.authority()),
            )?;

        Ok(())
    }
}

impl Sender for TcpSender {
    fn deliver<'a>(
        &'a self,
        payload: Bytes,
        dest: &'a Destination,
    ) -> BoxFuture<'a, Result<(), Error>> {
        self.send(payload, dest).boxed()
    }
}

/**
GELF TCP framing.

Collectors split the stream on null bytes, so every payload is followed
by exactly one.
*/
struct NullDelimited;

impl Encoder<Bytes> for NullDelimited {
    type Error = io::Error;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        // A null byte inside the payload would end the frame early
        if payload.contains(&b'\0') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "GELF payloads sent over TCP can't contain null bytes",
            ));
        }

        dst.reserve(payload.len() + 1);
        dst.put_slice(&payload);
        dst.put_u8(b'\0');

        Ok(())
    }
}
