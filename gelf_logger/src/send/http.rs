use std::time::Duration;

use bytes::Bytes;

use futures::{future::BoxFuture, FutureExt};

use reqwest::{header::CONTENT_TYPE, redirect::Policy};

use crate::{
    dest::Destination,
    error::{Error, ErrorKind, ResultExt},
    send::Sender,
};

/**
Deliver messages over HTTP.

Each message is the body of a single `POST` to the destination's path.
Any response status outside `2xx` is a failed delivery, including redirects,
which are never followed. Proxy environment variables are ignored so the
request always goes straight to the destination.
*/
#[derive(Debug, Clone)]
pub struct HttpSender {
    timeout: Option<Duration>,
}

impl HttpSender {
    pub fn new(timeout: Option<Duration>) -> Self {
        HttpSender { timeout }
    }

    async fn send(&self, payload: Bytes, dest: &Destination) -> Result<(), Error> {
        // The client is dropped at the end of the delivery, and never keeps
        // idle connections, so nothing outlives a single request
        let mut client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .redirect(Policy::none())
            .no_proxy();

        if let Some(timeout) = self.timeout {
            client = client.connect_timeout(timeout).timeout(timeout);
        }

        let client = client
            .build()
            .kind(ErrorKind::Http, "failed to create an HTTP client")?;

        let url = format!("http://{}{}", dest.authority(), dest.path());

        let res = client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .kind(ErrorKind::Http, format!("failed to POST to {}", url))?;

        let status = res.status();
        if !status.is_success() {
            bail!(Http, "{} responded with {}", url, status);
        }

        // Read the rest of the response before the connection is dropped
        res.bytes()
            .await
            .kind(ErrorKind::Http, format!("failed to read the response from {}", url))?;

        Ok(())
    }
}

impl Sender for HttpSender {
    fn deliver<'a>(
        &'a self,
        payload: Bytes,
        dest: &'a Destination,
    ) -> BoxFuture<'a, Result<(), Error>> {
        self.send(payload, dest).boxed()
    }
}
