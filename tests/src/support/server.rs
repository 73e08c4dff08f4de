use std::{net::SocketAddr, time::Duration};

use crossbeam_channel::Receiver;

use super::{http, tcp, udp, Request};

pub struct Builder {
    http_status: u16,
    http_location: Option<String>,
    http_respond: bool,
}

impl Builder {
    fn new() -> Self {
        Builder {
            http_status: 202,
            http_location: None,
            http_respond: true,
        }
    }

    pub fn http_status(mut self, v: u16) -> Self {
        self.http_status = v;
        self
    }

    /**
    Answer every request with a `302` to `location`.
    */
    pub fn http_redirect(mut self, location: impl Into<String>) -> Self {
        self.http_status = 302;
        self.http_location = Some(location.into());
        self
    }

    /**
    Accept requests but never answer them.
    */
    pub fn http_unresponsive(mut self) -> Self {
        self.http_respond = false;
        self
    }

    pub fn tcp(self) -> Collector<Vec<u8>> {
        let (addr, rx) = tcp::listen();

        Collector::new("tcp", addr, rx)
    }

    pub fn udp(self) -> Collector<Vec<u8>> {
        let (addr, rx) = udp::listen();

        Collector::new("udp", addr, rx)
    }

    pub fn http(self) -> Collector<Request> {
        let (addr, rx) = http::listen(http::Config {
            status: self.http_status,
            location: self.http_location,
            respond: self.http_respond,
        });

        Collector::new("http", addr, rx)
    }
}

/**
A fake GELF collector running on a background thread.
*/
pub struct Collector<T> {
    scheme: &'static str,
    addr: SocketAddr,
    rx: Receiver<T>,
}

pub fn builder() -> Builder {
    Builder::new()
}

pub fn tcp() -> Collector<Vec<u8>> {
    Builder::new().tcp()
}

pub fn udp() -> Collector<Vec<u8>> {
    Builder::new().udp()
}

pub fn http() -> Collector<Request> {
    Builder::new().http()
}

impl<T> Collector<T> {
    fn new(scheme: &'static str, addr: SocketAddr, rx: Receiver<T>) -> Self {
        Collector { scheme, addr, rx }
    }

    /**
    The destination URI of this collector.
    */
    pub fn dest(&self) -> String {
        format!("{}://{}", self.scheme, self.addr)
    }

    pub fn receive(&self, f: impl FnOnce(T)) {
        let received = self
            .rx
            .recv_timeout(Duration::from_secs(3))
            .expect("failed to receive a message");

        f(received)
    }

    pub fn received_nothing(&self) -> bool {
        self.rx.recv_timeout(Duration::from_millis(500)).is_err()
    }
}
