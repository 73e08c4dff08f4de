/*!
Destination URIs.

A destination is written as `scheme://host:port[/path]`, where the scheme
picks the transport a message is delivered over:

- `tcp://collector:12201`
- `udp://collector:12201`
- `http://collector:12201/gelf`
*/

use std::{fmt, str::FromStr};

use crate::error::Error;

/**
The transport to deliver a message over.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Tcp,
    Udp,
    Http,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Tcp => "tcp",
            Scheme::Udp => "udp",
            Scheme::Http => "http",
        }
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "tcp" => Scheme::Tcp,
            "udp" => Scheme::Udp,
            "http" => Scheme::Http,
            _ => bail!(
                InvalidDestination,
                "unsupported scheme `{}`; expected one of `tcp`, `udp` or `http`",
                s
            ),
        })
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
A parsed destination.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    scheme: Scheme,
    host: String,
    port: u16,
    path: String,
}

impl Destination {
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /**
    The host to connect to.

    IPv6 literals are returned without their surrounding brackets.
    */
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /**
    The request path for `http` destinations.

    This is always empty for `tcp` and `udp` destinations.
    */
    pub fn path(&self) -> &str {
        &self.path
    }

    /**
    The `host:port` pair, with IPv6 literals bracketed.
    */
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority(), self.path)
    }
}

impl FromStr for Destination {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/**
Parse a destination URI.
*/
pub fn parse(uri: &str) -> Result<Destination, Error> {
    let uri = uri.trim();

    let (scheme, rest) = match uri.find("://") {
        Some(idx) => (&uri[..idx], &uri[idx + 3..]),
        None => bail!(
            InvalidDestination,
            "`{}` is not a destination URI; expected `scheme://host:port[/path]`",
            uri
        ),
    };

    let scheme: Scheme = scheme.parse()?;

    // Everything up to the first `/` is the authority
    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    if authority.contains('@') {
        bail!(InvalidDestination, "`{}` can't contain user information", uri);
    }

    let (host, port) = split_authority(uri, authority)?;

    let path = match scheme {
        Scheme::Http if path.is_empty() => "/".to_owned(),
        Scheme::Http => path.to_owned(),
        Scheme::Tcp | Scheme::Udp => String::new(),
    };

    Ok(Destination {
        scheme,
        host: host.to_owned(),
        port,
        path,
    })
}

fn split_authority<'a>(uri: &str, authority: &'a str) -> Result<(&'a str, u16), Error> {
    let (host, port) = if authority.starts_with('[') {
        // An IPv6 literal, like `[::1]:12201`
        match authority.find(']') {
            Some(end) => {
                let port = authority[end + 1..].strip_prefix(':');

                (&authority[1..end], port)
            }
            None => bail!(InvalidDestination, "`{}` has an unterminated IPv6 host", uri),
        }
    } else {
        match authority.rfind(':') {
            Some(idx) => (&authority[..idx], Some(&authority[idx + 1..])),
            None => (authority, None),
        }
    };

    if host.is_empty() {
        bail!(InvalidDestination, "`{}` is missing a host", uri);
    }

    let port = match port {
        Some(port) if !port.is_empty() => port,
        _ => bail!(InvalidDestination, "`{}` is missing a port", uri),
    };

    match port.parse::<u16>() {
        Ok(port) if port > 0 => Ok((host, port)),
        _ => bail!(
            InvalidDestination,
            "`{}` has the port `{}`, which is outside the range 1-65535",
            uri,
            port
        ),
    }
}
