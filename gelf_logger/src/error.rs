use std::{error, fmt};

/**
The kind of failure that stopped a message from being built or delivered.

Callers match on the kind rather than the message; the message is
only for reporting.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /**
    A required input is missing, or an extension field is invalid.

    Always detected before any network activity.
    */
    Validation,
    /**
    The destination URI can't be parsed, or names an unsupported scheme.

    Always detected before any network activity.
    */
    InvalidDestination,
    /**
    A TCP or UDP socket couldn't be established or used.
    */
    Connection,
    /**
    An HTTP connection failed, or the collector answered with a non-2xx status.
    */
    Http,
    /**
    The record couldn't be encoded as JSON.
    */
    Serialization,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::InvalidDestination => "InvalidDestinationError",
            ErrorKind::Connection => "ConnectionError",
            ErrorKind::Http => "HttpError",
            ErrorKind::Serialization => "SerializationError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
An error building or delivering a GELF message.
*/
pub struct Error {
    kind: ErrorKind,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, err: impl Into<anyhow::Error>) -> Self {
        Error {
            kind,
            inner: err.into(),
        }
    }

    pub(crate) fn msg(kind: ErrorKind, msg: impl fmt::Display) -> Self {
        Error {
            kind,
            inner: anyhow::Error::msg(msg.to_string()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /**
    The error message without its kind.
    */
    pub fn message(&self) -> String {
        format!("{:#}", self.inner)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("inner", &self.inner)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {:#}", self.kind, self.inner)
    }
}

impl error::Error for Error {}

/**
Attach an error kind and some context to a foreign error.
*/
pub trait ResultExt<T> {
    fn kind(self, kind: ErrorKind, context: impl fmt::Display) -> Result<T, Error>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn kind(self, kind: ErrorKind, context: impl fmt::Display) -> Result<T, Error> {
        self.map_err(|err| {
            let err: anyhow::Error = err.into();

            Error::new(kind, err.context(context.to_string()))
        })
    }
}

macro_rules! bail {
    ($kind:ident, $($msg:tt)*) => {
        return Err($crate::error::Error::msg(
            $crate::error::ErrorKind::$kind,
            format_args!($($msg)*),
        ))
    };
}
