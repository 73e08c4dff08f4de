/*!
Build GELF messages and deliver them to a remote collector.

The crate is split into a few main components, in order of where they appear in the delivery of a message:

- **Message**: Normalizes caller input into a canonical GELF record and serializes it as JSON.
- **Dest**: Parses a `tcp://`, `udp://` or `http://` destination URI.
- **Send**: Dispatches a serialized record to the sender for the destination's transport.
Each sender owns its socket or connection for the duration of a single delivery.
- **Invoke**: The call boundary used by the `gelf_logger` binary. It threads the
execution mode through and produces the result record reported back to the caller.
*/

#![deny(unsafe_code)]

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_derive;

#[macro_use]
pub mod diagnostics;

#[macro_use]
pub mod error;

pub mod config;
pub mod dest;
pub mod invoke;
pub mod message;
pub mod send;

pub use self::{
    config::Config,
    error::{Error, ErrorKind},
};
