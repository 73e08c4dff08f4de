use std::time::{Duration, Instant};

use gelf_logger::ErrorKind;

use crate::support::*;

pub fn test() {
    let collector = server::builder().http_unresponsive().http();

    let started = Instant::now();

    let outcome = apply(args!({
        "dest": collector.dest(),
        "host": "foo",
        "message": "bar",
        "timeout_ms": 500
    }))
    .expect("failed to run");

    assert!(started.elapsed() < Duration::from_secs(5));

    assert!(!outcome.delivered);

    let err = outcome.error.expect("expected an error");
    assert!(err.starts_with(ErrorKind::Http.as_str()), "{}", err);

    collector.receive(|req| {
        assert_eq!("POST", req.method);
    });
}
