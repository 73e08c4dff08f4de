use std::net::TcpListener;

use gelf_logger::ErrorKind;

use crate::support::*;

pub fn test() {
    let dest = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind listener");
        format!("http://{}/gelf", listener.local_addr().expect("missing local addr"))
    };

    let outcome = apply(args!({
        "dest": dest,
        "host": "foo",
        "message": "bar"
    }))
    .expect("failed to run");

    assert!(!outcome.delivered);
    assert!(!outcome.changed);
    assert_eq!("bar", gelf(&outcome.gelf)["short_message"]);

    let err = outcome.error.expect("expected an error");
    assert!(err.starts_with(ErrorKind::Http.as_str()), "{}", err);
}
