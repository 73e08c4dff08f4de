use gelf_logger::ErrorKind;

use crate::support::*;

pub fn test() {
    for dest in &[
        "ftp://collector:21",
        "https://collector:443/gelf",
        "udp://collector",
        "tcp://:12201",
        "collector:12201",
    ] {
        let err = apply(args!({
            "dest": dest,
            "host": "foo",
            "message": "bar"
        }))
        .expect_err("expected an error");

        assert_eq!(ErrorKind::InvalidDestination, err.kind(), "{}", dest);
    }

    // Nothing is built for an invalid message, whatever the destination
    let err = apply(args!({
        "dest": "ftp://collector:21",
        "host": "",
        "message": "bar"
    }))
    .expect_err("expected an error");

    assert_eq!(ErrorKind::Validation, err.kind());
}
