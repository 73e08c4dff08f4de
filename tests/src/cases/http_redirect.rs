use gelf_logger::ErrorKind;

use crate::support::*;

pub fn test() {
    let collector = server::builder().http_redirect("/elsewhere").http();

    let outcome = apply(args!({
        "dest": format!("{}/gelf", collector.dest()),
        "host": "foo",
        "message": "bar"
    }))
    .expect("failed to run");

    assert!(!outcome.delivered);
    assert!(!outcome.changed);

    let err = outcome.error.expect("expected an error");
    assert!(err.starts_with(ErrorKind::Http.as_str()), "{}", err);
    assert!(err.contains("302"), "{}", err);

    collector.receive(|req| {
        assert_eq!("POST", req.method);
        assert_eq!("/gelf", req.path);
    });

    // The redirect isn't followed
    assert!(collector.received_nothing());
}
