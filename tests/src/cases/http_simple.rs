use crate::support::*;

pub fn test() {
    let collector = server::http();

    let outcome = delivered(args!({
        "dest": format!("{}/gelf", collector.dest()),
        "host": "foo",
        "message": "bar",
        "level": "warning"
    }));

    collector.receive(|req| {
        assert_eq!("POST", req.method);
        assert_eq!("/gelf", req.path);
        assert_eq!(Some("application/json"), req.header("content-type"));
        assert_eq!(outcome.gelf.as_bytes(), &*req.body);
        assert_eq!(4, gelf(&req.body)["level"]);
    });

    assert!(collector.received_nothing());
}
