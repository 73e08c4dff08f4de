use crate::support::*;

pub fn test() {
    let collector = server::tcp();

    let outcome = check(args!({
        "dest": collector.dest(),
        "host": "foo",
        "message": "bar",
        "fields": {
            "environment": "test"
        }
    }))
    .expect("failed to run");

    assert!(outcome.changed);
    assert!(!outcome.delivered);
    assert!(outcome.error.is_none());

    let received = gelf(&outcome.gelf);
    assert_eq!("bar", received["short_message"]);
    assert_eq!("test", received["_environment"]);

    assert!(collector.received_nothing());
}
