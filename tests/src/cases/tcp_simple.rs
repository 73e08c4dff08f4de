use crate::support::*;

pub fn test() {
    let collector = server::tcp();

    let outcome = delivered(args!({
        "dest": collector.dest(),
        "host": "foo",
        "message": "bar"
    }));

    // The collector only sees the bytes once the connection is closed
    collector.receive(|received| {
        let (delim, frame) = received.split_last().expect("nothing received");

        assert_eq!(b'\0', *delim);
        assert!(!frame.contains(&b'\0'));
        assert_eq!(outcome.gelf.as_bytes(), frame);
        assert_eq!("bar", gelf(frame)["short_message"]);
    });

    assert!(collector.received_nothing());
}
