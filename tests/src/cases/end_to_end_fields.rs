use crate::support::*;

pub fn test() {
    let collector = server::tcp();

    delivered(args!({
        "dest": collector.dest(),
        "host": "web1",
        "message": "say hi",
        "level": 5,
        "timestamp": 1385053862.3072,
        "fields": {
            "environment": "test",
            "attempt": 2,
            "canary": false
        }
    }));

    collector.receive(|received| {
        let (_, frame) = received.split_last().expect("nothing received");

        assert_eq!(
            json!({
                "version": "1.1",
                "host": "web1",
                "short_message": "say hi",
                "level": 5,
                "timestamp": 1385053862.3072,
                "_attempt": 2,
                "_canary": false,
                "_environment": "test"
            }),
            gelf(frame)
        );
    });
}
