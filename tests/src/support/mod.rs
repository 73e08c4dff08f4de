use gelf_logger::{
    invoke::{self, Mode, Outcome, Params},
    send, Error,
};

pub mod server;
pub mod udp;

pub use serde_json::Value;

pub use self::http::Request;

macro_rules! args {
    ({$($json:tt)*}) => {{
        let params: gelf_logger::invoke::Params = serde_json::from_value(json!({$($json)*}))
            .expect("invalid arguments");

        params
    }};
}

pub(crate) fn apply(params: Params) -> Result<Outcome, Error> {
    invoke::run(params, Mode::Apply, &send::Config::default())
}

pub(crate) fn check(params: Params) -> Result<Outcome, Error> {
    invoke::run(params, Mode::Check, &send::Config::default())
}

pub(crate) fn delivered(params: Params) -> Outcome {
    let outcome = apply(params).expect("failed to run");

    assert!(
        outcome.delivered,
        "expected the message to be delivered: {:?}",
        outcome.error
    );
    assert!(outcome.changed);
    assert!(outcome.error.is_none());

    outcome
}

pub(crate) fn gelf(payload: impl AsRef<[u8]>) -> Value {
    serde_json::from_slice(payload.as_ref()).expect("invalid GELF payload")
}

pub(crate) fn test_child(name: &str) -> bool {
    use std::{
        env,
        process::{Command, Stdio},
    };

    let self_bin = env::args().next().expect("missing self command");

    let mut test = Command::new(self_bin)
        .arg(name)
        .stdout(Stdio::inherit())
        .spawn()
        .expect("failed to start child process");

    test.wait().expect("test execution failed").success()
}

macro_rules! cases {
    ($($case:ident),+) => {
        $(
            mod $case;
        )+

        pub(crate) fn test_all() {
            use std::process;

            let mut failed = Vec::new();

            $(
                if !$crate::support::test_child(stringify!($case)) {
                    failed.push(stringify!($case));
                }
            )+

            if failed.len() > 0 {
                eprintln!("test execution failed. Failures: {:#?}", failed);
                process::exit(1);
            }
        }

        pub(crate) fn test(name: impl AsRef<str>) {
            let name = name.as_ref();

            $(
                if name == stringify!($case) {
                    use gelf_logger::diagnostics;

                    diagnostics::init(diagnostics::Config {
                        min_level: diagnostics::Level::Debug,
                    });

                    println!("running {}...", stringify!($case));
                    self::$case::test();

                    diagnostics::stop().expect("failed to stop diagnostics");
                }
            )+
        }
    }
}
