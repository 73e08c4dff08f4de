#[macro_use]
extern crate serde_derive;

use std::{
    env, fs,
    io::{self, Read},
    process,
};

use anyhow::Context;

use gelf_logger::{
    diagnostics,
    invoke::{self, Mode, Outcome, Params},
    Config,
};

/**
The arguments handed over by the automation tool.
*/
#[derive(Debug, Deserialize)]
struct Args {
    #[serde(flatten)]
    params: Params,
    #[serde(rename = "_ansible_check_mode", default)]
    check_mode: bool,
}

/**
The result record written to `stdout`.
*/
#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    outcome: Option<&'a Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,
}

fn main() {
    let result = run();
    let report = Report::new(&result);

    match serde_json::to_string(&report) {
        Ok(json) => println!("{}", json),
        Err(err) => diagnostics::emit_err(&err, "Failed to write the result record"),
    }

    let failed = report.failed.is_some();

    // Diagnostics may never have started if the config was invalid
    let _ = diagnostics::stop();

    if failed {
        process::exit(1);
    }
}

impl<'a> Report<'a> {
    /**
    Build the result record.

    A message that was built but not delivered is still a failure, and keeps
    its `gelf` payload alongside the error.
    */
    fn new(result: &'a Result<Outcome, anyhow::Error>) -> Self {
        match result {
            Ok(outcome) => Report {
                outcome: Some(outcome),
                failed: outcome.error.as_ref().map(|_| true),
                msg: outcome.error.clone(),
            },
            Err(err) => Report {
                outcome: None,
                failed: Some(true),
                msg: Some(format!("{:#}", err)),
            },
        }
    }
}

fn run() -> Result<Outcome, anyhow::Error> {
    let config = Config::from_env().context("failed to read the configuration")?;

    diagnostics::init(config.diagnostics);

    let args = read_args()?;

    let mode = if args.check_mode {
        Mode::Check
    } else {
        Mode::Apply
    };

    let outcome = invoke::run(args.params, mode, &config.send)?;

    Ok(outcome)
}

fn read_args() -> Result<Args, anyhow::Error> {
    let raw = match env::args().nth(1) {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read arguments from {:?}", path))?,
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read arguments from stdin")?;

            raw
        }
    };

    let args = serde_json::from_str(&raw).context("the arguments aren't valid")?;

    Ok(args)
}
