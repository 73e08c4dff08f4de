use std::{env, str::FromStr};

use anyhow::Error;

use crate::{diagnostics, send};

#[derive(Debug, Default, Clone)]
pub struct Config {
    pub send: send::Config,
    pub diagnostics: diagnostics::Config,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Config::default();

        let mut timeout: Option<humantime::Duration> = None;
        read_environment(&mut timeout, "GELF_TIMEOUT")?;
        config.send.timeout = timeout.map(|timeout| *timeout);

        if is_truthy("GELF_ENABLE_DIAGNOSTICS")? {
            config.diagnostics.min_level = diagnostics::Level::Debug;
        }

        Ok(config)
    }
}

fn is_truthy(name: impl AsRef<str>) -> Result<bool, Error> {
    match env::var(name.as_ref()) {
        // The environment variable contains a truthy value
        Ok(ref v) if v == "True" || v == "true" => Ok(true),
        // The environment variable is not set or doesn't contain
        // a truthy value
        Ok(_) | Err(env::VarError::NotPresent) => Ok(false),
        // The environment variable is invalid
        Err(e) => Err(e.into()),
    }
}

fn read_environment<T>(into: &mut Option<T>, name: impl AsRef<str>) -> Result<(), Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let name = name.as_ref();

    match env::var(name) {
        // The environment variable exists, but is empty
        Ok(ref v) if v.is_empty() => Ok(()),
        // The environment variable does not exist
        Err(env::VarError::NotPresent) => Ok(()),
        // The environment variable is invalid
        Err(e) => Err(e.into()),
        // The environment variable has a value
        Ok(v) => {
            let value = T::from_str(&v)
                .map_err(|e| anyhow::anyhow!("`{}` has an invalid value {:?}: {}", name, v, e))?;

            *into = Some(value);

            Ok(())
        }
    }
}
