//! Logger for the CLI
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::eyre;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vmeet_common::logging::filter_directive;

use crate::args::LogOptions;

pub struct Logger {
    json: bool,
    verbosity: Verbosity<InfoLevel>,
}

impl<'a> From<&'a LogOptions> for Logger {
    fn from(options: &'a LogOptions) -> Self {
        Self {
            json: options.json,
            verbosity: options.verbose.clone(),
        }
    }
}

impl Logger {
    pub fn init(&self) -> eyre::Result<()> {
        let level = self.verbosity.log_level_filter().to_string().to_lowercase();

        // prefer `RUST_LOG` variable if set
        // otherwise passed-in level filter
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_directive(&level));

        // results go to stdout, logs to stderr
        tracing_subscriber::registry()
            .with(filter)
            .with((!self.json).then(|| {
                fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr)
            }))
            .with(self.json.then(|| {
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr)
            }))
            .try_init()?;
        Ok(())
    }
}
