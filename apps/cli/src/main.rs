mod app;
mod args;
mod logger;

use clap::Parser;
use color_eyre::eyre::Result;

#[macro_use]
extern crate tracing;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = args::AppOpts::parse();
    logger::Logger::from(&opts.log).init()?;

    app::App::new(opts).run().await
}
