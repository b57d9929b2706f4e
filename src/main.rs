mod batch;
mod config;
mod constants;
mod recolor;
mod types;
mod utils;

use crate::config::init;

use anyhow::Context;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = init().context("failed to load configuration")?;

    let pb = ProgressBar::new(config.targets.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    batch::run(&config, &pb)?;

    Ok(())
}
