use crate::constants::{default_targets, DEFAULT_BASE_DIR, VERSION};
use crate::types::{AppConfig, AppError};

use clap::{App, Arg};
use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use log::debug;
use serde_derive::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct SerializedAppConfig {
    base_dir: String,
    targets: Vec<String>,
}

fn user_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from(""))
        .join(".config/icon-recolor/config.toml")
}

fn load_config(
    user_config: &Path,
    config_path: Option<&str>,
) -> Result<SerializedAppConfig, config::ConfigError> {
    let default_targets: Vec<String> = default_targets()
        .iter()
        .map(|target| target.to_string_lossy().into_owned())
        .collect();

    let mut builder = ConfigBuilder::default();

    builder = builder
        .set_default("base_dir", DEFAULT_BASE_DIR)?
        .set_default("targets", default_targets)?;

    if user_config.exists() {
        debug!("Reading user config {}", user_config.display());
        builder = ConfigBuilder::<DefaultState>::add_source(
            builder,
            File::from(user_config).required(false),
        );
    }

    if let Some(path) = config_path {
        debug!("Reading config {}", path);
        builder = builder.add_source(File::with_name(path).required(true));
    }

    let config = builder.build()?;

    config.try_deserialize()
}

/// Layers defaults, the user config, an explicit config file and the base
/// directory override, in that order.
pub fn build_config(
    user_config: &Path,
    config_path: Option<&str>,
    base_dir_override: Option<&str>,
) -> Result<AppConfig, AppError> {
    let config = load_config(user_config, config_path)?;

    if config.targets.is_empty() {
        return Err(AppError::InvalidConfig(
            "`targets` must name at least one file".to_string(),
        ));
    }

    let base_dir = base_dir_override.unwrap_or(&config.base_dir);

    Ok(AppConfig {
        base_dir: PathBuf::from(base_dir),
        targets: config.targets.iter().map(PathBuf::from).collect(),
    })
}

pub fn init() -> Result<AppConfig, AppError> {
    let matches = App::new("Icon Recolor")
        .version(VERSION)
        .author("icon-recolor contributors")
        .about("Turns the red and blue in launcher icons green, overwriting them in place")
        .after_help("Config is a TOML file with a `base_dir` string and a `targets` array of paths relative to it.\n\nWithout any config the Android launcher icons (mipmap-*/ic_launcher*.png) under android/app/src/main/res are processed. ~/.config/icon-recolor/config.toml is read when present.")
        .arg(
            Arg::with_name("config")
                .short('c')
                .long("config")
                .value_name("/path/to/config.toml")
                .help("Sets a custom config file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("Base Dir")
                .short('b')
                .long("base-dir")
                .value_name("DIR")
                .help("Overrides the base directory set in config")
                .takes_value(true),
        )
        .get_matches();

    build_config(
        &user_config_path(),
        matches.value_of("config"),
        matches.value_of("Base Dir"),
    )
}
