use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub base_dir: PathBuf,
    pub targets: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelClass {
    /// Effectively transparent or near-white.
    Skip,
    RedDominant,
    BlueDominant,
    Unchanged,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecolorStats {
    pub skipped: u64,
    pub red: u64,
    pub blue: u64,
    pub unchanged: u64,
}

impl RecolorStats {
    pub fn record(&mut self, class: PixelClass) {
        match class {
            PixelClass::Skip => self.skipped += 1,
            PixelClass::RedDominant => self.red += 1,
            PixelClass::BlueDominant => self.blue += 1,
            PixelClass::Unchanged => self.unchanged += 1,
        }
    }

    pub fn merge(mut self, other: RecolorStats) -> RecolorStats {
        self.skipped += other.skipped;
        self.red += other.red;
        self.blue += other.blue;
        self.unchanged += other.unchanged;
        self
    }

    pub fn recolored(&self) -> u64 {
        self.red + self.blue
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub updated: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
