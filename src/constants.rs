use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BASE_DIR: &str = "android/app/src/main/res";

pub const DENSITIES: [&str; 5] = ["hdpi", "mdpi", "xhdpi", "xxhdpi", "xxxhdpi"];

pub const ICON_VARIANTS: [&str; 3] = [
    "ic_launcher.png",
    "ic_launcher_foreground.png",
    "ic_launcher_round.png",
];

pub const DONE_MESSAGE: &str = "Done! All icons changed to green.";

/// Every launcher icon variant in every mipmap density bucket, density-major.
pub fn default_targets() -> Vec<PathBuf> {
    DENSITIES
        .iter()
        .flat_map(|density| {
            ICON_VARIANTS
                .iter()
                .map(move |variant| PathBuf::from(format!("mipmap-{}", density)).join(variant))
        })
        .collect()
}
