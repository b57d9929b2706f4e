use crate::constants::DONE_MESSAGE;
use crate::recolor::recolor_file;
use crate::types::{AppConfig, AppError, BatchSummary};

use indicatif::ProgressBar;
use log::{info, warn};

/// Recolors every configured target that exists under the base directory.
///
/// Missing targets are reported and skipped. Any other failure stops the
/// batch right away; files recolored before it stay recolored.
pub fn run(config: &AppConfig, pb: &ProgressBar) -> Result<BatchSummary, AppError> {
    if !config.base_dir.is_dir() {
        warn!(
            "Base directory {} does not exist, nothing will be found",
            config.base_dir.display()
        );
    }

    let mut summary = BatchSummary::default();

    for target in &config.targets {
        let full_path = config.base_dir.join(target);

        if full_path.is_file() {
            let stats = recolor_file(&full_path, pb).map_err(|e| {
                pb.abandon();
                e
            })?;
            info!(
                "{}: {} of {} pixels recolored",
                full_path.display(),
                stats.recolored(),
                stats.skipped + stats.recolored() + stats.unchanged
            );
            summary.updated.push(full_path);
        } else {
            pb.suspend(|| println!("Not found: {}", full_path.display()));
            summary.missing.push(full_path);
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    println!();
    println!("{}", DONE_MESSAGE);
    println!(
        "{} updated, {} not found",
        summary.updated.len(),
        summary.missing.len()
    );

    Ok(summary)
}
