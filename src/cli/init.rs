use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{save_settings, settings_file_exists, settings_path, Settings};

pub fn run(force: bool) -> Result<()> {
    if settings_file_exists() && !force {
        println!(
            "Settings already exist at {} (use --force to reset them).",
            settings_path().display()
        );
        return Ok(());
    }

    let settings = Settings::default();
    save_settings(&settings)?;
    std::fs::create_dir_all(PathBuf::from(&settings.export_dir))?;

    println!("Wrote {}", settings_path().display());
    Ok(())
}
