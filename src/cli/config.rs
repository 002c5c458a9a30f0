use crate::error::{Result, TallyError};
use crate::settings::{load_settings, settings_file_exists, settings_path};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| TallyError::Settings(e.to_string()))?;
    let source = if settings_file_exists() {
        settings_path().display().to_string()
    } else {
        "defaults (no settings file)".to_string()
    };
    println!("# {source}");
    println!("{json}");
    Ok(())
}
