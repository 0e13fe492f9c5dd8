//! Write the effective configuration to a settings file.

use std::io::Write;
use std::path::Path;

use anyhow::bail;

use crate::config::Settings;

/// Save `settings` to `config_path`, refusing to overwrite an existing file.
pub fn run(settings: &Settings, config_path: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    if config_path.exists() {
        bail!(
            "configuration file already exists at {}",
            config_path.display()
        );
    }

    settings
        .save(config_path)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", config_path.display()))?;
    writeln!(out, "Created configuration file at: {}", config_path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_settings_once() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("langsift").join("settings.toml");
        let mut settings = Settings::default();
        settings.watch.debounce_ms = 750;

        run(&settings, &config_path, &mut Vec::new()).unwrap();
        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.watch.debounce_ms, 750);

        let err = run(&settings, &config_path, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
