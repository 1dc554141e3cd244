//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/klimper/klimper.toml`
//! - macOS: `~/Library/Application Support/klimper/klimper.toml`
//! - Windows: `%APPDATA%\klimper\klimper.toml`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "klimper";

/// File name of the configuration inside [`user_config_dir`].
pub const CONFIG_FILE_NAME: &str = "klimper.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the working directory if the platform has none.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

/// Ensure the user config directory exists.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("klimper/klimper.toml"));
    }
}
