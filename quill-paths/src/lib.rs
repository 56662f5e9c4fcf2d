//! XDG Base Directory paths for quill.
//!
//! Provider profiles and the active selection live under the data directory,
//! the optional `config.toml` settings file lives under the config directory.
//! Both follow XDG conventions on every platform, the way CLI tools like gh
//! and kubectl do.

use std::path::PathBuf;

/// Application directory name appended to the XDG roots.
const APP_DIR: &str = "quill";

/// Overrides the data directory outright (useful for isolated test runs).
pub const DATA_DIR_ENV: &str = "QUILL_DATA_DIR";

/// Get the quill config directory.
///
/// Returns `$XDG_CONFIG_HOME/quill` if set, otherwise `~/.config/quill`.
///
/// # Examples
///
/// ```
/// use quill_paths::config_dir;
///
/// let settings = config_dir().join("config.toml");
/// assert!(settings.ends_with("quill/config.toml"));
/// ```
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Get the quill data directory.
///
/// Resolution order: `$QUILL_DATA_DIR`, then `$XDG_DATA_HOME/quill`,
/// then `~/.local/share/quill`. Provider configurations are stored here.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

/// Path of the user-level settings file.
pub fn user_config_file() -> PathBuf {
    config_dir().join("config.toml")
}

fn xdg_dir(env_var: &str, home_relative: &str) -> PathBuf {
    if let Ok(root) = std::env::var(env_var)
        && !root.is_empty()
    {
        PathBuf::from(root).join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(home_relative).join(APP_DIR)
    } else {
        PathBuf::from(home_relative).join(APP_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment mutation is process-wide, so each variable is exercised
    // inside a single test.

    #[test]
    fn test_config_dir_respects_xdg_env() {
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", "/tmp/test-config");
        }
        assert_eq!(config_dir(), PathBuf::from("/tmp/test-config/quill"));
        assert_eq!(
            user_config_file(),
            PathBuf::from("/tmp/test-config/quill/config.toml")
        );
        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
        assert!(config_dir().ends_with("quill"));
    }

    #[test]
    fn test_data_dir_resolution_order() {
        unsafe {
            std::env::set_var("XDG_DATA_HOME", "/tmp/test-data");
        }
        assert_eq!(data_dir(), PathBuf::from("/tmp/test-data/quill"));

        unsafe {
            std::env::set_var(DATA_DIR_ENV, "/tmp/quill-override");
        }
        assert_eq!(data_dir(), PathBuf::from("/tmp/quill-override"));

        unsafe {
            std::env::remove_var(DATA_DIR_ENV);
            std::env::remove_var("XDG_DATA_HOME");
        }
        assert!(data_dir().ends_with("quill"));
    }
}
