//! Platform detection and OS-specific utilities.

use std::path::PathBuf;

use crate::constants::APP_NAME;
use crate::error::{ScError, ScResult};

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Detect the current platform at compile time.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Get the platform-specific application data directory.
    ///
    /// - Windows: `%APPDATA%/SafeCircle`
    /// - macOS: `~/Library/Application Support/SafeCircle`
    /// - Linux: `~/.local/share/SafeCircle`
    pub fn data_dir() -> ScResult<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| ScError::Config("could not determine data directory".into()))?;
        Ok(base.join(APP_NAME))
    }

    /// Get the platform-specific configuration directory.
    ///
    /// - Windows: `%APPDATA%/SafeCircle`
    /// - macOS: `~/Library/Application Support/SafeCircle`
    /// - Linux: `~/.config/SafeCircle`
    pub fn config_dir() -> ScResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| ScError::Config("could not determine config directory".into()))?;
        Ok(base.join(APP_NAME))
    }

    /// Get a human-readable platform name.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let p = Platform::current();
        assert!(matches!(p, Platform::Windows | Platform::MacOs | Platform::Linux));
    }

    #[test]
    fn test_platform_name() {
        assert_eq!(Platform::Windows.name(), "Windows");
        assert_eq!(Platform::MacOs.name(), "macOS");
        assert_eq!(Platform::Linux.name(), "Linux");
    }

    #[test]
    fn test_data_dir_ends_with_app_name() {
        let dir = Platform::data_dir().unwrap();
        assert!(dir.ends_with(APP_NAME));
    }
}
