//! Platform detection and camera permission hints.
//!
//! The booth cannot request camera access itself; when the OS refuses it the
//! best we can do is tell the operator where the switch lives.

use std::path::Path;

/// Operating system family the booth is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    /// iPhone / iPad, including the simulator
    Ios,
    Linux,
    Windows,
    Other,
}

impl Platform {
    /// Detect the current platform.
    pub fn detect() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::classify(
            std::env::consts::OS,
            Path::new("/var/mobile").exists(),
            &cwd.to_string_lossy(),
        )
    }

    /// Classification behind [`Platform::detect`], split out so it can be tested.
    ///
    /// Apple mobile devices report `macos` or `ios` depending on the toolchain;
    /// a `/var/mobile` directory or a CoreSimulator working directory marks them.
    pub fn classify(os: &str, has_var_mobile: bool, cwd: &str) -> Self {
        match os {
            "ios" => Platform::Ios,
            "macos" if has_var_mobile || cwd.contains("/CoreSimulator/") => Platform::Ios,
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::MacOs => "macOS",
            Platform::Ios => "iOS",
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
            Platform::Other => "unknown",
        }
    }

    /// Where to grant camera access on this platform, if there is such a place.
    pub fn camera_permission_hint(&self) -> Option<&'static str> {
        match self {
            Platform::MacOs => {
                Some("Grant access in System Settings > Privacy & Security > Camera")
            }
            Platform::Ios => Some("Grant access in Settings > Privacy & Security > Camera"),
            Platform::Windows => Some("Grant access in Settings > Privacy & security > Camera"),
            Platform::Linux => Some("Make sure your user can read /dev/video* (group 'video')"),
            Platform::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_desktop() {
        assert_eq!(Platform::classify("macos", false, "/Users/booth"), Platform::MacOs);
        assert_eq!(Platform::classify("linux", false, "/home/booth"), Platform::Linux);
        assert_eq!(Platform::classify("windows", false, "C:\\"), Platform::Windows);
        assert_eq!(Platform::classify("freebsd", false, "/"), Platform::Other);
    }

    #[test]
    fn test_classify_apple_mobile() {
        assert_eq!(Platform::classify("ios", false, "/"), Platform::Ios);
        assert_eq!(Platform::classify("macos", true, "/"), Platform::Ios);
        assert_eq!(
            Platform::classify("macos", false, "/Users/x/Library/Developer/CoreSimulator/Devices/abc"),
            Platform::Ios
        );
    }

    #[test]
    fn test_permission_hints() {
        assert!(Platform::MacOs.camera_permission_hint().unwrap().contains("Privacy & Security"));
        assert!(Platform::Linux.camera_permission_hint().unwrap().contains("/dev/video"));
        assert!(Platform::Other.camera_permission_hint().is_none());
        assert_eq!(Platform::Ios.name(), "iOS");
    }
}
