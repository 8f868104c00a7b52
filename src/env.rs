use crate::constants::{CONFIG_ENV, FALLBACK_SHELL, SHELL_WRAPPER_ENV};
use std::path::PathBuf;

/// Snapshot of the parts of the process environment sb cares about.
///
/// Everything downstream reads from this rather than `std::env`, so tests
/// build one by hand instead of mutating process-wide state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentView {
    pub home: Option<PathBuf>,
    pub cwd: Option<PathBuf>,
    pub config_override: Option<String>,
    pub shell_wrapper: bool,
    pub shell: Option<String>,
}

impl EnvironmentView {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self {
            home: home::home_dir(),
            cwd: std::env::current_dir().ok(),
            config_override: std::env::var(CONFIG_ENV).ok(),
            shell_wrapper: std::env::var(SHELL_WRAPPER_ENV).is_ok_and(|v| v == "1"),
            shell: std::env::var("SHELL").ok(),
        }
    }

    /// `SB_CONFIG`, if set to something other than whitespace
    pub fn config_override(&self) -> Option<&str> {
        self.config_override
            .as_deref()
            .filter(|v| !v.trim().is_empty())
    }

    /// Shell to launch in direct mode
    pub fn shell_program(&self) -> &str {
        self.shell
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(FALLBACK_SHELL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_config_override_is_ignored() {
        let env = EnvironmentView {
            config_override: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(env.config_override(), None);

        let env = EnvironmentView {
            config_override: Some("/etc/sb.yaml".into()),
            ..Default::default()
        };
        assert_eq!(env.config_override(), Some("/etc/sb.yaml"));
    }

    #[test]
    fn shell_falls_back_to_bash() {
        assert_eq!(EnvironmentView::default().shell_program(), "bash");

        let env = EnvironmentView {
            shell: Some("/bin/zsh".into()),
            ..Default::default()
        };
        assert_eq!(env.shell_program(), "/bin/zsh");
    }
}
