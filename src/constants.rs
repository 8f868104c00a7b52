/// Constants used throughout the application

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "SB_CONFIG";

/// Environment variable switching to the wrapper output protocol
pub const SHELL_WRAPPER_ENV: &str = "SB_SHELL_WRAPPER";

/// Config file location relative to the home directory
pub const CONFIG_RELATIVE_PATH: &str = ".config/sb.yaml";

/// Shell launched in direct mode when `$SHELL` is unset
pub const FALLBACK_SHELL: &str = "bash";

/// Name of the installed binary
pub const BINARY_NAME: &str = "sb";

/// Install directory used when none is given
pub const DEFAULT_INSTALL_DIR: &str = "~/.local/bin";

/// Repository path written to a fresh config when none is given
pub const DEFAULT_REPO: &str = "~/repo";

/// Editor used to open a fresh config when none is given
pub const DEFAULT_EDITOR: &str = "code";

/// Path fragments that indicate sb is already running from an install location
pub const INSTALLED_PATH_MARKERS: &[&str] = &[".local/bin", "/usr/local/bin", "/usr/bin"];

/// Prefix of the directory line in wrapper output
pub const WRAPPER_DIR_PREFIX: &str = "DIR:";

/// Prefix of the branch line in wrapper output
pub const WRAPPER_BRANCH_PREFIX: &str = "BRANCH:";
