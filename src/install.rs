use crate::command::CommandExecutor;
use crate::config::ConfigResolver;
use crate::constants::{
    BINARY_NAME, DEFAULT_EDITOR, DEFAULT_INSTALL_DIR, DEFAULT_REPO, INSTALLED_PATH_MARKERS,
};
use crate::env::EnvironmentView;
use crate::error::{Result, SbError};
use crate::io::{copy_executable_atomic, same_file, set_executable, write_if_missing};
use crate::paths::expand_home;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Flags accepted by `sb install`
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub dir: Option<String>,
    pub repo: Option<String>,
    pub editor: Option<String>,
    pub yes: bool,
    pub no_open: bool,
}

impl InstallOptions {
    /// True when nothing would stop the installer from prompting
    fn needs_prompts(&self) -> bool {
        !self.yes && self.dir.is_none() && self.repo.is_none() && self.editor.is_none()
    }
}

/// Result of a completed installer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Cancelled,
    Installed {
        binary: PathBuf,
        config: PathBuf,
        config_created: bool,
    },
}

/// Interactive installer: answers are read from `input`, prompts go to `output`
pub struct Installer<'a, R, W> {
    options: InstallOptions,
    env: &'a EnvironmentView,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Installer<'a, R, W> {
    pub fn new(options: InstallOptions, env: &'a EnvironmentView, input: R, output: W) -> Self {
        Self {
            options,
            env,
            input,
            output,
        }
    }

    /// Install the currently running executable
    pub fn run(&mut self) -> Result<InstallOutcome> {
        let exe = std::env::current_exe()
            .map_err(|e| SbError::install("Error getting executable path", e))?;
        self.install_from(&exe)
    }

    /// Install `exe` as `<dir>/sb` and scaffold the config file
    pub fn install_from(&mut self, exe: &Path) -> Result<InstallOutcome> {
        if self.env.shell_wrapper && self.options.needs_prompts() {
            return Err(SbError::WrapperInstall);
        }

        self.say("Welcome to sb installer!\n")?;

        if looks_installed(exe) && !self.options.yes {
            self.say("It looks like sb is already installed.\n")?;
            let answer = self.ask("Reinstall sb? [y/N]: ")?;
            if !is_yes(&answer) {
                self.say("Installation cancelled.\n")?;
                return Ok(InstallOutcome::Cancelled);
            }
        }

        let exe = fs::canonicalize(exe).unwrap_or_else(|_| exe.to_path_buf());
        debug!("Installing from {}", exe.display());

        let install_dir = self.answer(
            self.options.dir.clone(),
            "Where would you like to install sb? [~/.local/bin]: ",
            DEFAULT_INSTALL_DIR,
        )?;
        let install_dir = expand_home(&install_dir, self.env.home.as_deref())?;

        let repo = self.answer(
            self.options.repo.clone(),
            "What is your repository path? [~/repo]: ",
            DEFAULT_REPO,
        )?;

        let editor = self.answer(
            self.options.editor.clone(),
            "What is your preferred editor? [code]: ",
            DEFAULT_EDITOR,
        )?;

        let config_path = ConfigResolver::config_path(self.env)?;
        let config_created = self.scaffold_config(&config_path, &repo)?;

        let binary = self.install_binary(&exe, &install_dir)?;
        self.say(&format!("\n✓ Binary installed to: {}\n", binary.display()))?;

        if !self.options.no_open && !self.options.yes {
            self.offer_editor(&editor, &config_path, &install_dir)?;
        }

        Ok(InstallOutcome::Installed {
            binary,
            config: config_path,
            config_created,
        })
    }

    fn scaffold_config(&mut self, path: &Path, repo: &str) -> Result<bool> {
        let contents = config_template(repo)?;
        let created = write_if_missing(path, contents.as_bytes())
            .map_err(|e| SbError::install("Error creating config file", e))?;
        if created {
            self.say(&format!("✓ Config created at: {}\n", path.display()))?;
        } else {
            self.say(&format!(
                "✓ Config already exists: {} (leaving it unchanged)\n",
                path.display()
            ))?;
        }
        Ok(created)
    }

    fn install_binary(&mut self, exe: &Path, install_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(install_dir)
            .map_err(|e| SbError::install("Error creating install directory", e))?;

        let dest = install_dir.join(BINARY_NAME);
        let dest = fs::canonicalize(&dest).unwrap_or(dest);

        if same_file(exe, &dest) {
            // Copying a file onto itself would truncate it.
            debug!("{} is already in place", dest.display());
        } else {
            copy_executable_atomic(exe, &dest)
                .map_err(|e| SbError::install("Error installing binary", e))?;
        }
        set_executable(&dest).map_err(|e| SbError::install("Error setting binary permissions", e))?;

        Ok(dest)
    }

    fn offer_editor(&mut self, editor: &str, config: &Path, install_dir: &Path) -> Result<()> {
        let answer = self.ask(&format!("\nOpen config file in {editor}? [Y/n]: "))?;
        if answer.is_empty() || is_yes(&answer) {
            let config = config.to_string_lossy().into_owned();
            if let Err(e) = CommandExecutor::new().run_unchecked(&[editor, config.as_str()]) {
                warn!("{e:#}");
                self.say(&format!("Could not open {editor}; edit {config} by hand.\n"))?;
            }
            return Ok(());
        }

        self.say(&format!(
            "\nNext steps:\n\
             1. Edit {} to add your branch mappings\n\
             2. Add the shell function to your .bashrc or .zshrc for seamless integration\n\
             3. Make sure {} is in your PATH\n",
            config.display(),
            install_dir.display()
        ))
    }

    /// Flag value, `default` under `--yes`, otherwise the prompt's answer.
    /// A blank answer also means `default`.
    fn answer(&mut self, flag: Option<String>, question: &str, default: &str) -> Result<String> {
        let value = match flag {
            Some(v) => v,
            None if self.options.yes => default.to_string(),
            None => self.ask(question)?,
        };
        if value.trim().is_empty() {
            Ok(default.to_string())
        } else {
            Ok(value.trim().to_string())
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        self.say(question)?;
        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .map_err(|e| SbError::install("Error reading input", e))?;
        Ok(line.trim().to_string())
    }

    fn say(&mut self, text: &str) -> Result<()> {
        self.output
            .write_all(text.as_bytes())
            .and_then(|_| self.output.flush())
            .map_err(SbError::Output)
    }
}

fn looks_installed(exe: &Path) -> bool {
    let path = exe.to_string_lossy();
    INSTALLED_PATH_MARKERS.iter().any(|m| path.contains(m))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}

/// Contents of a freshly scaffolded config file.
///
/// The repo path goes through the YAML serializer so characters such as
/// `#`, `: ` or a leading `*` come back out of the loader unchanged.
pub fn config_template(repo: &str) -> Result<String> {
    let repo = serde_yaml::to_string(repo).map_err(|source| SbError::ConfigRender { source })?;
    Ok(format!(
        "repo: {}\n\
         aliases:\n  \
         # Add your branch aliases here. Use spaces for indenting.\n  \
         # Examples:\n  \
         # main: main\n  \
         # dev: development\n  \
         # feature: feature-branch\n",
        repo.trim_end()
    ))
}
