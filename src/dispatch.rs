use crate::command::CommandExecutor;
use crate::config::Config;
use crate::constants::{WRAPPER_BRANCH_PREFIX, WRAPPER_DIR_PREFIX};
use crate::env::EnvironmentView;
use crate::error::{Result, SbError};
use crate::paths::tilde_expand;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Where an invocation should land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub directory: PathBuf,
    pub branch: Option<String>,
}

impl Resolution {
    /// Fail unless the resolved directory exists and is a directory
    pub fn ensure_directory(&self) -> Result<()> {
        match std::fs::metadata(&self.directory) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(SbError::RepoNotDirectory(self.directory.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SbError::RepoMissing(self.directory.clone()))
            }
            Err(source) => Err(SbError::InvalidPath {
                path: self.directory.display().to_string(),
                source,
            }),
        }
    }
}

/// Resolve the first argument, if any, against the config.
///
/// Arguments after the first are ignored.
pub fn resolve(args: &[String], cfg: &Config, env: &EnvironmentView) -> Result<Resolution> {
    let branch = match args.first() {
        Some(alias) => Some(
            cfg.branch_for(alias)
                .ok_or_else(|| SbError::UnknownAlias(alias.clone()))?
                .to_string(),
        ),
        None => None,
    };

    let directory = tilde_expand(&cfg.repo, env)?;
    debug!(
        "Resolved {} (branch: {})",
        directory.display(),
        branch.as_deref().unwrap_or("-")
    );

    Ok(Resolution { directory, branch })
}

/// How a resolution is handed to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Print `DIR:`/`BRANCH:` lines for an enclosing shell function
    Wrapper,
    /// Spawn an interactive shell in the directory
    Direct,
}

impl ExecutionMode {
    pub fn from_env(env: &EnvironmentView) -> Self {
        if env.shell_wrapper {
            ExecutionMode::Wrapper
        } else {
            ExecutionMode::Direct
        }
    }
}

/// What happened during execution. The CLI exits 0 regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitOutcome {
    pub child_exit_code: i32,
    pub checkout_failed: bool,
}

/// Carries out a resolution in wrapper or direct mode
#[derive(Debug, Clone, Default)]
pub struct Dispatcher;

impl Dispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Execute `res` in the mode selected by `env`, writing messages to `out`
    pub fn execute(
        &self,
        res: &Resolution,
        env: &EnvironmentView,
        out: &mut impl Write,
    ) -> Result<ExitOutcome> {
        match ExecutionMode::from_env(env) {
            ExecutionMode::Wrapper => {
                write_wrapper_report(res, out).map_err(SbError::Output)?;
                Ok(ExitOutcome::default())
            }
            ExecutionMode::Direct => self.launch_shell(res, env, out),
        }
    }

    fn launch_shell(
        &self,
        res: &Resolution,
        env: &EnvironmentView,
        out: &mut impl Write,
    ) -> Result<ExitOutcome> {
        let executor = CommandExecutor::in_dir(&res.directory);

        // Informational only; a closed stdout must not stop the handoff.
        let _ = writeln!(out, "Switching to repo directory: {}", res.directory.display());

        let mut checkout_failed = false;
        if let Some(branch) = &res.branch {
            let _ = writeln!(out, "Checking out branch: {branch}");
            let _ = out.flush();
            // The user still lands in the repository when the checkout fails.
            if let Err(e) = executor.run(&["git", "checkout", branch.as_str()]) {
                warn!("{e:#}");
                checkout_failed = true;
            }
        }
        let _ = out.flush();

        let shell = env.shell_program();
        let status = executor
            .run_unchecked(&[shell])
            .map_err(|e| SbError::Spawn {
                program: shell.to_string(),
                reason: format!("{e:#}"),
            })?;
        debug!(
            "Shell exited with code {} (checkout failed: {checkout_failed})",
            status.exit_code
        );

        Ok(ExitOutcome {
            child_exit_code: status.exit_code,
            checkout_failed,
        })
    }
}

/// Write the two-line protocol consumed by the shell function
pub fn write_wrapper_report(res: &Resolution, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{WRAPPER_DIR_PREFIX}{}", res.directory.display())?;
    if let Some(branch) = &res.branch {
        writeln!(out, "{WRAPPER_BRANCH_PREFIX}{branch}")?;
    }
    out.flush()
}
