use anyhow::Result;
use clap::{Parser, Subcommand};
use sb::config::ConfigResolver;
use sb::dispatch::{resolve, Dispatcher};
use sb::env::EnvironmentView;
use sb::error::SbError;
use sb::install::{InstallOptions, Installer};
use std::ffi::{OsStr, OsString};
use std::io::Write;

/// Flags owned by the top-level parser; any other leading `-token` is an alias
const TOP_LEVEL_FLAGS: &[&str] = &["-h", "--help", "-V", "--version", "-v", "--verbose"];

/// Jump into a repository and check out a branch by its short alias
#[derive(Parser, Debug)]
#[command(
    name = "sb",
    author,
    version,
    about,
    args_conflicts_with_subcommands = true,
    disable_help_subcommand = true,
    long_about = "sb - switch branch by alias.
Opens a shell in the configured repository, optionally checking out the branch
mapped to ALIAS in ~/.config/sb.yaml (or $SB_CONFIG)."
)]
#[command(after_help = "Examples:
  sb                  # Open a shell in the repository
  sb dev              # Check out the branch aliased as 'dev', then open a shell
  sb install --yes    # Install sb to ~/.local/bin with default settings
  sb completions      # List aliases for shell completion")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Branch alias from the config file
    alias: Option<String>,

    /// Ignored; reserved for future use
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install sb and create a starter config file
    Install {
        /// Install directory (default ~/.local/bin)
        #[arg(long)]
        dir: Option<String>,

        /// Repository path written to a new config (default ~/repo)
        #[arg(long)]
        repo: Option<String>,

        /// Editor command used to open the config (default 'code')
        #[arg(long)]
        editor: Option<String>,

        /// Accept defaults; do not prompt
        #[arg(short, long)]
        yes: bool,

        /// Do not offer to open the config file
        #[arg(long)]
        no_open: bool,
    },

    /// Print every alias, one per line
    Completions,
}

fn main() {
    let cli = Cli::parse_from(alias_safe_args(std::env::args_os().collect()));

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::default().add_directive(default_level.into())
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        let code = e.downcast_ref::<SbError>().map_or(1, SbError::exit_code);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let env = EnvironmentView::from_process();

    match cli.command {
        Some(Commands::Install {
            dir,
            repo,
            editor,
            yes,
            no_open,
        }) => {
            let options = InstallOptions {
                dir,
                repo,
                editor,
                yes,
                no_open,
            };
            let stdin = std::io::stdin();
            Installer::new(options, &env, stdin.lock(), std::io::stdout()).run()?;
        }
        Some(Commands::Completions) => {
            let cfg = ConfigResolver::strict().load(&env)?;
            let mut out = std::io::stdout().lock();
            for alias in cfg.aliases.keys() {
                writeln!(out, "{alias}")?;
            }
        }
        None => {
            let cfg = ConfigResolver::strict().load(&env)?;
            let args: Vec<String> = cli.alias.into_iter().chain(cli.rest).collect();
            let resolution = resolve(&args, &cfg, &env)?;
            resolution.ensure_directory()?;

            Dispatcher::new().execute(&resolution, &env, &mut std::io::stdout())?;
        }
    }

    Ok(())
}

fn is_top_level_flag(arg: &OsStr) -> bool {
    arg.to_str().is_some_and(|s| TOP_LEVEL_FLAGS.contains(&s))
}

/// Put `--` in front of the first argument that looks like a flag but is not
/// one of ours, so an alias such as `-x` reaches the alias positional.
fn alias_safe_args(mut args: Vec<OsString>) -> Vec<OsString> {
    let Some(idx) = args
        .iter()
        .skip(1)
        .position(|a| !is_top_level_flag(a))
        .map(|i| i + 1)
    else {
        return args;
    };

    let looks_like_flag = args[idx]
        .to_str()
        .is_some_and(|s| s.starts_with('-') && s != "--");
    if looks_like_flag {
        args.insert(idx, OsString::from("--"));
    }
    args
}
