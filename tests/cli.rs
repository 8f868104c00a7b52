#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp home with a repository directory and a config pointing at it
struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("repo")).unwrap();
        fs::create_dir_all(root.path().join("home")).unwrap();
        Self { root }
    }

    fn repo(&self) -> PathBuf {
        self.root.path().join("repo")
    }

    fn config_path(&self) -> PathBuf {
        self.root.path().join("sb.yaml")
    }

    fn write_config(&self, contents: &str) {
        fs::write(self.config_path(), contents).unwrap();
    }

    fn with_aliases(self) -> Self {
        let contents = format!(
            "repo: {}\naliases:\n  d: dev\n  p1: branch1\n  p2: branch2\n",
            self.repo().display()
        );
        self.write_config(&contents);
        self
    }

    fn sb(&self) -> Command {
        let mut cmd = Command::cargo_bin("sb").unwrap();
        cmd.current_dir(self.root.path())
            .env("HOME", self.root.path().join("home"))
            .env("SB_CONFIG", self.config_path())
            .env_remove("SB_SHELL_WRAPPER")
            .env_remove("RUST_LOG");
        cmd
    }

    fn wrapped(&self) -> Command {
        let mut cmd = self.sb();
        cmd.env("SB_SHELL_WRAPPER", "1");
        cmd
    }
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

// ---------------------------------------------------------------------------
// wrapper protocol
// ---------------------------------------------------------------------------

#[test]
fn wrapper_without_alias_prints_only_dir() {
    let sandbox = Sandbox::new().with_aliases();
    let expected = format!("DIR:{}\n", sandbox.repo().display());

    sandbox
        .wrapped()
        .assert()
        .success()
        .stdout(predicate::eq(expected));
}

#[test]
fn wrapper_with_alias_prints_dir_and_branch() {
    let sandbox = Sandbox::new().with_aliases();
    let expected = format!("DIR:{}\nBRANCH:dev\n", sandbox.repo().display());

    sandbox
        .wrapped()
        .arg("d")
        .assert()
        .success()
        .stdout(predicate::eq(expected));
}

#[test]
fn extra_arguments_are_ignored() {
    let sandbox = Sandbox::new().with_aliases();

    sandbox
        .wrapped()
        .args(["p1", "whatever"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BRANCH:branch1"));
}

#[test]
fn flags_after_the_alias_are_ignored() {
    let sandbox = Sandbox::new().with_aliases();
    let expected = format!("DIR:{}\nBRANCH:dev\n", sandbox.repo().display());

    sandbox
        .wrapped()
        .args(["d", "--force"])
        .assert()
        .success()
        .stdout(predicate::eq(expected));
}

#[test]
fn help_can_be_an_alias() {
    let sandbox = Sandbox::new();
    sandbox.write_config(&format!(
        "repo: {}\naliases:\n  help: h\n  d: dev\n",
        sandbox.repo().display()
    ));

    sandbox
        .wrapped()
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("BRANCH:h"));
}

#[test]
fn hyphenated_alias_resolves() {
    let sandbox = Sandbox::new();
    sandbox.write_config(&format!(
        "repo: {}\naliases:\n  \"-x\": y\n",
        sandbox.repo().display()
    ));

    sandbox
        .wrapped()
        .arg("-x")
        .assert()
        .success()
        .stdout(predicate::str::contains("BRANCH:y"));
}

#[test]
fn unknown_hyphenated_alias_is_an_alias_error() {
    let sandbox = Sandbox::new().with_aliases();

    sandbox
        .wrapped()
        .arg("-zzz")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("DIR:").not())
        .stderr(predicate::str::contains("-zzz"));
}

#[test]
fn verbose_flag_enables_debug_logging() {
    let sandbox = Sandbox::new().with_aliases();

    sandbox
        .wrapped()
        .args(["-v", "d"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BRANCH:dev"))
        .stderr(
            predicate::str::contains("Loading config")
                .and(predicate::str::contains("Shell exited").not()),
        );
}

#[test]
fn rust_log_enables_debug_logging() {
    let sandbox = Sandbox::new().with_aliases();

    sandbox
        .wrapped()
        .env("RUST_LOG", "debug")
        .assert()
        .success()
        .stderr(predicate::str::contains("Loading config"));
}

#[test]
fn quiet_by_default() {
    let sandbox = Sandbox::new().with_aliases();

    sandbox
        .wrapped()
        .arg("d")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn tilde_repo_is_expanded_against_home() {
    let sandbox = Sandbox::new();
    fs::create_dir_all(sandbox.root.path().join("home/code")).unwrap();
    sandbox.write_config("repo: ~/code\n");
    let expected = format!("DIR:{}\n", sandbox.root.path().join("home/code").display());

    sandbox
        .wrapped()
        .assert()
        .success()
        .stdout(predicate::eq(expected));
}

#[test]
fn unknown_alias_fails_without_output() {
    let sandbox = Sandbox::new().with_aliases();

    sandbox
        .wrapped()
        .arg("zzz")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("DIR:").not())
        .stderr(predicate::str::contains("zzz"));
}

#[test]
fn missing_repo_directory_fails() {
    let sandbox = Sandbox::new();
    sandbox.write_config("repo: /definitely/not/here/sb-repo\n");

    sandbox
        .wrapped()
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does not exist"));
}

// ---------------------------------------------------------------------------
// config loading
// ---------------------------------------------------------------------------

#[test]
fn missing_config_fails_and_suggests_install() {
    let sandbox = Sandbox::new();

    sandbox
        .wrapped()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("sb.yaml"))
        .stderr(predicate::str::contains("sb install"));
}

#[test]
fn config_without_repo_fails() {
    let sandbox = Sandbox::new();
    sandbox.write_config("aliases:\n  a: b\n");

    sandbox
        .wrapped()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("repo field is required"));
}

#[test]
fn default_config_location_is_under_home() {
    let sandbox = Sandbox::new();
    let config = sandbox.root.path().join("home/.config/sb.yaml");
    fs::create_dir_all(config.parent().unwrap()).unwrap();
    fs::write(&config, format!("repo: {}\n", sandbox.repo().display())).unwrap();

    sandbox
        .wrapped()
        .env_remove("SB_CONFIG")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("DIR:"));
}

// ---------------------------------------------------------------------------
// completions
// ---------------------------------------------------------------------------

#[test]
fn completions_lists_every_alias() {
    let sandbox = Sandbox::new().with_aliases();

    sandbox
        .sb()
        .arg("completions")
        .assert()
        .success()
        .stdout(predicate::eq("d\np1\np2\n"));
}

#[test]
fn completions_propagates_config_errors() {
    let sandbox = Sandbox::new();

    sandbox.sb().arg("completions").assert().code(1);
}

// ---------------------------------------------------------------------------
// install
// ---------------------------------------------------------------------------

#[test]
fn install_creates_binary_and_config() {
    let sandbox = Sandbox::new();
    let bin = sandbox.root.path().join("bin");

    sandbox
        .sb()
        .args(["install", "--yes", "--repo", "/tmp/repo", "--dir"])
        .arg(&bin)
        .assert()
        .success()
        .stdout(predicate::str::contains("Binary installed to"));

    let installed = bin.join("sb");
    assert!(installed.is_file());
    assert!(is_executable(&installed));
    assert_eq!(fs::read_dir(&bin).unwrap().count(), 1);

    let config = fs::read_to_string(sandbox.config_path()).unwrap();
    assert!(config.contains("repo: /tmp/repo"));
    assert!(config.contains("aliases:"));
}

#[test]
fn reinstall_leaves_config_untouched() {
    let sandbox = Sandbox::new();
    let bin = sandbox.root.path().join("bin");
    sandbox.write_config("repo: /custom\naliases:\n  x: y\n");

    sandbox
        .sb()
        .args(["install", "--yes", "--repo", "/tmp/other", "--dir"])
        .arg(&bin)
        .assert()
        .success()
        .stdout(predicate::str::contains("leaving it unchanged"));

    assert_eq!(
        fs::read_to_string(sandbox.config_path()).unwrap(),
        "repo: /custom\naliases:\n  x: y\n"
    );
    assert!(bin.join("sb").is_file());
}

#[test]
fn install_answers_prompts_from_stdin() {
    let sandbox = Sandbox::new();
    let bin = sandbox.root.path().join("prompted-bin");
    let input = format!("{}\n/tmp/repo\nvim\nn\n", bin.display());

    sandbox
        .sb()
        .arg("install")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Next steps:"));

    assert!(bin.join("sb").is_file());
    assert!(sandbox.config_path().is_file());
}

#[test]
fn install_under_wrapper_without_flags_exits_two() {
    let sandbox = Sandbox::new();

    sandbox
        .wrapped()
        .arg("install")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("command sb install"));

    assert!(!sandbox.config_path().exists());
}
