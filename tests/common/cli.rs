use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::process::ExitStatus;

use assert_cmd::Command;
use tempfile::TempDir;

/// Pinned clock shared by fixtures and commands.
pub const NOW: &str = "2024-06-10T12:00:00Z";

/// Isolated working directory with its own config home.
pub struct DeskWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl DeskWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        fs::create_dir_all(root.join("config-home")).expect("config home");
        Self { temp_dir, root }
    }

    /// Write `contents` under the workspace and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(&path, contents).expect("write file");
        path
    }
}

pub struct CmdOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}

pub fn hdms_command(workspace: &DeskWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("hdms").expect("hdms binary");
    cmd.current_dir(&workspace.root)
        .env("XDG_CONFIG_HOME", workspace.root.join("config-home"))
        .env("HOME", &workspace.root)
        .env("TZ", "UTC")
        .env_remove("RUST_LOG")
        .env_remove("HDMS_CONFIG")
        .env_remove("HDMS_SOURCE")
        .env_remove("HDMS_AUTH_TOKEN")
        .env_remove("HDMS_SLA_WINDOW_HOURS")
        .env_remove("HDMS_INACTIVITY_LIMIT_SECONDS");
    cmd
}

pub fn run_hdms<I, S>(workspace: &DeskWorkspace, args: I, label: &str) -> CmdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_hdms_with_stdin(workspace, args, "", label)
}

pub fn run_hdms_with_stdin<I, S>(
    workspace: &DeskWorkspace,
    args: I,
    stdin: &str,
    label: &str,
) -> CmdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = hdms_command(workspace)
        .args(args)
        .write_stdin(stdin.to_string())
        .output()
        .unwrap_or_else(|e| panic!("{label}: failed to run hdms: {e}"));
    CmdOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
