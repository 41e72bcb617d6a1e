//! External command execution with timeout and output capture.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::config::DEFAULT_COMMAND_TIMEOUT;
use super::error::{Error, Result};

/// Captured result of a finished command.
#[derive(Clone, Debug, Default)]
pub struct ExecOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Stdout split into lines
    pub stdout: Vec<String>,
    /// Stderr split into lines
    pub stderr: Vec<String>,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Builder for a single external command invocation.
#[derive(Clone, Debug)]
pub struct Executor {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    timeout: Duration,
}

impl Executor {
    pub fn of<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            current_dir: None,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Human-readable command line, for logs and error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Runs the command and captures its output whatever the exit code.
    pub async fn output(&self) -> Result<ExecOutput> {
        let command_line = self.command_line();
        log::debug!("Running: {}", command_line);

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|error| Error::CommandFailed {
            command: command_line.clone(),
            error,
        })?;

        // kill_on_drop reaps the child if the timeout drops the future
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(error)) => {
                return Err(Error::CommandFailed {
                    command: command_line,
                    error,
                });
            }
            Err(_elapsed) => {
                log::warn!(
                    "`{}` timed out after {} seconds, terminating...",
                    command_line,
                    self.timeout.as_secs()
                );
                return Err(Error::CommandTimeout {
                    command: command_line,
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let result = ExecOutput {
            code: output.status.code(),
            stdout: split_lines(&output.stdout),
            stderr: split_lines(&output.stderr),
        };
        log::debug!("`{}` exited with {:?}", command_line, result.code);
        Ok(result)
    }

    /// Runs the command and requires exit code 0.
    pub async fn execute(&self) -> Result<ExecOutput> {
        self.execute_expecting(0).await
    }

    /// Runs the command and requires the given exit code.
    pub async fn execute_expecting(&self, expected: i32) -> Result<ExecOutput> {
        let output = self.output().await?;
        if output.code != Some(expected) {
            return Err(Error::UnexpectedExitCode {
                command: self.command_line(),
                code: output.code,
                expected,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_joins_arguments() {
        let exec = Executor::of("candle.exe", ["-nologo", "-arch", "x64"]).arg("jdk.wxs");
        assert_eq!(exec.command_line(), "candle.exe -nologo -arch x64 jdk.wxs");
    }

    #[test]
    fn split_lines_drops_carriage_returns() {
        assert_eq!(split_lines(b"a\r\nb\r\n"), ["a", "b"]);
        assert!(split_lines(b"").is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_output_and_exit_code() {
        let output = Executor::of("sh", ["-c", "echo out; echo err >&2; exit 3"])
            .output()
            .await
            .expect("sh runs");
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout, ["out"]);
        assert_eq!(output.stderr, ["err"]);

        let err = Executor::of("sh", ["-c", "exit 3"]).execute().await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedExitCode { code: Some(3), .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn times_out_long_commands() {
        let err = Executor::of("sleep", ["5"])
            .timeout(Duration::from_millis(100))
            .output()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandTimeout { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_command_failed() {
        let err = Executor::of("definitely-not-a-real-tool-xyz", Vec::<String>::new())
            .output()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }
}
