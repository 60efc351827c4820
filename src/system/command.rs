//! External command execution for the configurators.

use crate::error::{Error, Result};
use std::fmt;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// One program invocation, kept as data so plans can be inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name, resolved through `PATH`
    pub program: String,
    /// Arguments passed verbatim, without a shell
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a command spec.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Run the command and return its standard output.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the program cannot be spawned or exits
    /// unsuccessfully.
    pub async fn run(&self) -> Result<String> {
        self.run_with_input(None).await
    }

    /// Run the command, writing `input` to its standard input.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the program cannot be spawned or exits
    /// unsuccessfully.
    pub async fn run_with_input(&self, input: Option<&str>) -> Result<String> {
        tracing::debug!("Running {self}");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::command(&self.program, e.to_string()))?;

        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin.write_all(input.as_bytes()).await?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::command(&self.program, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => output.status.to_string(),
                msg => msg.to_string(),
            };
            return Err(Error::command(&self.program, message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
