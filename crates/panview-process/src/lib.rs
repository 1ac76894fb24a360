//! External tool invocation for panview.
//!
//! Every renderer panview drives (pandoc and the diagram tools) follows the
//! same contract: input bytes on stdin, output bytes on stdout, diagnostics on
//! stderr, non-zero exit on failure. [`Tool`] runs one such invocation with:
//!
//! - stdin written concurrently with stdout/stderr collection, so large
//!   documents cannot deadlock on full pipes
//! - a timeout bounding the whole run
//! - `kill_on_drop`, so a cancelled request also kills its subprocess
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use panview_process::Tool;
//!
//! let png = Tool::new("dot")
//!     .arg("-Tpng")
//!     .timeout(Duration::from_secs(10))
//!     .run(b"digraph { a -> b }")
//!     .await?;
//! ```

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Default upper bound for a single invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A configured external program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tool {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

/// Error returned when a tool invocation does not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The program could not be started.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// The program did not finish in time and was killed.
    #[error("`{program}` did not finish within {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
    /// The program exited unsuccessfully.
    #[error("`{program}` failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    /// Reading the program's output failed.
    #[error("I/O error talking to `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ToolError {
    /// Human-readable diagnostics for display to the document reader.
    ///
    /// For a failed run this is the tool's own stderr, verbatim; otherwise
    /// the error message.
    #[must_use]
    pub fn diagnostics(&self) -> String {
        match self {
            Self::Failed { stderr, .. } if !stderr.trim().is_empty() => stderr.clone(),
            _ => self.to_string(),
        }
    }
}

impl Tool {
    /// Create a tool for `program` with no arguments and the default timeout.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a tool from an argument vector (`argv[0]` is the program).
    ///
    /// Returns `None` for an empty vector.
    #[must_use]
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the timeout for each run.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program name or path.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments after the program.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Run the tool, feeding `input` on stdin, and return its stdout.
    ///
    /// An empty `input` closes stdin immediately.
    pub async fn run(&self, input: &[u8]) -> Result<Vec<u8>, ToolError> {
        tracing::debug!(program = %self.program, args = ?self.args, "Running external tool");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(if input.is_empty() {
                Stdio::null()
            } else {
                Stdio::piped()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // A tool may exit before reading all input; its exit status
                // decides the outcome, not the broken pipe.
                match stdin.write_all(input).await {
                    Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
            }
            Ok(())
        };

        let (fed, output) = tokio::time::timeout(self.timeout, async {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .map_err(|_| {
            tracing::warn!(program = %self.program, timeout = ?self.timeout, "External tool timed out");
            ToolError::Timeout {
                program: self.program.clone(),
                timeout: self.timeout,
            }
        })?;

        let io_error = |source| ToolError::Io {
            program: self.program.clone(),
            source,
        };
        let output = output.map_err(io_error)?;
        fed.map_err(io_error)?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(output.stdout)
    }
}
