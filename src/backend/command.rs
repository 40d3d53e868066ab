//! External process runner
//!
//! Backends that shell out to image tools go through [`CommandRunner`], which
//! captures stdout and stderr and enforces an optional time budget. A child
//! that outlives the budget is killed.

use std::fmt;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;
use thiserror::Error;
use wait_timeout::ChildExt;

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command `{command}` not found")]
    NotFound { command: String },

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Command `{command}` failed with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Command `{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("Command `{command}` output was not valid UTF-8")]
    InvalidUtf8 { command: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One way of invoking a tool: a program plus fixed leading arguments,
/// e.g. `magick convert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCommand {
    pub program: String,
    pub prefix: Vec<String>,
}

impl CandidateCommand {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            prefix: Vec::new(),
        }
    }

    pub fn with_prefix<S: Into<String>>(program: S, prefix: &[&str]) -> Self {
        Self {
            program: program.into(),
            prefix: prefix.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Whether the program resolves on `PATH` (or as a path)
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// Run with `args` appended to the prefix
    pub fn run(&self, runner: &CommandRunner, args: &[String]) -> CommandResult<String> {
        let mut full = self.prefix.clone();
        full.extend_from_slice(args);
        runner.run(&self.program, &full)
    }
}

impl fmt::Display for CandidateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.prefix {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// The candidates whose program is installed, in their original order
pub fn available_candidates(candidates: &[CandidateCommand]) -> Vec<CandidateCommand> {
    candidates
        .iter()
        .filter(|candidate| candidate.is_available())
        .cloned()
        .collect()
}

/// Runs external programs with an optional timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandRunner {
    timeout: Option<Duration>,
}

impl CommandRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `program` and return its stdout. A non-zero exit is an error.
    pub fn run(&self, program: &str, args: &[String]) -> CommandResult<String> {
        let command_line = render(program, args);
        debug!("Running `{}`", command_line);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    CommandError::NotFound {
                        command: program.to_string(),
                    }
                } else {
                    CommandError::Spawn {
                        command: command_line.clone(),
                        source,
                    }
                }
            })?;

        // Drain both pipes while waiting so a chatty child cannot block on a full pipe
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let status = match self.timeout {
            Some(timeout) => match child.wait_timeout(timeout)? {
                Some(status) => status,
                None => {
                    child.kill()?;
                    child.wait()?;
                    return Err(CommandError::Timeout {
                        command: command_line,
                        timeout,
                    });
                }
            },
            None => child.wait()?,
        };

        let stdout = join_reader(stdout)?;
        let stderr = join_reader(stderr)?;

        if !status.success() {
            return Err(CommandError::Failed {
                command: command_line,
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        String::from_utf8(stdout).map_err(|_| CommandError::InvalidUtf8 {
            command: command_line,
        })
    }
}

fn render(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn join_reader(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> CommandResult<Vec<u8>> {
    match handle {
        None => Ok(Vec::new()),
        Some(handle) => handle
            .join()
            .map_err(|_| io::Error::other("output reader panicked"))?
            .map_err(CommandError::from),
    }
}
