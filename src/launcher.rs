//! Process launching for dispatched urls

use std::cell::RefCell;
use std::fmt;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

use crate::config::LauncherConfig;
use crate::error::{Error, Result};
use crate::handlers::{Launcher, ProcessOutput};

/// Launches real processes using the configured command prefixes
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    shell: Vec<String>,
    opener: Vec<String>,
    browser: Vec<String>,
}

impl SystemLauncher {
    pub fn new(config: &LauncherConfig) -> Self {
        Self {
            shell: config.shell.clone(),
            opener: config.opener.clone(),
            browser: config.browser.clone().unwrap_or_else(|| config.opener.clone()),
        }
    }

    fn command(prefix: &[String], arg: &str) -> Result<Command> {
        let Some((program, args)) = prefix.split_first() else {
            return Err(Error::Spawn {
                command: arg.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "empty launcher command",
                ),
            });
        };
        let mut command = Command::new(program);
        command.args(args).arg(arg);
        Ok(command)
    }

    fn run_captured(prefix: &[String], arg: &str) -> Result<ProcessOutput> {
        let output = Self::command(prefix, arg)?
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                command: arg.to_string(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ProcessOutput {
            status: output.status.code(),
            output: combined,
        })
    }
}

impl SystemLauncher {
    /// Start a process without waiting for it.
    ///
    /// A detached thread waits on the child so it never lingers as a zombie;
    /// the handle yields its exit code.
    fn spawn_reaped(prefix: &[String], arg: &str) -> Result<JoinHandle<Option<i32>>> {
        let mut child = Self::command(prefix, arg)?
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| Error::Spawn {
                command: arg.to_string(),
                source,
            })?;

        let pid = child.id();
        Ok(thread::spawn(move || match child.wait() {
            Ok(status) => {
                tracing::debug!(pid, %status, "Browser process exited");
                status.code()
            }
            Err(err) => {
                tracing::warn!(pid, %err, "Failed to wait on browser process");
                None
            }
        }))
    }
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self::new(&LauncherConfig::default())
    }
}

impl Launcher for SystemLauncher {
    fn run_command(&self, command_line: &str) -> Result<ProcessOutput> {
        Self::run_captured(&self.shell, command_line)
    }

    fn open_with_os_default(&self, target: &str) -> Result<ProcessOutput> {
        Self::run_captured(&self.opener, target)
    }

    fn open_url(&self, url: &str) -> Result<()> {
        Self::spawn_reaped(&self.browser, url)?;
        Ok(())
    }
}

/// A side effect requested from a [`Launcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Command(String),
    OsDefault(String),
    Browser(String),
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Command(command) => write!(f, "run: {}", command),
            Invocation::OsDefault(target) => write!(f, "open: {}", target),
            Invocation::Browser(url) => write!(f, "browse: {}", url),
        }
    }
}

/// Launcher that records requests instead of performing them
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    invocations: RefCell<Vec<Invocation>>,
    reply: ProcessOutput,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every process request with `reply`
    pub fn with_reply(reply: ProcessOutput) -> Self {
        Self {
            reply,
            ..Self::default()
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    fn record(&self, invocation: Invocation) {
        tracing::debug!(?invocation, "Recorded invocation");
        self.invocations.borrow_mut().push(invocation);
    }
}

impl Launcher for RecordingLauncher {
    fn run_command(&self, command_line: &str) -> Result<ProcessOutput> {
        self.record(Invocation::Command(command_line.to_string()));
        Ok(self.reply.clone())
    }

    fn open_with_os_default(&self, target: &str) -> Result<ProcessOutput> {
        self.record(Invocation::OsDefault(target.to_string()));
        Ok(self.reply.clone())
    }

    fn open_url(&self, url: &str) -> Result<()> {
        self.record(Invocation::Browser(url.to_string()));
        Ok(())
    }
}
