use crate::error::Result;

/// Captured result of a finished external process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    /// stdout followed by stderr
    pub output: String,
}

impl Default for ProcessOutput {
    fn default() -> Self {
        Self {
            status: Some(0),
            output: String::new(),
        }
    }
}

/// Side effects a dispatch can cause
///
/// Everything that touches the operating system goes through this trait so the
/// registry model stays testable. Implementations block until spawned processes
/// exit; [`Launcher::open_url`] is fire-and-forget.
pub trait Launcher {
    /// Run a complete command line through the platform shell
    fn run_command(&self, command_line: &str) -> Result<ProcessOutput>;

    /// Hand a target to the OS generic "open" command
    fn open_with_os_default(&self, target: &str) -> Result<ProcessOutput>;

    /// Open a URL in the default browser without waiting for it
    fn open_url(&self, url: &str) -> Result<()>;
}

impl<L: Launcher + ?Sized> Launcher for &L {
    fn run_command(&self, command_line: &str) -> Result<ProcessOutput> {
        (**self).run_command(command_line)
    }

    fn open_with_os_default(&self, target: &str) -> Result<ProcessOutput> {
        (**self).open_with_os_default(target)
    }

    fn open_url(&self, url: &str) -> Result<()> {
        (**self).open_url(url)
    }
}
