use clap::{ArgAction, Parser};
use std::io::Write;
use std::path::PathBuf;

use crate::config::{Config, ConfigError, check_profile_id};
use crate::error::{Error, Result};
use crate::handlers::{Dispatcher, Launcher, Outcome, Registry};
use crate::launcher::{RecordingLauncher, SystemLauncher};

#[derive(Parser, Debug, Default)]
#[command(name = "fxhandlers")]
#[command(about = "List and run the external handlers registered in a browser profile", long_about = None)]
#[command(disable_help_flag = true)]
#[command(after_help = "URLs given without an option are handled as with --doUrl")]
pub struct Cli {
    /// Select an OS user (empty resets to the current user)
    #[arg(long, value_name = "USER")]
    pub user: Option<String>,

    /// Select a browser profile directory (empty resets to auto-detection)
    #[arg(long, value_name = "PROFILE")]
    pub profile: Option<String>,

    /// Read the registry from this file instead of a profile
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// List all external formats known to the browser
    #[arg(long, visible_alias = "ls")]
    pub list: bool,

    /// Open the handler for a mime type
    #[arg(long = "doMime", value_name = "MIME,[HANDLER,]URL")]
    pub do_mime: Vec<String>,

    /// Open the handler for a url protocol
    #[arg(long = "doUrl", value_name = "[HANDLER,]URL")]
    pub do_url: Vec<String>,

    /// Open the handler for a file extension type
    #[arg(long = "doExtn", value_name = "[HANDLER,]URL")]
    pub do_extn: Vec<String>,

    /// Dump the registry as JSON
    #[arg(long)]
    pub json: bool,

    /// List file extension -> mime type mappings
    #[arg(long)]
    pub ext2mime: bool,

    /// Print what would be launched instead of launching it
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print help
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub help: bool,

    /// URLs to open by their protocol
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,
}

/// One dispatch asked for on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Mime {
        mime: Option<String>,
        handler: Option<String>,
        url: String,
    },
    Url {
        handler: Option<String>,
        url: String,
    },
    Extension {
        handler: Option<String>,
        path: String,
    },
}

/// Split `[handler,]url`.
///
/// Only the part before the first `:` is searched for `,` so urls keep
/// their commas.
pub fn parse_handler_target(arg: &str) -> (Option<String>, String) {
    let (head, rest) = split_head(arg);
    let parts: Vec<&str> = head.split(',').collect();
    match parts.as_slice() {
        [handler, .., last] => (Some(handler.to_string()), format!("{}{}", last, rest)),
        _ => (None, arg.to_string()),
    }
}

/// Split `mime,[handler,]url`; without a `,` there is no mime type.
pub fn parse_mime_target(arg: &str) -> (Option<String>, Option<String>, String) {
    let (head, rest) = split_head(arg);
    let parts: Vec<&str> = head.split(',').collect();
    match parts.as_slice() {
        [mime, handler, .., last] => (
            Some(mime.to_string()),
            Some(handler.to_string()),
            format!("{}{}", last, rest),
        ),
        [mime, last] => (Some(mime.to_string()), None, format!("{}{}", last, rest)),
        _ => (None, None, arg.to_string()),
    }
}

/// `(before first ':', from ':' on)`
fn split_head(arg: &str) -> (&str, &str) {
    match arg.find(':') {
        Some(index) => arg.split_at(index),
        None => (arg, ""),
    }
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|value| !value.is_empty())
}

impl Cli {
    /// Dispatches in execution order
    pub fn requests(&self) -> Vec<Request> {
        let mut requests = Vec::new();
        for arg in &self.do_mime {
            let (mime, handler, url) = parse_mime_target(arg);
            requests.push(Request::Mime { mime, handler, url });
        }
        for arg in &self.do_url {
            let (handler, url) = parse_handler_target(arg);
            requests.push(Request::Url { handler, url });
        }
        for arg in &self.do_extn {
            let (handler, path) = parse_handler_target(arg);
            requests.push(Request::Extension { handler, path });
        }
        for url in &self.urls {
            requests.push(Request::Url {
                handler: None,
                url: url.clone(),
            });
        }
        requests
    }
}

fn emit<W: Write>(out: &mut W, text: &str) -> Result<()> {
    writeln!(out, "{}", text).map_err(|source| Error::io("<stdout>", source))
}

/// Apply identity overrides, print the requested views, then dispatch
pub fn run<L: Launcher, W: Write>(
    cli: &Cli,
    dispatcher: &mut Dispatcher<L>,
    out: &mut W,
) -> Result<()> {
    let registry = dispatcher.registry_mut();
    if let Some(user) = &cli.user {
        registry.set_os_user(non_empty(user));
    }
    if let Some(profile) = &cli.profile {
        let profile_id = non_empty(profile);
        if let Some(id) = &profile_id {
            check_profile_id(id).map_err(ConfigError::from)?;
        }
        registry.set_profile_id(profile_id);
    }
    if let Some(file) = &cli.file {
        registry.set_filename(Some(file.clone()));
    }

    if cli.list {
        let listing = registry.document()?.to_string();
        emit(out, &listing)?;
    }
    if cli.json {
        let json = registry.to_json()?;
        emit(out, &json)?;
    }
    if cli.ext2mime {
        let table = serde_json::to_string_pretty(registry.ext_to_mime_table()?)?;
        emit(out, &table)?;
    }

    for request in cli.requests() {
        tracing::debug!(?request, "Dispatching");
        let outcome = match &request {
            Request::Mime { mime, handler, url } => {
                dispatcher.dispatch_by_mime(url, mime.as_deref(), handler.as_deref())?
            }
            Request::Url { handler, url } => dispatcher.dispatch_by_url(url, handler.as_deref())?,
            Request::Extension { handler, path } => {
                dispatcher.dispatch_by_extension(path, handler.as_deref())?
            }
        };
        if let Outcome::Executed { output, .. } = &outcome {
            if !output.is_empty() {
                emit(out, output.trim_end())?;
            }
        }
    }

    Ok(())
}

/// Run against a recording launcher, then print every launch it saw.
///
/// Launches recorded before a failing request are printed too.
pub fn dry_run<W: Write>(cli: &Cli, registry: Registry, out: &mut W) -> Result<()> {
    let mut dispatcher = Dispatcher::new(registry, RecordingLauncher::new());
    let result = run(cli, &mut dispatcher, out);
    for invocation in dispatcher.launcher().invocations() {
        emit(out, &invocation.to_string())?;
    }
    result
}

/// Run the command line against the configured profile
pub fn execute(cli: &Cli, config: &Config) -> Result<()> {
    let registry = config.registry();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.dry_run {
        return dry_run(cli, registry, &mut out);
    }

    let mut dispatcher = Dispatcher::new(registry, SystemLauncher::new(&config.launcher));
    run(cli, &mut dispatcher, &mut out)
}
