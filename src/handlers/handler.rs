use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::traits::Launcher;
use super::types::Outcome;
use crate::error::{Error, Result};

/// Substitution marker for the url in paths and uri templates
pub const URL_MARKER: &str = "%s";

/// Everything but ASCII alphanumerics and `_.-~` gets escaped
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Where a handler sends the url
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HandlerTarget {
    /// Neither a path nor a template; fails when invoked
    #[default]
    Unconfigured,
    /// Local executable, optionally containing [`URL_MARKER`]
    LocalPath(String),
    /// Web service uri, must contain [`URL_MARKER`]
    UriTemplate(String),
}

/// A single registered handler for a mime type or url scheme
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HandlerDoc", into = "HandlerDoc")]
pub struct Handler {
    pub name: String,
    pub target: HandlerTarget,
}

/// Persisted shape of a [`Handler`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HandlerDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri_template: Option<String>,
}

impl From<HandlerDoc> for Handler {
    fn from(doc: HandlerDoc) -> Self {
        // A path wins over a template when a document carries both
        let target = match (doc.path, doc.uri_template) {
            (Some(path), _) => HandlerTarget::LocalPath(path),
            (None, Some(template)) => HandlerTarget::UriTemplate(template),
            (None, None) => HandlerTarget::Unconfigured,
        };
        Self {
            name: doc.name.unwrap_or_default(),
            target,
        }
    }
}

impl From<Handler> for HandlerDoc {
    fn from(handler: Handler) -> Self {
        let (path, uri_template) = match handler.target {
            HandlerTarget::LocalPath(path) => (Some(path), None),
            HandlerTarget::UriTemplate(template) => (None, Some(template)),
            HandlerTarget::Unconfigured => (None, None),
        };
        Self {
            name: Some(handler.name).filter(|name| !name.is_empty()),
            path,
            uri_template,
        }
    }
}

impl Handler {
    pub fn local(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: HandlerTarget::LocalPath(path.into()),
        }
    }

    pub fn web(name: impl Into<String>, uri_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: HandlerTarget::UriTemplate(uri_template.into()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.target != HandlerTarget::Unconfigured
    }

    /// The path or uri template, whichever is configured
    pub fn target_str(&self) -> Option<&str> {
        match &self.target {
            HandlerTarget::LocalPath(path) => Some(path),
            HandlerTarget::UriTemplate(template) => Some(template),
            HandlerTarget::Unconfigured => None,
        }
    }

    /// Build the command line or uri that handing `url` to this handler means.
    ///
    /// Returns `Ok(None)` for an unconfigured handler.
    pub fn build_invocation(&self, url: &str) -> Result<Option<String>> {
        match &self.target {
            HandlerTarget::Unconfigured => Ok(None),
            HandlerTarget::LocalPath(path) => {
                let quoted = shell_quote(url);
                if path.contains(URL_MARKER) {
                    Ok(Some(path.replacen(URL_MARKER, &quoted, 1)))
                } else {
                    Ok(Some(format!("{} {}", path, quoted)))
                }
            }
            HandlerTarget::UriTemplate(template) => {
                if !template.contains(URL_MARKER) {
                    return Err(Error::MalformedTemplate {
                        template: template.clone(),
                    });
                }
                Ok(Some(template.replacen(URL_MARKER, &quote_plus(url), 1)))
            }
        }
    }

    /// Hand `url` to this handler.
    ///
    /// Local paths block until the spawned process exits. Uri templates are
    /// opened through the browser and not awaited.
    pub fn invoke<L: Launcher>(&self, url: &str, launcher: &L) -> Result<Outcome> {
        let Some(invocation) = self.build_invocation(url)? else {
            return Err(Error::Unconfigured {
                url: url.to_string(),
            });
        };

        match self.target {
            HandlerTarget::LocalPath(_) => {
                tracing::info!(command = %invocation, "Executing");
                let finished = launcher.run_command(&invocation)?;
                tracing::debug!(status = ?finished.status, output = %finished.output, "Process finished");
                Ok(Outcome::Executed {
                    command: invocation,
                    status: finished.status,
                    output: finished.output,
                })
            }
            _ => {
                tracing::info!(url = %invocation, "Opening URL");
                launcher.open_url(&invocation)?;
                Ok(Outcome::Opened { url: invocation })
            }
        }
    }

    pub(crate) fn render(&self, indent: &str) -> String {
        let mut lines = Vec::new();
        if self.name.is_empty() {
            lines.push("[unnamed]".to_string());
        } else {
            lines.push(self.name.clone());
        }
        if let Some(target) = self.target_str() {
            lines.push(format!("target: {}", target));
        }
        format!("{}{}", indent, lines.join(&format!("\n      {}", indent)))
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}

/// Single-quote `value` for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}

/// Percent-encode `value` for a query string, spaces becoming `+`
pub fn quote_plus(value: &str) -> String {
    value
        .split(' ')
        .map(|part| utf8_percent_encode(part, QUERY_VALUE).to_string())
        .collect::<Vec<_>>()
        .join("+")
}
