use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use super::handler::Handler;
use super::traits::Launcher;
use super::types::Outcome;
use crate::error::{Error, Result};

/// What the browser does with content routed to a [`HandlerSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Action {
    ExecuteOsDefaultApplication,
    /// Reserved by the browser, never dispatched
    Mystery,
    ExecuteApplication,
    OpenInBrowser,
    ExecuteApplicationVariant,
    /// Any value outside the known range, kept for round-tripping
    Other(i64),
}

const ACTION_NAMES: &[(Action, &str)] = &[
    (Action::ExecuteOsDefaultApplication, "ACTION_EXECUTE_OS_DEFAULT_APPLICATION"),
    (Action::Mystery, "ACTION_MYSTERY"),
    (Action::ExecuteApplication, "ACTION_EXECUTE_APPLICATION"),
    (Action::OpenInBrowser, "ACTION_OPEN_IN_BROWSER"),
    (Action::ExecuteApplicationVariant, "ACTION_EXECUTE_APPLICATION_VARIANT"),
];

/// Older spellings still accepted when parsing a name
const ACTION_ALIASES: &[(Action, &str)] = &[
    (Action::OpenInBrowser, "ACTION_OPEN_IN_FIREFOX"),
    (Action::ExecuteApplicationVariant, "ACTION_EXECUTE_APPLICATION_X"),
];

impl Action {
    pub fn value(self) -> i64 {
        match self {
            Action::ExecuteOsDefaultApplication => 0,
            Action::Mystery => 1,
            Action::ExecuteApplication => 2,
            Action::OpenInBrowser => 3,
            Action::ExecuteApplicationVariant => 4,
            Action::Other(value) => value,
        }
    }

    pub fn name(self) -> Cow<'static, str> {
        ACTION_NAMES
            .iter()
            .find(|(action, _)| *action == self)
            .map(|(_, name)| Cow::Borrowed(*name))
            .unwrap_or_else(|| Cow::Owned(format!("Unknown action ({})", self.value())))
    }
}

impl From<i64> for Action {
    fn from(value: i64) -> Self {
        match value {
            0 => Action::ExecuteOsDefaultApplication,
            1 => Action::Mystery,
            2 => Action::ExecuteApplication,
            3 => Action::OpenInBrowser,
            4 => Action::ExecuteApplicationVariant,
            other => Action::Other(other),
        }
    }
}

impl From<Action> for i64 {
    fn from(action: Action) -> Self {
        action.value()
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        ACTION_NAMES
            .iter()
            .chain(ACTION_ALIASES)
            .find(|(_, known)| *known == name)
            .map(|(action, _)| *action)
            .ok_or_else(|| Error::UnknownActionName(name.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The handlers registered for one mime type or url scheme
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerSet {
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "nullable")]
    pub extensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    /// Carried through untouched
    #[serde(default, skip_serializing_if = "is_false", deserialize_with = "nullable")]
    pub stub_entry: bool,
    /// Advisory only; dispatch never prompts
    #[serde(default, skip_serializing_if = "is_false", deserialize_with = "nullable")]
    pub ask: bool,
    /// First entry is the default
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "handler_list")]
    pub handlers: Vec<Handler>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null` entries become unconfigured handlers
fn handler_list<'de, D>(deserializer: D) -> std::result::Result<Vec<Handler>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<Vec<Option<Handler>>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

impl HandlerSet {
    pub fn new(action: Action) -> Self {
        Self {
            action: Some(action),
            ..Self::default()
        }
    }

    pub fn with_handler(mut self, handler: Handler) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions.extend(extensions.into_iter().map(Into::into));
        self
    }

    /// Action name, or a placeholder when no action is recorded
    pub fn action_name(&self) -> Cow<'static, str> {
        match self.action {
            Some(action) => action.name(),
            None => Cow::Borrowed("Unknown action (unset)"),
        }
    }

    /// Set the action from its symbolic name
    pub fn set_action_name(&mut self, name: &str) -> Result<()> {
        self.action = Some(name.parse()?);
        Ok(())
    }

    /// Pick the handler called `name`, falling back to the first one.
    pub fn resolve_handler(&self, name: Option<&str>) -> Result<&Handler> {
        let Some(default) = self.handlers.first() else {
            return Err(Error::NoHandlerDefined {
                name: self.name.clone(),
                extensions: self.extensions.clone(),
            });
        };

        Ok(name
            .and_then(|wanted| self.handlers.iter().find(|handler| handler.name == wanted))
            .unwrap_or(default))
    }

    /// Route `url` according to this set's action
    pub fn dispatch<L: Launcher>(
        &self,
        url: &str,
        handler_name: Option<&str>,
        launcher: &L,
    ) -> Result<Outcome> {
        match self.action {
            Some(Action::ExecuteApplication | Action::ExecuteApplicationVariant) => {
                self.resolve_handler(handler_name)?.invoke(url, launcher)
            }
            Some(Action::OpenInBrowser) => {
                tracing::info!(url, "Opening in browser");
                launcher.open_url(url)?;
                Ok(Outcome::Opened {
                    url: url.to_string(),
                })
            }
            Some(Action::ExecuteOsDefaultApplication) => {
                tracing::info!(url, "Opening with OS default application");
                let finished = launcher.open_with_os_default(url)?;
                tracing::debug!(status = ?finished.status, output = %finished.output, "Process finished");
                Ok(Outcome::Executed {
                    command: url.to_string(),
                    status: finished.status,
                    output: finished.output,
                })
            }
            Some(Action::Mystery | Action::Other(_)) | None => {
                Err(Error::UnknownAction(self.action_name().into_owned()))
            }
        }
    }

    pub(crate) fn render(&self, indent: &str) -> String {
        let mut lines = Vec::new();
        if !self.name.is_empty() {
            lines.push(format!("name: {}", self.name));
        }
        lines.push(format!("ask: {}", self.ask));
        if !self.extensions.is_empty() {
            lines.push(format!("extensions: {}", self.extensions.join(", ")));
        }
        lines.push(format!("action: {}", self.action_name()));
        lines.push(format!("stubEntry: {}", self.stub_entry));
        if !self.handlers.is_empty() {
            lines.push("handlers:".to_string());
            let nested = format!("{}  ", indent);
            for handler in &self.handlers {
                // Strip our own indent, the join below re-adds it
                lines.push(handler.render(&nested)[indent.len()..].to_string());
            }
        }
        format!("{}{}", indent, lines.join(&format!("\n{}", indent)))
    }
}

impl fmt::Display for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::launcher::{Invocation, RecordingLauncher};

    fn three_handlers() -> HandlerSet {
        HandlerSet::new(Action::ExecuteApplication)
            .with_handler(Handler::local("A", "/bin/a"))
            .with_handler(Handler::local("B", "/bin/b"))
            .with_handler(Handler::local("C", "/bin/c"))
    }

    #[test]
    fn test_resolve_default_named_and_fallback() {
        let set = three_handlers();
        assert_eq!(set.resolve_handler(None).unwrap().name, "A");
        assert_eq!(set.resolve_handler(Some("B")).unwrap().name, "B");
        assert_eq!(set.resolve_handler(Some("Z")).unwrap().name, "A");
        assert_eq!(set.resolve_handler(Some("b")).unwrap().name, "A");
    }

    #[test]
    fn test_resolve_empty_set_fails() {
        let set = HandlerSet {
            name: "PDF".to_string(),
            extensions: vec!["pdf".to_string()],
            ..HandlerSet::new(Action::ExecuteApplication)
        };
        let err = set.resolve_handler(Some("A")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoHandlerDefined);
        let message = err.to_string();
        assert!(message.contains("PDF"));
        assert!(message.contains("pdf"));
    }

    #[test]
    fn test_action_names_round_trip() {
        for value in 0..=4 {
            let action = Action::from(value);
            assert_eq!(action.name().parse::<Action>().unwrap(), action);
            assert_eq!(i64::from(action), value);
        }
        assert_eq!(Action::from(9).name(), "Unknown action (9)");
    }

    #[test]
    fn test_unknown_action_name_fails() {
        let mut set = HandlerSet::default();
        let err = set.set_action_name("ACTION_TELEPORT").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownActionName);

        set.set_action_name("ACTION_OPEN_IN_BROWSER").unwrap();
        assert_eq!(set.action, Some(Action::OpenInBrowser));
    }

    #[test]
    fn test_older_action_spellings_accepted() {
        let mut set = HandlerSet::default();
        set.set_action_name("ACTION_OPEN_IN_FIREFOX").unwrap();
        assert_eq!(set.action, Some(Action::OpenInBrowser));
        assert_eq!(set.action_name(), "ACTION_OPEN_IN_BROWSER");

        assert_eq!(
            "ACTION_EXECUTE_APPLICATION_X".parse::<Action>().unwrap(),
            Action::ExecuteApplicationVariant
        );
    }

    #[test]
    fn test_dispatch_execute_application_uses_named_handler() {
        let launcher = RecordingLauncher::new();
        three_handlers().dispatch("f.txt", Some("C"), &launcher).unwrap();
        assert_eq!(
            launcher.invocations(),
            vec![Invocation::Command("/bin/c 'f.txt'".to_string())]
        );
    }

    #[test]
    fn test_dispatch_variant_behaves_like_execute_application() {
        let mut set = three_handlers();
        set.action = Some(Action::ExecuteApplicationVariant);
        let launcher = RecordingLauncher::new();
        set.dispatch("f.txt", None, &launcher).unwrap();
        assert_eq!(
            launcher.invocations(),
            vec![Invocation::Command("/bin/a 'f.txt'".to_string())]
        );
    }

    #[test]
    fn test_dispatch_open_in_browser_ignores_handlers() {
        let launcher = RecordingLauncher::new();
        let set = HandlerSet::new(Action::OpenInBrowser);
        let outcome = set.dispatch("https://x/", Some("missing"), &launcher).unwrap();
        assert_eq!(
            outcome,
            Outcome::Opened {
                url: "https://x/".to_string()
            }
        );
        assert_eq!(
            launcher.invocations(),
            vec![Invocation::Browser("https://x/".to_string())]
        );
    }

    #[test]
    fn test_dispatch_os_default() {
        let launcher = RecordingLauncher::new();
        HandlerSet::new(Action::ExecuteOsDefaultApplication)
            .dispatch("report.pdf", None, &launcher)
            .unwrap();
        assert_eq!(
            launcher.invocations(),
            vec![Invocation::OsDefault("report.pdf".to_string())]
        );
    }

    #[test]
    fn test_dispatch_unknown_actions_fail() {
        let launcher = RecordingLauncher::new();
        for action in [Some(Action::Mystery), Some(Action::Other(17)), None] {
            let set = HandlerSet {
                action,
                ..three_handlers()
            };
            let err = set.dispatch("x", None, &launcher).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnknownAction);
        }
        assert!(launcher.invocations().is_empty());
    }

    #[test]
    fn test_execute_application_without_handlers_fails() {
        let launcher = RecordingLauncher::new();
        let err = HandlerSet::new(Action::ExecuteApplication)
            .dispatch("x", None, &launcher)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoHandlerDefined);
    }

    #[test]
    fn test_null_handler_entries_become_unconfigured() {
        let set: HandlerSet =
            serde_json::from_str(r#"{"action":2,"handlers":[null,{"name":"x","path":"/x"}]}"#)
                .unwrap();
        assert_eq!(set.handlers.len(), 2);
        assert!(!set.handlers[0].is_configured());
        assert_eq!(set.handlers[1].name, "x");
    }

    #[test]
    fn test_serialization_omits_defaults() {
        let json = serde_json::to_value(HandlerSet::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));

        let set = HandlerSet {
            ask: true,
            ..HandlerSet::new(Action::Other(42)).with_extensions(["a"])
        };
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "extensions": ["a"], "action": 42, "ask": true })
        );
        let back: HandlerSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_render_lists_handlers() {
        let text = three_handlers().to_string();
        assert!(text.contains("action: ACTION_EXECUTE_APPLICATION"));
        assert!(text.contains("handlers:"));
        assert!(text.contains("  B\n        target: /bin/b"));
    }
}
