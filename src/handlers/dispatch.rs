use super::registry::Registry;
use super::traits::Launcher;
use super::types::Outcome;
use crate::error::{Error, Result};

/// Scheme of `url`: everything before the first `:`
pub fn scheme_of(url: &str) -> &str {
    url.split_once(':').map_or(url, |(scheme, _)| scheme)
}

/// Routes urls, mime types and file paths to registered handlers
#[derive(Debug)]
pub struct Dispatcher<L> {
    registry: Registry,
    launcher: L,
}

impl<L: Launcher> Dispatcher<L> {
    pub fn new(registry: Registry, launcher: L) -> Self {
        Self { registry, launcher }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn into_parts(self) -> (Registry, L) {
        (self.registry, self.launcher)
    }

    /// Run the handler registered for `mime`
    pub fn dispatch_by_mime(
        &mut self,
        url: &str,
        mime: Option<&str>,
        handler_name: Option<&str>,
    ) -> Result<Outcome> {
        let mime = mime.ok_or(Error::MimeRequired)?;
        self.registry
            .lookup_by_mime(mime)?
            .dispatch(url, handler_name, &self.launcher)
    }

    /// Run the handler registered for the scheme of `url`.
    ///
    /// Web urls without an explicit handler first go through a mime dispatch
    /// with no mime type, which cannot succeed yet; its failure is logged and
    /// scheme dispatch continues.
    pub fn dispatch_by_url(&mut self, url: &str, handler_name: Option<&str>) -> Result<Outcome> {
        let scheme = scheme_of(url);
        if handler_name.is_none() && matches!(scheme, "http" | "https") {
            if let Err(err) = self.dispatch_by_mime(url, None, None) {
                tracing::debug!(url, %err, "Mime dispatch skipped for web url");
            }
        }

        self.registry
            .lookup_by_scheme(scheme)?
            .dispatch(url, handler_name, &self.launcher)
    }

    /// Run the handler for the mime type the extension of `path` maps to
    pub fn dispatch_by_extension(
        &mut self,
        path: &str,
        handler_name: Option<&str>,
    ) -> Result<Outcome> {
        let mime = self
            .registry
            .extension_to_mime(path)?
            .ok_or_else(|| Error::UnknownExtension {
                path: path.to_string(),
            })?;
        self.dispatch_by_mime(path, Some(mime.as_str()), handler_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::launcher::{Invocation, RecordingLauncher};
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    const DOC: &str = r#"{
        "mimeTypes": {
            "application/pdf": {"action": 2, "extensions": ["pdf"],
                "handlers": [{"name": "Evince", "path": "/usr/bin/evince"},
                             {"name": "Okular", "path": "/usr/bin/okular %s"}]},
            "text/html": {"action": 3}
        },
        "schemes": {
            "mailto": {"action": 2, "handlers": [{"name": "Mail", "uriTemplate": "https://m/?to=%s"}]},
            "https": {"action": 3},
            "tel": {"action": 1}
        }
    }"#;

    fn dispatcher() -> Dispatcher<RecordingLauncher> {
        Dispatcher::new(
            Registry::from_slice(DOC.as_bytes()).unwrap(),
            RecordingLauncher::new(),
        )
    }

    #[test]
    fn test_scheme_of() {
        assert_eq!(scheme_of("mailto:a@b.com"), "mailto");
        assert_eq!(scheme_of("https://x/y:z"), "https");
        assert_eq!(scheme_of("no-colon"), "no-colon");
    }

    #[test]
    fn test_mime_required() {
        let mut dispatcher = dispatcher();
        let err = dispatcher.dispatch_by_mime("x", None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MimeRequired);
    }

    #[test]
    fn test_dispatch_by_mime_with_handler() {
        let mut dispatcher = dispatcher();
        dispatcher
            .dispatch_by_mime("/tmp/a b.pdf", Some("application/pdf"), Some("Okular"))
            .unwrap();
        assert_eq!(
            dispatcher.launcher().invocations(),
            vec![Invocation::Command("/usr/bin/okular '/tmp/a b.pdf'".to_string())]
        );
    }

    #[test]
    fn test_dispatch_by_url_resolves_scheme() {
        let mut dispatcher = dispatcher();
        dispatcher.dispatch_by_url("mailto:a@b.com", None).unwrap();
        assert_eq!(
            dispatcher.launcher().invocations(),
            vec![Invocation::Browser("https://m/?to=mailto%3Aa%40b.com".to_string())]
        );
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn logged_at(level: Level, url: &str) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(level)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            dispatcher().dispatch_by_url(url, None).unwrap();
        });
        captured.text()
    }

    #[test]
    fn test_skipped_mime_dispatch_is_debug_only() {
        assert!(!logged_at(Level::WARN, "https://example.com/").contains("Mime dispatch skipped"));
        assert!(logged_at(Level::DEBUG, "https://example.com/").contains("Mime dispatch skipped"));
        assert!(!logged_at(Level::DEBUG, "mailto:a@b.c").contains("Mime dispatch skipped"));
    }

    #[test]
    fn test_web_url_falls_through_to_scheme() {
        let mut dispatcher = dispatcher();
        let outcome = dispatcher.dispatch_by_url("https://example.com/", None).unwrap();
        assert_eq!(
            outcome,
            Outcome::Opened {
                url: "https://example.com/".to_string()
            }
        );
        assert_eq!(dispatcher.launcher().invocations().len(), 1);
    }

    #[test]
    fn test_unknown_scheme_and_action() {
        let mut dispatcher = dispatcher();
        assert_eq!(
            dispatcher.dispatch_by_url("gopher://x", None).unwrap_err().kind(),
            ErrorKind::NoSuchScheme
        );
        assert_eq!(
            dispatcher.dispatch_by_url("tel:123", None).unwrap_err().kind(),
            ErrorKind::UnknownAction
        );
    }

    #[test]
    fn test_dispatch_by_extension() {
        let mut dispatcher = dispatcher();
        dispatcher.dispatch_by_extension("doc.pdf", None).unwrap();
        assert_eq!(
            dispatcher.launcher().invocations(),
            vec![Invocation::Command("/usr/bin/evince 'doc.pdf'".to_string())]
        );

        let err = dispatcher.dispatch_by_extension("doc.PDF", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownExtension);
    }
}
