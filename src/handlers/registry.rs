use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::set::HandlerSet;
use super::table::{HandlerTable, OrderedEntries};
use crate::error::{Error, Result};
use crate::profile::ProfileLocator;

const MIME_TYPES: &str = "mimeTypes";
const SCHEMES: &str = "schemes";

/// Parsed contents of a `handlers.json` document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryDocument {
    /// Opaque format version, written back unchanged
    pub version: Option<Value>,
    pub mime_types: HandlerTable,
    pub schemes: HandlerTable,
    /// Top-level keys this crate does not interpret
    pub extra: Map<String, Value>,
}

impl Default for RegistryDocument {
    fn default() -> Self {
        Self {
            version: None,
            mime_types: HandlerTable::new(MIME_TYPES),
            schemes: HandlerTable::new(SCHEMES),
            extra: Map::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentIn {
    #[serde(default)]
    default_handlers_version: Option<Value>,
    #[serde(default)]
    mime_types: OrderedEntries<HandlerSet>,
    #[serde(default)]
    schemes: OrderedEntries<HandlerSet>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    default_handlers_version: Option<&'a Value>,
    mime_types: &'a HandlerTable,
    schemes: &'a HandlerTable,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

impl RegistryDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: DocumentIn = serde_json::from_slice(bytes)?;
        Ok(Self {
            version: raw.default_handlers_version,
            mime_types: HandlerTable::from_entries(MIME_TYPES, raw.mime_types)?,
            schemes: HandlerTable::from_entries(SCHEMES, raw.schemes)?,
            extra: raw.extra,
        })
    }

    fn as_out(&self) -> DocumentOut<'_> {
        DocumentOut {
            default_handlers_version: self.version.as_ref(),
            mime_types: &self.mime_types,
            schemes: &self.schemes,
            extra: &self.extra,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.as_out())?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.as_out())?)
    }

    /// Extension → mime type, later mime types overriding earlier ones
    pub fn extension_index(&self) -> BTreeMap<String, String> {
        let mut index = BTreeMap::new();
        for (mime, set) in self.mime_types.iter() {
            for extension in &set.extensions {
                index.insert(extension.clone(), mime.to_string());
            }
        }
        index
    }
}

impl fmt::Display for RegistryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MimeTypes:")?;
        for (mime, set) in self.mime_types.iter() {
            writeln!(f, "  {}", mime)?;
            writeln!(f, "{}", set.render("    "))?;
        }
        write!(f, "URL protocols:")?;
        for (scheme, set) in self.schemes.iter() {
            write!(f, "\n  {}\n{}", scheme, set.render("    "))?;
        }
        Ok(())
    }
}

/// The handler registry of one browser profile.
///
/// Contents are read from disk on first use and cached until the identity
/// (OS user, profile id, explicit file) changes or a new document is loaded.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    locator: ProfileLocator,
    os_user: Option<String>,
    profile_id: Option<String>,
    filename: Option<PathBuf>,
    document: Option<RegistryDocument>,
    ext_index: Option<BTreeMap<String, String>>,
}

impl Registry {
    /// Registry backed by profile discovery
    pub fn new(locator: ProfileLocator) -> Self {
        Self {
            locator,
            ..Self::default()
        }
    }

    /// Registry backed by an explicit file
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            filename: Some(path.into()),
            ..Self::default()
        }
    }

    /// Loaded, empty registry
    pub fn empty() -> Self {
        Self {
            document: Some(RegistryDocument::default()),
            ..Self::default()
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut registry = Self::default();
        registry.load(bytes)?;
        Ok(registry)
    }

    pub fn os_user(&self) -> Option<&str> {
        self.os_user.as_deref()
    }

    pub fn set_os_user(&mut self, os_user: Option<String>) {
        self.os_user = os_user;
        self.invalidate();
    }

    pub fn profile_id(&self) -> Option<&str> {
        self.profile_id.as_deref()
    }

    pub fn set_profile_id(&mut self, profile_id: Option<String>) {
        self.profile_id = profile_id;
        self.invalidate();
    }

    /// File the registry was or will be read from, when known
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: Option<PathBuf>) {
        self.invalidate();
        self.filename = filename;
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// Drop cached state; the next access reloads from disk
    pub fn invalidate(&mut self) {
        self.filename = None;
        self.document = None;
        self.ext_index = None;
    }

    /// Replace the whole registry with a parsed document
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        let document = RegistryDocument::from_slice(bytes)?;
        tracing::debug!(
            mime_types = document.mime_types.len(),
            schemes = document.schemes.len(),
            "Registry loaded"
        );
        self.document = Some(document);
        self.ext_index = None;
        Ok(())
    }

    pub fn load_file(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let bytes = std::fs::read(&path).map_err(|source| Error::io(&path, source))?;
        self.filename = Some(path);
        self.load(&bytes)
    }

    /// Read the backing file, resolving it through profile discovery if needed
    pub fn reload(&mut self) -> Result<()> {
        let path = self.resolve_filename()?;
        self.load_file(path)
    }

    fn resolve_filename(&mut self) -> Result<PathBuf> {
        if let Some(path) = &self.filename {
            return Ok(path.clone());
        }
        let path = self
            .locator
            .registry_path(self.os_user.as_deref(), self.profile_id.as_deref())?;
        tracing::info!(path = %path.display(), "Loading browser profile");
        self.filename = Some(path.clone());
        Ok(path)
    }

    pub fn ensure_loaded(&mut self) -> Result<&RegistryDocument> {
        if self.document.is_none() {
            self.reload()?;
        }
        Ok(self.document.get_or_insert_with(RegistryDocument::default))
    }

    pub fn document(&mut self) -> Result<&RegistryDocument> {
        self.ensure_loaded()
    }

    pub fn version(&mut self) -> Result<Option<&Value>> {
        Ok(self.ensure_loaded()?.version.as_ref())
    }

    pub fn mime_type_handlers(&mut self) -> Result<&HandlerTable> {
        Ok(&self.ensure_loaded()?.mime_types)
    }

    pub fn url_protocol_handlers(&mut self) -> Result<&HandlerTable> {
        Ok(&self.ensure_loaded()?.schemes)
    }

    pub fn lookup_by_mime(&mut self, mime: &str) -> Result<&HandlerSet> {
        tracing::debug!(mime, "Looking up mime type");
        self.mime_type_handlers()?
            .get(mime)
            .ok_or_else(|| Error::NoSuchMimeType(mime.to_string()))
    }

    pub fn lookup_by_scheme(&mut self, scheme: &str) -> Result<&HandlerSet> {
        tracing::debug!(scheme, "Looking up url scheme");
        self.url_protocol_handlers()?
            .get(scheme)
            .ok_or_else(|| Error::NoSuchScheme(scheme.to_string()))
    }

    /// The derived extension → mime type index
    pub fn ext_to_mime_table(&mut self) -> Result<&BTreeMap<String, String>> {
        if self.document.is_none() {
            self.reload()?;
        }
        let Self {
            document,
            ext_index,
            ..
        } = self;
        let document = document.get_or_insert_with(RegistryDocument::default);
        Ok(ext_index.get_or_insert_with(|| document.extension_index()))
    }

    /// Mime type registered for the extension of `path`.
    ///
    /// The extension is whatever follows the last `.`; matching is case sensitive.
    pub fn extension_to_mime(&mut self, path: &str) -> Result<Option<String>> {
        let extension = path.rsplit('.').next().unwrap_or(path);
        Ok(self.ext_to_mime_table()?.get(extension).cloned())
    }

    pub fn to_json(&mut self) -> Result<String> {
        self.ensure_loaded()?.to_json()
    }

    pub fn to_json_pretty(&mut self) -> Result<String> {
        self.ensure_loaded()?.to_json_pretty()
    }

    /// Write the document back to the file it came from.
    ///
    /// A document that was never read from or bound to a file has nowhere to
    /// go; profile discovery is not consulted.
    pub fn save(&mut self) -> Result<PathBuf> {
        let json = self.to_json_pretty()?;
        let path = self.filename.clone().ok_or(Error::NoBackingFile)?;
        std::fs::write(&path, json).map_err(|source| Error::io(&path, source))?;
        tracing::info!(path = %path.display(), "Registry saved");
        Ok(path)
    }
}
