//! Browser handler registry model
//!
//! `handlers.json` maps mime types and url schemes to handler sets. Each set
//! carries an action and an ordered list of handlers, the first being the
//! default.
//!
//! ## Key Components
//!
//! - [`Handler`] - One target: a local executable or a web service uri template
//! - [`HandlerSet`] - Handlers sharing an [`Action`] plus extension metadata
//! - [`Registry`] - Lazily loaded mime type and scheme tables of a profile
//! - [`Dispatcher`] - Resolves a url, mime type or file path and invokes it
//! - [`Launcher`] - Seam for the process and browser side effects
//!
//! ## Example
//!
//! ```rust,ignore
//! use fxhandlers::handlers::{Dispatcher, Registry};
//! use fxhandlers::launcher::SystemLauncher;
//!
//! let registry = Registry::with_file("handlers.json");
//! let mut dispatcher = Dispatcher::new(registry, SystemLauncher::default());
//! dispatcher.dispatch_by_url("mailto:someone@example.com", None)?;
//! ```

mod dispatch;
mod handler;
mod registry;
mod set;
mod table;
mod traits;
mod types;

pub use dispatch::{Dispatcher, scheme_of};
pub use handler::{Handler, HandlerTarget, URL_MARKER, quote_plus, shell_quote};
pub use registry::{Registry, RegistryDocument};
pub use set::{Action, HandlerSet};
pub use table::HandlerTable;
pub use traits::{Launcher, ProcessOutput};
pub use types::Outcome;
