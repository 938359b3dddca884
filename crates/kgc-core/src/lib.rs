//! Core of the KGC Toolkit: everything the desktop shell does that does not
//! need a web view.

pub mod assets;
pub mod config;
pub mod error;
pub mod explorer;
pub mod heroes;
pub mod layout;
pub mod logs;
pub mod project;
pub mod source;
pub mod toolkit;

pub use config::AppSettings;
pub use error::{CoreError, Result};
pub use explorer::FileExplorer;
pub use heroes::{Hero, HeroCatalog, HeroSkin};
pub use project::ProjectState;
pub use source::{AssetSource, LocalSource};
