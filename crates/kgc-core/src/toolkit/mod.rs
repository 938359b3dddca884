//! External tools: `apkeep` for downloads, AssetRipper for conversion.

pub mod apkeep;
pub mod asset_ripper;
pub mod convert;

pub use apkeep::{download_app, get_app_versions, parse_versions};
pub use asset_ripper::{check_asset_ripper, default_asset_ripper_path};
pub use convert::convert_package;
