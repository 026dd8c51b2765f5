pub mod assets;
pub mod attributes;
pub mod context;
pub mod directory;
pub mod geojson;
pub mod list;
pub mod logo;
pub mod map;
pub mod query;
pub mod registry;

pub use crate::domain::model::{CategoryTerm, DirectoryEntry, RawAttributes, SiteDetails, SiteId};
pub use crate::domain::ports::{ConfigProvider, DirectoryStore};
pub use crate::utils::error::Result;

/// The shortcode tag handled by this crate.
pub const SHORTCODE_TAG: &str = "site-directory";
