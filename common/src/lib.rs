//! Metamer Common Library
//!
//! CLIとWeb(WASM)で共有されるカタログ閲覧エンジン

pub mod types;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod table;
pub mod gamma;
pub mod magnifier;
pub mod explorer;
mod lenient;

pub use types::{CatalogEntry, Dimensions, Field, FieldValue, Position, Rect, SortDirection};
pub use catalog::{asset_url, metadata_url, Catalog};
pub use error::{Error, Result};
pub use filter::{FieldFilter, FilterOption, FilterState, RangeBound, RangeSelection};
pub use table::{paginate, Page, TableState, DEFAULT_PAGE_SIZE};
pub use gamma::{gamma_correct, GammaSettings, GammaState, GammaTable};
pub use magnifier::MagnifierState;
pub use explorer::Explorer;
