//! Loading of game catalogs and declarative plan files.
//!
//! - [`catalog::load_catalog`] reads a game data export (JSON, or the same
//!   shape in RON / TOML) into a [`GameData`].
//! - [`plan::load_plan`] reads a plan file naming demands, pickers and
//!   inline directives, and resolves every name against a catalog.

pub mod catalog;
pub mod loader;
pub mod plan;
pub mod schema;

pub use catalog::load_catalog;
pub use factorial_planner::catalog::GameData;
pub use loader::DataLoadError;
pub use plan::load_plan;
