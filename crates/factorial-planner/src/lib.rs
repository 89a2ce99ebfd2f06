//! Factorial Planner -- optimal steady-state production plans.
//!
//! Given a game catalog and a [`config::PlanConfig`] stating demanded
//! rates, this crate finds every recipe that can contribute, chooses
//! machines and modules for each, solves the material balance exactly with
//! the Simplex from `factorial-rational`, and nests intermediate recipes
//! under their consumers for display.
//!
//! # Pipeline
//!
//! 1. **Resolve** -- worklist walk from the demanded items, assembler and
//!    module selection, compilation to a linear program.
//! 2. **Solve** -- two-phase Simplex over exact rationals.
//! 3. **Interpret** -- one [`production::Production`] per used recipe, with
//!    machine counts.
//! 4. **Group** -- inline directives nest productions into a forest of
//!    [`grouping::ProductionGroup`]s.
//!
//! ```rust,ignore
//! let mut config = PlanConfig::builder();
//! config
//!     .demand(data.find_item("electronic-circuit")?, 1, TimeUnit::Second)
//!     .given_resources(&data)
//!     .minimize(Objective::ResourceUsage);
//! let plan = plan(&data, &config.build())?;
//! ```
//!
//! # Key Types
//!
//! - [`catalog::GameData`] -- immutable catalog of items, recipes,
//!   assemblers, modules, resources and miners.
//! - [`effect::Effect`] / [`effect::ModuleLayout`] -- module effects.
//! - [`resolver::Resolver`] -- graph walk and program compilation.
//! - [`plan::Plan`] -- flat productions, grouped forest and score.

pub mod catalog;
pub mod config;
pub mod effect;
pub mod error;
pub mod grouping;
pub mod id;
pub mod plan;
pub mod production;
pub mod resolver;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::PlanError;
pub use plan::{plan, Plan};
