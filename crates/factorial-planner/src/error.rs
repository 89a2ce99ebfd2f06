use crate::catalog::CatalogError;
use factorial_rational::{ProgramError, Rational, RationalError, SimplexError};

/// Errors raised while resolving, solving or grouping a plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Simplex(#[from] SimplexError),
    #[error(transparent)]
    Rational(#[from] RationalError),
    #[error("couldn't find assembler for recipe '{recipe}'")]
    NoAssembler { recipe: String },
    #[error("assembler '{assembler}' cannot craft recipe '{recipe}' of category '{category}'")]
    AssemblerNotAllowed {
        assembler: String,
        recipe: String,
        category: String,
    },
    #[error("module '{module}' is not allowed on recipe '{recipe}'")]
    ModuleNotAllowed { module: String, recipe: String },
    #[error("assembler '{assembler}' does not allow effect '{effect}' (recipe '{recipe}')")]
    EffectNotAllowed {
        effect: String,
        assembler: String,
        recipe: String,
    },
    #[error("assembler '{assembler}' has {slots} module slots but {count} modules were placed")]
    TooManyModules {
        assembler: String,
        slots: u32,
        count: u64,
    },
    #[error("recipe '{recipe}' runs at non-positive speed {speed} on '{assembler}'")]
    NonPositiveSpeed {
        recipe: String,
        assembler: String,
        speed: Rational,
    },
    #[error("cannot inline '{item}' into recipe '{recipe}', which does not consume it")]
    InvalidInlineTarget { item: String, recipe: String },
    #[error("cannot inline '{item}': its producer '{recipe}' has {products} products")]
    InlineMultipleProducts {
        item: String,
        recipe: String,
        products: usize,
    },
    #[error("cannot inline '{item}': consumed by several recipes {consumers:?}")]
    InlineAmbiguousConsumer { item: String, consumers: Vec<String> },
}
