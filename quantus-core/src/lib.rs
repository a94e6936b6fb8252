//! Quantus core - unit algebra and conversion engine
//!
//! This crate provides the dimensional machinery behind the `quantus`
//! converter:
//! - `Product` / `Quantity`: the dimensional-vector representation and
//!   its arithmetic, parsing, and reduction to primitive factors
//! - `Catalog`: the four entity tables (units, prefixes, functions,
//!   unit-list aliases), built once and read-only afterward
//! - `Function`: closed-form and tabular conversions with inverses
//! - `UnitList`: mixed-radix decomposition with rounding and carry
//! - `convert` / `render`: the request orchestrator and its text output
//!
//! The definitions-file loader lives in `quantus-files`; the interactive
//! front end in `quantus-cli`.

mod builtins;
mod catalog;
mod convert;
mod error;
mod factor;
mod fmt;
mod function;
mod location;
mod parse;
mod product;
mod quantity;
mod render;
mod unitlist;

pub use catalog::{check_name, Alias, Catalog, CatalogBuilder, Entity, Resolution};
pub use convert::{convert, Options, Outcome, Verbosity};
pub use error::{Error, Result};
pub use fmt::{round_to_display, show_number, DISPLAY_DIGITS};
pub use factor::{Factor, FactorKind, Ignore};
pub use function::{FuncPart, Function, FunctionKind};
pub use location::{Diagnostic, Location};
pub use product::Product;
pub use quantity::Quantity;
pub use render::render;
pub use unitlist::{MixedResult, RoundMode, UnitList};
