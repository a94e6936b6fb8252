//! Quantus definitions-file loader
//!
//! Reads the line-oriented units database format and feeds a
//! [`CatalogBuilder`]. The format: one definition per line, backslash
//! line continuation, `#` end-of-line comments, and statement forms
//!
//! ```text
//! name      definition        # unit
//! name-     definition        # prefix
//! name(x)   [dim;dim] def ; invdef
//! name[unit] x1 y1, x2 y2, ...
//! !unitlist name list
//! !include  file
//! !locale name ... !endlocale
//! ```
//!
//! Problems never abort a load; each bad line becomes a diagnostic on the
//! builder and the rest of the file is still read.

mod loader;

pub use loader::{Loader, MAX_INCLUDE_DEPTH};
