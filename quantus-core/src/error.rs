//! Errors raised while parsing, reducing, and converting quantities
//!
//! A failed conversion request never crashes the process: every failure is a
//! value that propagates to the request boundary and is rendered there.
//! Catalog build-time problems are not errors at all; they are [`Diagnostic`]s
//! attached to the offending entity (see the `catalog` module).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for a single evaluation or conversion request.
///
/// The variants group into name errors, syntax errors, conformability
/// errors, domain errors, definition errors, and unit-list structure errors.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The input did not match the expression grammar.
    #[error("after '{after}': expected {expected}")]
    Syntax { after: String, expected: String },

    /// An identifier resolved to no unit, prefix, or prefixed unit.
    #[error("'{0}' is not the name of a unit, prefix, or function")]
    UnknownName(String),

    /// A call syntax `name(...)` used a name that is not a function.
    #[error("'{0}' is not a function")]
    NotAFunction(String),

    /// `~name(...)` on a function without a usable inverse.
    #[error("function '{0}' has no inverse")]
    NoInverse(String),

    /// Two quantities were required to share a dimension and do not.
    /// Both sides carry their reduced textual form.
    #[error("conformability error:\n\t{left}\n\t{right}")]
    Conformability { left: String, right: String },

    /// Addition or subtraction of quantities with different dimensions.
    #[error("sum of non-conformable values:\n\t{left}\n\t{right}")]
    NonConformableSum { left: String, right: String },

    /// A function argument failed its declared dimension check.
    #[error("argument {arg} of function '{func}' is not conformable to {dim}")]
    ArgumentDimension {
        func: String,
        arg: String,
        dim: String,
    },

    /// A function required a pure number and got a dimensioned quantity.
    #[error("argument {arg} of '{func}' is not a number")]
    ArgumentNotNumber { func: String, arg: String },

    /// A tabular function argument fell outside the sample range.
    #[error("argument {arg} is outside the domain of '{func}'")]
    OutsideDomain { func: String, arg: String },

    /// The right operand of `^` did not reduce to a number.
    #[error("exponent {0} is not a number")]
    ExponentNotNumber(String),

    /// A non-integral exponent that is not a simple fraction.
    #[error("exponent {0} must be an integer or a simple fraction")]
    BadExponent(String),

    /// Root extraction from a product that is not a perfect power.
    #[error("{what} is not a {n}-th power")]
    NotARoot { what: String, n: u32 },

    /// Reduction did not reach primitive factors within the pass bound:
    /// the definition chain is circular or self-referential.
    #[error("definition of '{0}' does not reduce to primitive units (possible definition cycle)")]
    Unreducible(String),

    /// Expression evaluation nested too deeply (a definition cycle routed
    /// through function application).
    #[error("evaluation of '{0}' is nested too deeply (possible definition cycle)")]
    RecursionLimit(String),

    /// A unit list contained an empty element.
    #[error("element {0} is empty")]
    EmptyListElement(usize),

    /// A unit list element failed to evaluate.
    #[error("element {index} is not valid. {source}")]
    ListElement {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// A want-specification was recognized as a unit list but the list
    /// itself is unusable.
    #[error("invalid unit list. {0}")]
    InvalidUnitList(#[source] Box<Error>),

    /// A function body or declared dimension failed to evaluate.
    #[error("invalid application of function '{func}'. {source}")]
    FunctionApplication {
        func: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps this error as the cause of a failed unit-list element.
    pub(crate) fn in_list_element(self, index: usize) -> Error {
        Error::ListElement {
            index,
            source: Box::new(self),
        }
    }
}
