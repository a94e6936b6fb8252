//! The conversion orchestrator
//!
//! Dispatches a "have" quantity against a "want" specification: a unit
//! list (or alias of one), a function name, or a unit expression. The
//! result is a structured [`Outcome`]; presentation lives in `render`.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::factor::Ignore;
use crate::quantity::Quantity;
use crate::unitlist::{MixedResult, UnitList};

/// Output formatting mode. Affects presentation only, never the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verbosity {
    Terse,
    Normal,
    Verbose,
}

/// Conversion-request configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    pub verbosity: Verbosity,
    /// Print only the first line of two-line results.
    pub one_line: bool,
    /// Suppress the reciprocal-conversion fallback.
    pub strict: bool,
    /// Round the last unit-list element to an integer regardless of the
    /// list's own suffix.
    pub round_last: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            verbosity: Verbosity::Normal,
            one_line: false,
            strict: false,
            round_last: false,
        }
    }
}

/// The computed result of one conversion request.
#[derive(Debug)]
pub enum Outcome {
    /// Plain factor conversion: `have = value × want`.
    Factor {
        have: String,
        want: String,
        value: f64,
        inverse: f64,
        /// Set when the conversion was performed on the reciprocal of the
        /// source because the source itself was not conformable.
        reciprocal: bool,
    },
    /// Conversion to a function: the argument that produces the value.
    Function {
        have: String,
        name: String,
        argument: String,
    },
    /// Mixed-radix conversion over a unit list.
    Mixed {
        have: String,
        list: UnitList,
        result: MixedResult,
    },
}

/// Converts a source expression to a want-specification.
///
/// `have` is the evaluated source; it is reduced here, so callers may pass
/// a freshly parsed quantity.
pub fn convert(
    have_expr: &str,
    have: &Quantity,
    want: &str,
    catalog: &Catalog,
    options: &Options,
) -> Result<Outcome> {
    let have_expr = have_expr.trim();
    let want = want.trim();
    let mut have = have.clone();
    have.complete_reduce(catalog)?;

    if let Some(list_text) = UnitList::detect(catalog, want) {
        let list = UnitList::parse(&list_text, catalog, options.round_last)
            .map_err(|e| Error::InvalidUnitList(Box::new(e)))?;
        let result = list.convert(have_expr, &have)?;
        return Ok(Outcome::Mixed {
            have: have_expr.to_string(),
            list,
            result,
        });
    }

    if let Some(func) = catalog.function(want).cloned() {
        let mut argument = func.apply_inverse(have, catalog, 0)?;
        argument.complete_reduce(catalog)?;
        return Ok(Outcome::Function {
            have: have_expr.to_string(),
            name: want.to_string(),
            argument: argument.to_string(),
        });
    }

    let mut to = Quantity::parse(want, catalog)?;
    to.complete_reduce(catalog)?;

    if have.is_compatible_with(&to, Ignore::Dimensionless) {
        let value = have.factor / to.factor;
        return Ok(Outcome::Factor {
            have: have_expr.to_string(),
            want: want.to_string(),
            value,
            inverse: 1.0 / value,
            reciprocal: false,
        });
    }

    if !options.strict {
        let mut reciprocal = have.clone();
        reciprocal.invert();
        if reciprocal.is_compatible_with(&to, Ignore::Dimensionless) {
            let value = reciprocal.factor / to.factor;
            return Ok(Outcome::Factor {
                have: have_expr.to_string(),
                want: want.to_string(),
                value,
                inverse: 1.0 / value,
                reciprocal: true,
            });
        }
    }

    Err(Error::Conformability {
        left: format!("{} = {}", have_expr, have),
        right: format!("{} = {}", want, to),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::test_catalog;
    use crate::fmt::show_number;

    fn run(have: &str, want: &str, options: &Options) -> Result<Outcome> {
        let catalog = test_catalog();
        let value = Quantity::parse(have, &catalog)?;
        convert(have, &value, want, &catalog, options)
    }

    #[test]
    fn test_factor_conversion() {
        match run("2 liters", "quarts", &Options::default()).unwrap() {
            Outcome::Factor {
                value,
                inverse,
                reciprocal,
                ..
            } => {
                assert_eq!(show_number(value), "2.1133764");
                assert_eq!(show_number(inverse), "0.47317647");
                assert!(!reciprocal);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_reciprocal_detection() {
        // 8 liters per 100 km against miles per gallon is a reciprocal
        // conversion; both the value and the reciprocal ratio come back.
        match run("8 liter / 100 km", "mile/gallon", &Options::default()).unwrap() {
            Outcome::Factor {
                value, reciprocal, ..
            } => {
                assert!(reciprocal);
                assert_eq!(show_number(value), "29.401823");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_strict_suppresses_reciprocal() {
        let options = Options {
            strict: true,
            ..Options::default()
        };
        let err = run("8 liter / 100 km", "mile/gallon", &options).unwrap_err();
        assert!(matches!(err, Error::Conformability { .. }));
    }

    #[test]
    fn test_hz_to_seconds_is_reciprocal() {
        match run("Hz", "s", &Options::default()).unwrap() {
            Outcome::Factor {
                value, reciprocal, ..
            } => {
                assert!(reciprocal);
                assert_eq!(value, 1.0);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_function_want() {
        match run("300 K", "tempF", &Options::default()).unwrap() {
            Outcome::Function { name, argument, .. } => {
                assert_eq!(name, "tempF");
                assert_eq!(argument, "80.33");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_unit_list_want() {
        match run("2 m", "ft;in;1|8 in;;", &Options::default()).unwrap() {
            Outcome::Mixed { result, .. } => {
                assert_eq!(result.amounts, vec![6.0, 6.0, 6.0]);
                assert!(result.round_delta > 0.0);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_alias_want() {
        match run("2 m", "ftin", &Options::default()).unwrap() {
            Outcome::Mixed { list, .. } => assert_eq!(list.exprs(), ["ft", "in"]),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_conformability_error_names_both_sides() {
        let err = run("0.17 gallons", "tempF(20)", &Options::default()).unwrap_err();
        match err {
            Error::Conformability { left, right } => {
                assert!(left.contains("m^3"), "{}", left);
                assert!(right.contains("K"), "{}", right);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_bad_list_is_invalid_unit_list() {
        let err = run("2 m", "ft;;in", &Options::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidUnitList(_)), "{}", err);
    }
}
