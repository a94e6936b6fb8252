//! Built-in mathematical functions
//!
//! Available in any expression without being defined in the units database.
//! All of them require pure-number arguments except `sqrt` and `cuberoot`,
//! which accept any quantity whose products are perfect powers.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::factor::Ignore;
use crate::quantity::Quantity;

const NAMES: &[&str] = &[
    "sqrt", "cuberoot", "sin", "cos", "tan", "asin", "acos", "atan", "ln", "log", "log2", "exp",
];

pub(crate) fn is_builtin(name: &str) -> bool {
    NAMES.contains(&name)
}

pub(crate) fn apply(
    name: &str,
    mut arg: Quantity,
    catalog: &Catalog,
    depth: usize,
) -> Result<Quantity> {
    arg.complete_reduce_depth(catalog, depth)?;
    match name {
        "sqrt" => {
            arg.root(2)?;
            return Ok(arg);
        }
        "cuberoot" => {
            arg.root(3)?;
            return Ok(arg);
        }
        _ => {}
    }
    // Dimensionless factors (angles) count as pure numbers here, so that
    // e.g. tan(arcsec) works.
    if !arg.is_compatible_with(&Quantity::one(), Ignore::Dimensionless) {
        return Err(Error::ArgumentNotNumber {
            func: name.to_string(),
            arg: arg.to_string(),
        });
    }
    let x = arg.factor;
    let y = match name {
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "asin" => x.asin(),
        "acos" => x.acos(),
        "atan" => x.atan(),
        "ln" => x.ln(),
        "log" => x.log10(),
        "log2" => x.log2(),
        "exp" => x.exp(),
        _ => unreachable!("is_builtin gates the names"),
    };
    Ok(Quantity::number(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::test_catalog;

    #[test]
    fn test_pure_number_functions() {
        let catalog = test_catalog();
        let y = apply("log2", Quantity::number(8.0), &catalog, 0).unwrap();
        assert_eq!(y.factor, 3.0);
        let y = apply("exp", Quantity::number(0.0), &catalog, 0).unwrap();
        assert_eq!(y.factor, 1.0);
    }

    #[test]
    fn test_roots_take_quantities() {
        let catalog = test_catalog();
        let arg = Quantity::parse("27 m^3", &catalog).unwrap();
        let y = apply("cuberoot", arg, &catalog, 0).unwrap();
        assert_eq!(y.to_string(), "3 m");
    }

    #[test]
    fn test_trig_rejects_quantities() {
        let catalog = test_catalog();
        let arg = Quantity::parse("2 m", &catalog).unwrap();
        let err = apply("sin", arg, &catalog, 0).unwrap_err();
        assert!(matches!(err, Error::ArgumentNotNumber { .. }));
    }
}
