//! Defined functions: closed-form and tabular conversions
//!
//! A computed function holds a forward and (usually) an inverse definition
//! as expression text, evaluated with the parameter bound to the argument.
//! A tabular function interpolates linearly between sample pairs; its
//! inverse swaps the sample arrays, which is why monotonicity is checked
//! when the table is registered.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::factor::Ignore;
use crate::fmt::show_number;
use crate::location::{Diagnostic, Location};
use crate::parse;
use crate::quantity::{Quantity, MAX_EVAL_DEPTH};

/// One half (forward or inverse) of a computed function definition.
#[derive(Debug, Clone)]
pub struct FuncPart {
    /// Parameter name; the inverse uses the function's own name.
    pub param: String,
    /// Definition expression; `None` when no inverse was declared.
    pub body: Option<String>,
    /// Required argument dimension, if declared.
    pub dim: Option<String>,
}

#[derive(Debug, Clone)]
pub enum FunctionKind {
    Computed {
        forward: FuncPart,
        inverse: FuncPart,
    },
    Tabular {
        result_unit: String,
        points: Vec<(f64, f64)>,
        /// Cleared at registration for single-point or non-monotonic
        /// tables; such tables refuse to compute an inverse.
        invertible: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub location: Location,
    pub kind: FunctionKind,
}

impl Function {
    /// Applies the function to a value.
    pub fn apply(&self, arg: Quantity, catalog: &Catalog, depth: usize) -> Result<Quantity> {
        match &self.kind {
            FunctionKind::Computed { forward, .. } => {
                self.apply_part(forward, arg, "", catalog, depth)
            }
            FunctionKind::Tabular {
                result_unit,
                points,
                ..
            } => {
                let mut arg = arg;
                arg.complete_reduce_depth(catalog, depth)?;
                if !arg.is_number() {
                    return Err(Error::ArgumentNotNumber {
                        func: self.name.clone(),
                        arg: arg.to_string(),
                    });
                }
                let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
                let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
                let y = self.interpolate(arg.factor, &xs, &ys, &arg.to_string(), "")?;
                let mut result = self.result_unit_value(result_unit, catalog, depth)?;
                result.factor *= y;
                Ok(result)
            }
        }
    }

    /// Applies the function's inverse to a value.
    pub fn apply_inverse(
        &self,
        arg: Quantity,
        catalog: &Catalog,
        depth: usize,
    ) -> Result<Quantity> {
        match &self.kind {
            FunctionKind::Computed { inverse, .. } => {
                self.apply_part(inverse, arg, "~", catalog, depth)
            }
            FunctionKind::Tabular {
                result_unit,
                points,
                invertible,
            } => {
                if !invertible {
                    return Err(Error::NoInverse(self.name.clone()));
                }
                let dim = self.result_unit_value(result_unit, catalog, depth)?;
                // Express the argument as a multiple of the result unit.
                let mut n = arg.clone();
                n.div(&dim);
                n.complete_reduce_depth(catalog, depth)?;
                if !n.is_number() {
                    return Err(Error::ArgumentDimension {
                        func: format!("~{}", self.name),
                        arg: arg.to_string(),
                        dim: result_unit.clone(),
                    });
                }
                let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
                let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
                let x = self.interpolate(n.factor, &ys, &xs, &arg.to_string(), "~")?;
                Ok(Quantity::number(x))
            }
        }
    }

    fn apply_part(
        &self,
        part: &FuncPart,
        mut arg: Quantity,
        inv_mark: &str,
        catalog: &Catalog,
        depth: usize,
    ) -> Result<Quantity> {
        if depth > MAX_EVAL_DEPTH {
            return Err(Error::RecursionLimit(self.name.clone()));
        }
        arg.complete_reduce_depth(catalog, depth)?;
        if let Some(dim) = &part.dim {
            let mut required = parse::parse_with(dim, catalog, None, depth + 1)
                .map_err(|e| self.wrap(inv_mark, e))?;
            required.complete_reduce_depth(catalog, depth)?;
            if !required.is_compatible_with(&arg, Ignore::None) {
                return Err(Error::ArgumentDimension {
                    func: format!("{}{}", inv_mark, self.name),
                    arg: arg.to_string(),
                    dim: required.to_string(),
                });
            }
        }
        let body = match &part.body {
            Some(b) => b,
            None => return Err(Error::NoInverse(self.name.clone())),
        };
        parse::parse_with(body, catalog, Some((&part.param, &arg)), depth + 1)
            .map_err(|e| self.wrap(inv_mark, e))
    }

    fn result_unit_value(
        &self,
        result_unit: &str,
        catalog: &Catalog,
        depth: usize,
    ) -> Result<Quantity> {
        parse::parse_with(result_unit, catalog, None, depth + 1).map_err(|e| self.wrap("", e))
    }

    fn wrap(&self, inv_mark: &str, e: Error) -> Error {
        Error::FunctionApplication {
            func: format!("{}{}", inv_mark, self.name),
            source: Box::new(e),
        }
    }

    /// Linear interpolation over bracketing sample intervals. An argument
    /// outside the sample range is a domain error, not extrapolation.
    fn interpolate(
        &self,
        inval: f64,
        input: &[f64],
        output: &[f64],
        arg: &str,
        inv_mark: &str,
    ) -> Result<f64> {
        for i in 0..input.len().saturating_sub(1) {
            let (a, b) = (input[i], input[i + 1]);
            if (a <= inval && inval <= b) || (a >= inval && inval >= b) {
                return Ok(output[i] + (inval - a) * (output[i + 1] - output[i]) / (b - a));
            }
        }
        Err(Error::OutsideDomain {
            func: format!("{}{}", inv_mark, self.name),
            arg: arg.to_string(),
        })
    }

    /// Formatted definition, shown for `name` queries.
    pub fn show_def(&self) -> String {
        match &self.kind {
            FunctionKind::Computed { forward, .. } => format!(
                "{}({}) = {}",
                self.name,
                forward.param,
                forward.body.as_deref().unwrap_or("")
            ),
            FunctionKind::Tabular {
                result_unit,
                points,
                ..
            } => {
                let sep = if result_unit.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
                    " * "
                } else {
                    " "
                };
                let mut s = String::from("Interpolated table with points:");
                for (x, y) in points {
                    s.push_str(&format!(
                        "\n {}({}) = {}{}{}",
                        self.name,
                        show_number(*x),
                        show_number(*y),
                        sep,
                        result_unit
                    ));
                }
                s
            }
        }
    }

    /// Whether the function's result conforms to `v`: the dimension of the
    /// result is the dimension of the inverse's argument.
    pub fn conforms_to(&self, v: &Quantity, catalog: &Catalog) -> bool {
        let dim_expr = match &self.kind {
            FunctionKind::Computed { inverse, .. } => match &inverse.dim {
                Some(d) => d.as_str(),
                None => return false,
            },
            FunctionKind::Tabular { result_unit, .. } => result_unit.as_str(),
        };
        let mut value = match Quantity::parse(dim_expr, catalog) {
            Ok(q) => q,
            Err(_) => return false,
        };
        if value.complete_reduce(catalog).is_err() {
            return false;
        }
        value.is_compatible_with(v, Ignore::Dimensionless)
    }

    /// Build-time well-formedness check. Evaluates the forward function at
    /// an arbitrary sample point and asserts the inverse round-trips within
    /// a relative 1e-12; failing that is a warning, not an error, since the
    /// sample may fall outside the function's domain.
    pub(crate) fn check(&self, catalog: &Catalog) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        let note = |diags: &mut Vec<Diagnostic>, msg: String| {
            diags.push(Diagnostic::new(self.location.clone(), msg));
        };

        match &self.kind {
            FunctionKind::Computed { forward, inverse } => {
                if let Some(dim) = &inverse.dim {
                    if let Err(e) = Quantity::parse(dim, catalog) {
                        note(
                            &mut diags,
                            format!(
                                "Dimension '{}' specified for argument of '~{}' is invalid. {}.",
                                dim, self.name, e
                            ),
                        );
                    }
                }

                let mut sample = Quantity::one();
                if let Some(dim) = &forward.dim {
                    let mut parsed = match Quantity::parse(dim, catalog) {
                        Ok(q) => q,
                        Err(e) => {
                            note(
                                &mut diags,
                                format!(
                                    "Dimension '{}' specified for argument of '{}' is invalid. {}.",
                                    dim, self.name, e
                                ),
                            );
                            return diags;
                        }
                    };
                    if parsed.complete_reduce(catalog).is_err() {
                        note(
                            &mut diags,
                            format!(
                                "Dimension '{}' specified for argument of '{}' is invalid.",
                                dim, self.name
                            ),
                        );
                        return diags;
                    }
                    sample = parsed;
                }

                if inverse.body.is_none() {
                    note(
                        &mut diags,
                        format!("Warning: no inverse for function '{}'.", self.name),
                    );
                    return diags;
                }

                sample.factor *= 7.0;
                let saved = sample.clone();
                let forward_value = match self.apply(sample, catalog, 0) {
                    Ok(v) => v,
                    Err(_) => {
                        note(
                            &mut diags,
                            format!("Warning: inverse was not checked for '{}'.", self.name),
                        );
                        return diags;
                    }
                };
                match self.apply_inverse(forward_value, catalog, 0) {
                    Ok(mut back) => {
                        back.div(&saved);
                        let round_trip = back
                            .complete_reduce(catalog)
                            .map(|_| back.is_number() && (back.factor - 1.0).abs() <= 1e-12)
                            .unwrap_or(false);
                        if !round_trip {
                            note(
                                &mut diags,
                                format!(
                                    "Inverse is not the inverse for function '{}'.",
                                    self.name
                                ),
                            );
                        }
                    }
                    Err(_) => {
                        note(
                            &mut diags,
                            format!(
                                "Error in '~{}({})' defined as '{}'.",
                                self.name,
                                inverse.param,
                                inverse.body.as_deref().unwrap_or("")
                            ),
                        );
                    }
                }
            }
            FunctionKind::Tabular { result_unit, .. } => {
                if let Err(e) = Quantity::parse(result_unit, catalog) {
                    note(
                        &mut diags,
                        format!(
                            "Invalid result unit, '{}', of '{}'. {}.",
                            result_unit, self.name, e
                        ),
                    );
                }
            }
        }
        diags
    }
}
