//! Unit lists: mixed-radix decomposition of one quantity
//!
//! A semicolon-separated list of unit expressions (`ft;in;1|8 in`) expresses
//! one quantity as a sum of integer multiples of successively smaller
//! units. Trailing list syntax selects how the last element is rounded.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::factor::Ignore;
use crate::fmt::round_to_display;
use crate::quantity::Quantity;

/// Handling of the last list element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundMode {
    /// `;;` suffix (or the global round override): round to an integer.
    Integer,
    /// Default: round to the displayed precision.
    Precision,
    /// `;` suffix: split into an integer part and a fractional remainder.
    Split,
}

/// A parsed and reduced unit list, ready to convert values.
#[derive(Debug, Clone)]
pub struct UnitList {
    exprs: Vec<String>,
    values: Vec<Quantity>,
    pub round: RoundMode,
}

/// The numeric result of a mixed-radix conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixedResult {
    /// One amount per list element.
    pub amounts: Vec<f64>,
    /// Fractional remainder of the last element in [`RoundMode::Split`].
    pub fraction: Option<f64>,
    /// Positive when the last element was rounded up, negative when
    /// rounded down, zero when exact. Set in [`RoundMode::Integer`].
    pub round_delta: f64,
}

impl UnitList {
    /// Recognizes a want-specification as a unit list: either the name of
    /// a registered alias, or a string with a `;` past its first position.
    /// Returns the list text.
    pub fn detect(catalog: &Catalog, want: &str) -> Option<String> {
        if let Some(alias) = catalog.alias(want) {
            return Some(alias.list.clone());
        }
        if want.find(';').map(|i| i > 0).unwrap_or(false) {
            return Some(want.to_string());
        }
        None
    }

    /// Parses, evaluates, and reduces every element of a list, and checks
    /// that adjacent elements are conformable.
    pub fn parse(list: &str, catalog: &Catalog, round_override: bool) -> Result<UnitList> {
        let mut list = list.trim();
        let mut round = RoundMode::Precision;
        if let Some(stripped) = list.strip_suffix(";;") {
            round = RoundMode::Integer;
            list = stripped.trim_end();
        } else if let Some(stripped) = list.strip_suffix(';') {
            round = RoundMode::Split;
            list = stripped.trim_end();
        }
        if round_override {
            round = RoundMode::Integer;
        }

        let exprs: Vec<String> = list.split(';').map(|e| e.trim().to_string()).collect();

        let mut values = Vec::with_capacity(exprs.len());
        for (i, expr) in exprs.iter().enumerate() {
            if expr.is_empty() {
                return Err(Error::EmptyListElement(i + 1));
            }
            let mut v =
                Quantity::parse(expr, catalog).map_err(|e| e.in_list_element(i + 1))?;
            v.complete_reduce(catalog)
                .map_err(|e| e.in_list_element(i + 1))?;
            values.push(v);
        }

        // Each element must be commensurable with its neighbor, which
        // transitively gives the whole list one dimension.
        for i in 1..values.len() {
            if !values[i - 1].is_compatible_with(&values[i], Ignore::Dimensionless) {
                return Err(Error::Conformability {
                    left: format!("{} = {}", exprs[i - 1], values[i - 1]),
                    right: format!("{} = {}", exprs[i], values[i]),
                });
            }
        }

        Ok(UnitList {
            exprs,
            values,
            round,
        })
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn exprs(&self) -> &[String] {
        &self.exprs
    }

    /// The reduced value of the first element.
    pub fn first(&self) -> &Quantity {
        &self.values[0]
    }

    /// Decomposes a completely reduced quantity over this list.
    ///
    /// Every element but the last takes the integer quotient of the
    /// running remainder; the last element absorbs what is left and is
    /// rounded per the list's mode. A rounded value equal to one whole
    /// unit of the next-higher element carries over.
    pub fn convert(&self, from_expr: &str, from: &Quantity) -> Result<MixedResult> {
        if !from.is_compatible_with(&self.values[0], Ignore::Dimensionless) {
            return Err(Error::Conformability {
                left: format!("{} = {}", from_expr, from),
                right: format!("{} = {}", self.exprs[0], self.values[0]),
            });
        }

        let n = self.values.len();
        let mut amounts = vec![0.0; n];
        let mut rem = from.factor;
        for i in 0..n - 1 {
            amounts[i] = (rem / self.values[i].factor).floor();
            rem -= amounts[i] * self.values[i].factor;
        }
        amounts[n - 1] = rem / self.values[n - 1].factor;

        let mut round_delta = 0.0;
        let rounded = match self.round {
            RoundMode::Integer => {
                let r = (amounts[n - 1] + 0.5).floor();
                round_delta = r - amounts[n - 1];
                r
            }
            _ => round_to_display(amounts[n - 1]),
        };
        amounts[n - 1] = rounded;

        let mut fraction = None;
        if self.round == RoundMode::Split {
            amounts[n - 1] = rounded.floor();
            fraction = Some(rounded - amounts[n - 1]);
        }

        // Carry propagation, last element backward: "1 hr", never "60 min".
        for i in (1..n).rev() {
            let next_unit = round_to_display(self.values[i - 1].factor / self.values[i].factor);
            if amounts[i] == next_unit {
                amounts[i] = 0.0;
                amounts[i - 1] += 1.0;
            }
        }

        Ok(MixedResult {
            amounts,
            fraction,
            round_delta,
        })
    }
}
