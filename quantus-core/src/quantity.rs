//! Quantities: a numeric factor times a product of units
//!
//! A freshly parsed quantity may reference non-primitive factors; complete
//! reduction rewrites it until only primitive factors remain. Negative
//! powers live in a separate denominator product, so the reciprocal of a
//! quantity is a product swap.

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::factor::{Factor, Ignore};
use crate::fmt::show_number;
use crate::parse;
use crate::product::Product;

/// Bound on reduction rewrite passes. A definition chain deeper than this
/// is reported as a definition cycle.
const MAX_REDUCE_PASSES: usize = 64;

/// Bound on the factor count a reduction may produce. Guards against
/// self-amplifying definitions like `foo = foo foo`.
const MAX_PRODUCT_FACTORS: usize = 512;

/// Bound on nested evaluation (function bodies, definition expansion).
pub(crate) const MAX_EVAL_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct Quantity {
    pub factor: f64,
    num: Product,
    den: Product,
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::one()
    }
}

impl Quantity {
    /// The dimensionless number 1.
    pub fn one() -> Self {
        Quantity {
            factor: 1.0,
            num: Product::new(),
            den: Product::new(),
        }
    }

    /// A pure number.
    pub fn number(d: f64) -> Self {
        Quantity {
            factor: d,
            num: Product::new(),
            den: Product::new(),
        }
    }

    /// The quantity 1 × `factor`.
    pub fn from_factor(f: Arc<Factor>) -> Self {
        let mut q = Quantity::one();
        q.num.push(f);
        q
    }

    /// Parses and evaluates an expression against a catalog.
    pub fn parse(expr: &str, catalog: &Catalog) -> Result<Quantity> {
        parse::parse_with(expr, catalog, None, 0)
    }

    pub fn numerator(&self) -> &Product {
        &self.num
    }

    pub fn denominator(&self) -> &Product {
        &self.den
    }

    /// True when both products are empty.
    pub fn is_number(&self) -> bool {
        self.num.is_empty() && self.den.is_empty()
    }

    pub(crate) fn push_factor(&mut self, f: Arc<Factor>) {
        self.num.push(f);
    }

    /// Multiplies this quantity by another.
    pub fn mul(&mut self, other: &Quantity) {
        self.factor *= other.factor;
        self.num.extend_from(&other.num);
        self.den.extend_from(&other.den);
    }

    /// Divides this quantity by another.
    pub fn div(&mut self, other: &Quantity) {
        self.factor /= other.factor;
        self.num.extend_from(&other.den);
        self.den.extend_from(&other.num);
    }

    /// Replaces this quantity by its reciprocal.
    pub fn invert(&mut self) {
        mem::swap(&mut self.num, &mut self.den);
        self.factor = 1.0 / self.factor;
    }

    /// Raises this quantity to an integral power.
    pub fn pow(&mut self, e: i32) {
        if e < 0 {
            self.invert();
            self.pow(-e);
            return;
        }
        self.factor = self.factor.powi(e);
        if e == 0 {
            self.num = Product::new();
            self.den = Product::new();
            return;
        }
        let num = self.num.clone();
        let den = self.den.clone();
        for _ in 1..e {
            self.num.extend_from(&num);
            self.den.extend_from(&den);
        }
    }

    /// Replaces this quantity by its n-th root. Both products must be
    /// perfect n-th powers.
    pub fn root(&mut self, n: u32) -> Result<()> {
        let what = self.to_string();
        let num = self
            .num
            .root(n)
            .ok_or_else(|| Error::NotARoot { what: what.clone(), n })?;
        let den = self
            .den
            .root(n)
            .ok_or_else(|| Error::NotARoot { what: what.clone(), n })?;
        self.factor = nth_root(self.factor, n).ok_or(Error::NotARoot { what, n })?;
        self.num = num;
        self.den = den;
        Ok(())
    }

    /// Adds another quantity. Both operands are completely reduced first
    /// and must be conformable under [`Ignore::None`].
    pub(crate) fn add(
        &mut self,
        mut other: Quantity,
        catalog: &Catalog,
        depth: usize,
    ) -> Result<()> {
        self.complete_reduce_depth(catalog, depth)?;
        other.complete_reduce_depth(catalog, depth)?;
        if !self.is_compatible_with(&other, Ignore::None) {
            return Err(Error::NonConformableSum {
                left: self.to_string(),
                right: other.to_string(),
            });
        }
        self.factor += other.factor;
        Ok(())
    }

    /// True when both quantities share the same dimension under the given
    /// ignore mode. Symmetric in its arguments.
    pub fn is_compatible_with(&self, other: &Quantity, mode: Ignore) -> bool {
        self.num.has_same_factors(&other.num, mode)
            && self.den.has_same_factors(&other.den, mode)
    }

    /// Rewrites this quantity until its products hold only primitive
    /// factors, then cancels factors common to numerator and denominator.
    ///
    /// Reduction of an already-reduced quantity is a no-op. A definition
    /// cycle exhausts the pass bound and is reported as an error.
    pub fn complete_reduce(&mut self, catalog: &Catalog) -> Result<()> {
        self.complete_reduce_depth(catalog, 0)
    }

    pub(crate) fn complete_reduce_depth(
        &mut self,
        catalog: &Catalog,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_EVAL_DEPTH {
            return Err(Error::RecursionLimit(self.to_string()));
        }
        for _ in 0..MAX_REDUCE_PASSES {
            if !self.reduce_pass(catalog, depth)? {
                self.cancel();
                return Ok(());
            }
            if self.num.len() + self.den.len() > MAX_PRODUCT_FACTORS {
                break;
            }
        }
        let name = self
            .num
            .iter()
            .chain(self.den.iter())
            .find(|f| !f.primitive)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| self.to_string());
        Err(Error::Unreducible(name))
    }

    /// One rewrite pass: every non-primitive factor is replaced by its
    /// parsed definition. Returns whether anything changed.
    fn reduce_pass(&mut self, catalog: &Catalog, depth: usize) -> Result<bool> {
        let mut changed = false;
        let mut factor = self.factor;
        let mut num = Product::new();
        let mut den = Product::new();

        for f in self.num.iter() {
            if f.primitive {
                num.push(f.clone());
            } else {
                let v = parse::parse_with(&f.def, catalog, None, depth + 1)?;
                factor *= v.factor;
                num.extend_from(&v.num);
                den.extend_from(&v.den);
                changed = true;
            }
        }
        for f in self.den.iter() {
            if f.primitive {
                den.push(f.clone());
            } else {
                let v = parse::parse_with(&f.def, catalog, None, depth + 1)?;
                factor /= v.factor;
                num.extend_from(&v.den);
                den.extend_from(&v.num);
                changed = true;
            }
        }

        if changed {
            self.factor = factor;
            self.num = num;
            self.den = den;
        }
        Ok(changed)
    }

    /// Removes factors common to numerator and denominator.
    fn cancel(&mut self) {
        let nf = self.num.factors();
        let df = self.den.factors();
        let mut keep_num = Vec::new();
        let mut keep_den = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < nf.len() && j < df.len() {
            match nf[i].as_ref().cmp(df[j].as_ref()) {
                Ordering::Less => {
                    keep_num.push(nf[i].clone());
                    i += 1;
                }
                Ordering::Greater => {
                    keep_den.push(df[j].clone());
                    j += 1;
                }
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        keep_num.extend(nf[i..].iter().cloned());
        keep_den.extend(df[j..].iter().cloned());
        self.num = Product::from_sorted(keep_num);
        self.den = Product::from_sorted(keep_den);
    }
}

fn nth_root(x: f64, n: u32) -> Option<f64> {
    match n {
        2 => {
            if x < 0.0 {
                None
            } else {
                Some(x.sqrt())
            }
        }
        3 => Some(x.cbrt()),
        _ if x < 0.0 && n % 2 == 0 => None,
        _ if x < 0.0 => Some(-((-x).powf(1.0 / n as f64))),
        _ => Some(x.powf(1.0 / n as f64)),
    }
}

impl fmt::Display for Quantity {
    /// Renders e.g. `0.3048 m`, `10000 cd sr / m^2`, `1 / s`. A factor of
    /// exactly 1 is suppressed before a non-empty numerator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.num.is_empty() && self.den.is_empty() {
            return write!(f, "{}", show_number(self.factor));
        }
        if self.num.is_empty() {
            write!(f, "{}", show_number(self.factor))?;
        } else if self.factor == 1.0 {
            write!(f, "{}", self.num)?;
        } else {
            write!(f, "{} {}", show_number(self.factor), self.num)?;
        }
        if !self.den.is_empty() {
            write!(f, " / {}", self.den)?;
        }
        Ok(())
    }
}
