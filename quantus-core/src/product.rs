//! Products: sorted multisets of factors
//!
//! A Product is the dimensional-vector half of a quantity. Factors are kept
//! sorted by name; a factor appearing n times means the n-th power. An empty
//! Product represents the dimensionless number 1.

use std::fmt;
use std::sync::Arc;

use crate::factor::{Factor, Ignore};

#[derive(Debug, Clone, Default)]
pub struct Product {
    factors: Vec<Arc<Factor>>,
}

impl Product {
    pub fn new() -> Self {
        Product::default()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Factor>> {
        self.factors.iter()
    }

    pub(crate) fn factors(&self) -> &[Arc<Factor>] {
        &self.factors
    }

    pub(crate) fn from_sorted(factors: Vec<Arc<Factor>>) -> Self {
        debug_assert!(factors.windows(2).all(|w| w[0] <= w[1]));
        Product { factors }
    }

    /// Inserts a factor, preserving sort order.
    pub fn push(&mut self, f: Arc<Factor>) {
        let at = self
            .factors
            .iter()
            .position(|g| f.as_ref() <= g.as_ref())
            .unwrap_or(self.factors.len());
        self.factors.insert(at, f);
    }

    /// Adds every factor of another product to this one.
    pub fn extend_from(&mut self, other: &Product) {
        for f in &other.factors {
            self.push(f.clone());
        }
    }

    /// Element-wise comparison after dropping factors ignored under `mode`.
    ///
    /// This is the compatibility primitive: two products are conformable
    /// iff their filtered sequences are identical. Symmetric in its
    /// arguments by construction.
    pub fn has_same_factors(&self, other: &Product, mode: Ignore) -> bool {
        let mut i = 0;
        let mut j = 0;
        loop {
            while i < self.len() && self.factors[i].ignored_if(mode) {
                i += 1;
            }
            while j < other.len() && other.factors[j].ignored_if(mode) {
                j += 1;
            }
            if i == self.len() || j == other.len() {
                break;
            }
            if self.factors[i] != other.factors[j] {
                return false;
            }
            i += 1;
            j += 1;
        }
        i == self.len() && j == other.len()
    }

    /// The n-th root: every factor's multiplicity must divide n.
    pub fn root(&self, n: u32) -> Option<Product> {
        let n = n as usize;
        let mut result = Product::new();
        let mut i = 0;
        while i < self.len() {
            let f = &self.factors[i];
            let mut count = 1;
            i += 1;
            while i < self.len() && self.factors[i] == *f {
                count += 1;
                i += 1;
            }
            if count % n != 0 {
                return None;
            }
            for _ in 0..count / n {
                result.push(f.clone());
            }
        }
        Some(result)
    }
}

impl fmt::Display for Product {
    /// Renders e.g. `kg m^2`. Empty products render as nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut i = 0;
        let mut first = true;
        while i < self.len() {
            let factor = &self.factors[i];
            let mut count = 1;
            i += 1;
            while i < self.len() && self.factors[i] == *factor {
                count += 1;
                i += 1;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;
            if count > 1 {
                write!(f, "{}^{}", factor.name, count)?;
            } else {
                write!(f, "{}", factor.name)?;
            }
        }
        Ok(())
    }
}
