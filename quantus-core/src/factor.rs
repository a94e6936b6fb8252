//! Factors: the units and prefixes that make up a Product

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Whether a factor was registered as a unit or as a prefix.
///
/// A unit named `m` and a prefix named `m` are distinct factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorKind {
    Unit,
    Prefix,
}

/// Which factors to disregard when comparing products for compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ignore {
    None,
    Primitive,
    Dimensionless,
}

/// A named unit or prefix that can appear as a factor in a Product.
///
/// Factors are created once at catalog build time and shared immutably
/// for the rest of the session.
#[derive(Debug)]
pub struct Factor {
    pub kind: FactorKind,
    pub name: String,
    /// Definition text; `!` marks a primitive unit, `!dimensionless`
    /// a dimensionless primitive.
    pub def: String,
    pub location: Location,
    pub primitive: bool,
    pub dimensionless: bool,
    /// True when the definition is itself a finite number.
    pub numeric: bool,
}

impl Factor {
    pub fn new(
        kind: FactorKind,
        name: impl Into<String>,
        def: impl Into<String>,
        location: Location,
    ) -> Self {
        let def = def.into();
        let primitive = def == "!" || def == "!dimensionless";
        let dimensionless = def == "!dimensionless";
        let numeric = def.parse::<f64>().map(f64::is_finite).unwrap_or(false);
        Factor {
            kind,
            name: name.into(),
            def,
            location,
            primitive,
            dimensionless,
            numeric,
        }
    }

    /// True when this factor is skipped under the given ignore mode.
    pub fn ignored_if(&self, mode: Ignore) -> bool {
        match mode {
            Ignore::None => false,
            Ignore::Primitive => self.primitive,
            Ignore::Dimensionless => self.dimensionless,
        }
    }
}

impl PartialEq for Factor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

impl Eq for Factor {}

impl PartialOrd for Factor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Factor {
    fn cmp(&self, other: &Self) -> Ordering {
        // Alphabetic by name; kind breaks ties so ordering is total.
        self.name
            .cmp(&other.name)
            .then_with(|| kind_rank(self.kind).cmp(&kind_rank(other.kind)))
    }
}

fn kind_rank(kind: FactorKind) -> u8 {
    match kind {
        FactorKind::Unit => 0,
        FactorKind::Prefix => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, def: &str) -> Factor {
        Factor::new(FactorKind::Unit, name, def, Location::builtin())
    }

    #[test]
    fn test_flags() {
        let m = unit("m", "!");
        assert!(m.primitive);
        assert!(!m.dimensionless);
        assert!(!m.numeric);

        let radian = unit("radian", "!dimensionless");
        assert!(radian.primitive);
        assert!(radian.dimensionless);

        let kilo = Factor::new(FactorKind::Prefix, "kilo", "1e3", Location::builtin());
        assert!(kilo.numeric);
        assert!(!kilo.primitive);

        let ft = unit("ft", "12 in");
        assert!(!ft.numeric);
        assert!(!ft.primitive);
    }

    #[test]
    fn test_ignored_if() {
        let m = unit("m", "!");
        let radian = unit("radian", "!dimensionless");
        let ft = unit("ft", "12 in");

        assert!(m.ignored_if(Ignore::Primitive));
        assert!(!m.ignored_if(Ignore::Dimensionless));
        assert!(radian.ignored_if(Ignore::Dimensionless));
        assert!(radian.ignored_if(Ignore::Primitive));
        assert!(!ft.ignored_if(Ignore::Primitive));
        assert!(!ft.ignored_if(Ignore::None));
    }

    #[test]
    fn test_identity_and_order() {
        let unit_m = unit("m", "!");
        let prefix_m = Factor::new(FactorKind::Prefix, "m", "1e-3", Location::builtin());
        assert_ne!(unit_m, prefix_m);
        assert!(unit_m < prefix_m);
        assert!(unit("kg", "!") < unit("m", "!"));
    }
}
