//! The entity catalog: four name tables built once, queried many times
//!
//! The catalog owns every registered unit, prefix, function, and unit-list
//! alias. It is constructed through [`CatalogBuilder`] (normally driven by
//! the definitions-file loader), after which it is read-only for the rest
//! of the session. Build problems are collected as [`Diagnostic`]s; a bad
//! definition never aborts the build.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::factor::{Factor, FactorKind, Ignore};
use crate::function::{FuncPart, Function, FunctionKind};
use crate::location::{Diagnostic, Location};
use crate::quantity::Quantity;
use crate::unitlist::UnitList;

/// A named unit list (`!unitlist` statement).
#[derive(Debug)]
pub struct Alias {
    pub name: String,
    /// The semicolon-separated list, with whitespace removed.
    pub list: String,
    pub location: Location,
}

/// What an identifier denotes after name resolution.
#[derive(Debug, Clone)]
pub enum Resolution {
    Unit(Arc<Factor>),
    Prefix(Arc<Factor>),
    Prefixed {
        prefix: Arc<Factor>,
        unit: Arc<Factor>,
    },
}

/// One registered entity, for code that treats all four kinds uniformly.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Unit(&'a Arc<Factor>),
    Prefix(&'a Arc<Factor>),
    Function(&'a Arc<Function>),
    Alias(&'a Arc<Alias>),
}

impl Entity<'_> {
    pub fn name(&self) -> &str {
        match self {
            Entity::Unit(f) | Entity::Prefix(f) => &f.name,
            Entity::Function(f) => &f.name,
            Entity::Alias(a) => &a.name,
        }
    }
}

/// Checks whether a string may be registered as an entity name.
/// Returns a description of the problem, or `None` when the name is fine.
pub fn check_name(name: &str) -> Option<String> {
    let first = match name.chars().next() {
        Some(c) => c,
        None => return Some("is empty".to_string()),
    };
    if first.is_ascii_digit() {
        return Some("begins with a digit".to_string());
    }
    if "_.,~".contains(first) {
        return Some(format!("begins with '{}'", first));
    }
    let last = name.chars().last().expect("name is non-empty");
    if ".,_".contains(last) {
        return Some(format!("ends with '{}'", last));
    }
    if let Some(c) = name.chars().skip(1).find(|c| "+-*/|^();#".contains(*c)) {
        return Some(format!("contains '{}'", c));
    }
    None
}

/// True when the name ends with a subscript: `_` followed by digits,
/// points, and/or commas.
pub(crate) fn has_subscript(name: &str) -> bool {
    match name.rfind('_') {
        Some(i) if i + 1 < name.len() => name[i + 1..]
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ','),
        _ => false,
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    units: HashMap<String, Arc<Factor>>,
    prefixes: HashMap<String, Arc<Factor>>,
    functions: HashMap<String, Arc<Function>>,
    aliases: HashMap<String, Arc<Alias>>,
}

impl Catalog {
    /// Exact unit-table lookup.
    pub fn unit(&self, name: &str) -> Option<&Arc<Factor>> {
        self.units.get(name)
    }

    /// Exact prefix-table lookup.
    pub fn prefix(&self, name: &str) -> Option<&Arc<Factor>> {
        self.prefixes.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&Arc<Function>> {
        self.functions.get(name)
    }

    pub fn alias(&self, name: &str) -> Option<&Arc<Alias>> {
        self.aliases.get(name)
    }

    /// Unit lookup allowing English plural forms.
    ///
    /// The reversal rules are tried in order — strip `s`, strip `es`,
    /// replace `ies` with `y` — and the first hit wins. This is the single
    /// place pluralization lives; the algebra never sees it.
    pub fn find_unit(&self, name: &str) -> Option<Arc<Factor>> {
        if let Some(u) = self.units.get(name) {
            return Some(u.clone());
        }
        let len = name.len();
        if len > 2 && name.ends_with('s') {
            if let Some(u) = self.units.get(&name[..len - 1]) {
                return Some(u.clone());
            }
            if len > 3 && name.ends_with("es") {
                if let Some(u) = self.units.get(&name[..len - 2]) {
                    return Some(u.clone());
                }
                if len > 4 && name.ends_with("ies") {
                    let singular = format!("{}y", &name[..len - 3]);
                    if let Some(u) = self.units.get(&singular) {
                        return Some(u.clone());
                    }
                }
            }
        }
        None
    }

    /// The longest registered prefix that literally prefixes `name`.
    ///
    /// Longest-first matters: a short prefix that is itself a prefix of a
    /// longer registered one must not shadow the more specific match.
    fn find_longest_prefix(&self, name: &str) -> Option<Arc<Factor>> {
        self.prefixes
            .values()
            .filter(|p| name.starts_with(p.name.as_str()))
            .max_by_key(|p| p.name.len())
            .cloned()
    }

    /// Resolves an identifier to a unit, a bare prefix, or a prefixed unit.
    pub fn resolve(&self, name: &str) -> Option<Resolution> {
        if check_name(name).is_some() {
            return None;
        }
        if let Some(u) = self.find_unit(name) {
            return Some(Resolution::Unit(u));
        }
        let p = self.find_longest_prefix(name)?;
        if p.name.len() == name.len() {
            return Some(Resolution::Prefix(p));
        }
        let rest = &name[p.name.len()..];
        let u = self.find_unit(rest)?;
        Some(Resolution::Prefixed { prefix: p, unit: u })
    }

    /// One line of table statistics.
    pub fn stat(&self) -> String {
        format!(
            "{} units, {} prefixes, {} nonlinear units, {} unit lists.",
            self.units.len(),
            self.prefixes.len(),
            self.functions.len(),
            self.aliases.len()
        )
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity<'_>> {
        self.units
            .values()
            .map(Entity::Unit)
            .chain(self.prefixes.values().map(Entity::Prefix))
            .chain(self.functions.values().map(Entity::Function))
            .chain(self.aliases.values().map(Entity::Alias))
    }

    /// One-line description of an entity, per kind.
    pub fn describe(&self, entity: Entity<'_>) -> String {
        match entity {
            Entity::Unit(f) => {
                if f.primitive {
                    "<primitive unit>".to_string()
                } else {
                    format!("= {}", f.def)
                }
            }
            Entity::Prefix(f) => format!("<prefix> {}", f.def),
            Entity::Function(_) => "<function>".to_string(),
            Entity::Alias(a) => format!("= {}", a.list),
        }
    }

    /// Whether an entity's value or result conforms to `v`.
    pub fn conforms(&self, entity: Entity<'_>, v: &Quantity) -> bool {
        match entity {
            Entity::Unit(f) => reduced(&f.def, self)
                .map(|d| d.is_compatible_with(v, Ignore::Dimensionless))
                .unwrap_or(false),
            Entity::Prefix(_) => {
                Quantity::one().is_compatible_with(v, Ignore::Dimensionless)
            }
            Entity::Function(f) => f.conforms_to(v, self),
            Entity::Alias(a) => match UnitList::parse(&a.list, self, false) {
                Ok(list) => list.first().is_compatible_with(v, Ignore::Dimensionless),
                Err(_) => false,
            },
        }
    }

    /// All entities conformable to a value, as `name desc` lines sorted
    /// by name.
    pub fn conformable(&self, v: &Quantity) -> Vec<String> {
        let mut rows: Vec<String> = self
            .entities()
            .filter(|e| self.conforms(*e, v))
            .map(|e| format!("{} {}", e.name(), self.describe(e)))
            .collect();
        rows.sort();
        rows
    }

    /// All entities whose name contains the given text.
    pub fn matching(&self, text: &str) -> Vec<String> {
        let mut rows: Vec<String> = self
            .entities()
            .filter(|e| e.name().contains(text))
            .map(|e| format!("{} {}", e.name(), self.describe(e)))
            .collect();
        rows.sort();
        rows
    }

    /// Shows the definition of a function or unit-list name; with
    /// `include_units` also of a unit, prefix, or prefixed unit, as a
    /// definition chain ending in the reduced form.
    pub fn show_definition(&self, name: &str, include_units: bool) -> Option<String> {
        if check_name(name).is_some() {
            return None;
        }
        if let Some(a) = self.aliases.get(name) {
            return Some(format!("unit list, {}", a.list));
        }
        if let Some(f) = self.functions.get(name) {
            return Some(f.show_def());
        }
        if !include_units {
            return None;
        }
        self.factor_definition_chain(name)
    }

    fn factor_definition_chain(&self, name: &str) -> Option<String> {
        let mut chain = String::new();
        let mut def = name.to_string();
        // Hop bound: a cyclic chain of single-name definitions would
        // otherwise never leave this loop.
        for _ in 0..32 {
            let resolution = match self.resolve(&def) {
                Some(r) => r,
                None => break,
            };
            match resolution {
                Resolution::Prefix(p) => {
                    def = p.def.clone();
                    if p.numeric {
                        return Some(format!("{}{} = {}", name, chain, def));
                    }
                    chain.push_str(&format!(" = {}", def));
                }
                Resolution::Unit(u) => {
                    def = u.def.clone();
                    if u.numeric {
                        return Some(format!("{}{} = {}", name, chain, def));
                    }
                    if u.primitive {
                        if chain.is_empty() {
                            return Some(format!("'{}' is a primitive unit", name));
                        }
                        return Some(format!("{}{}", name, chain));
                    }
                    chain.push_str(&format!(" = {}", def));
                }
                Resolution::Prefixed { prefix, unit } => {
                    let unit_part = if unit.primitive || unit.numeric {
                        unit.name.clone()
                    } else {
                        unit.def.clone()
                    };
                    chain.push_str(&format!(" = {} {}", prefix.def, unit_part));
                    break;
                }
            }
        }
        let mut v = Quantity::parse(name, self).ok()?;
        v.complete_reduce(self).ok()?;
        Some(format!("{}{} = {}", name, chain, v))
    }

    /// Checks every table entry for correctness and returns the findings.
    /// Mirrors the per-entity checks run at build time, plus reducibility
    /// and name-hiding checks over the full tables.
    pub fn check_all(&self) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        let one = Quantity::one();

        let mut aliases: Vec<&Arc<Alias>> = self.aliases.values().collect();
        aliases.sort_by(|a, b| a.name.cmp(&b.name));
        let mut functions: Vec<&Arc<Function>> = self.functions.values().collect();
        functions.sort_by(|a, b| a.name.cmp(&b.name));
        let mut prefixes: Vec<&Arc<Factor>> = self.prefixes.values().collect();
        prefixes.sort_by(|a, b| a.name.cmp(&b.name));
        let mut units: Vec<&Arc<Factor>> = self.units.values().collect();
        units.sort_by(|a, b| a.name.cmp(&b.name));

        for a in aliases {
            if let Err(e) = UnitList::parse(&a.list, self, false) {
                diags.push(Diagnostic::new(
                    a.location.clone(),
                    format!("Unit list '{}'. {}", a.name, e),
                ));
            }
            for (kind, hidden) in [
                ("function", self.functions.contains_key(&a.name)),
                ("unit", self.units.contains_key(&a.name)),
                ("prefix", self.prefixes.contains_key(&a.name)),
            ] {
                if hidden {
                    diags.push(Diagnostic::new(
                        a.location.clone(),
                        format!("Unit list '{}' hides a {} of the same name.", a.name, kind),
                    ));
                }
            }
        }

        for f in functions {
            diags.extend(f.check(self));
            for (kind, hidden) in [
                ("unit", self.units.contains_key(&f.name)),
                ("prefix", self.prefixes.contains_key(&f.name)),
            ] {
                if hidden {
                    diags.push(Diagnostic::new(
                        f.location.clone(),
                        format!("Function '{}' hides a {} of the same name.", f.name, kind),
                    ));
                }
            }
        }

        for p in prefixes {
            if let Some(c) = top_level_slash(&p.def) {
                diags.push(Diagnostic::new(
                    p.location.clone(),
                    format!("Prefix '{}-' defined as '{}' contains bad '{}'.", p.name, p.def, c),
                ));
                continue;
            }
            match reduced(&p.name, self) {
                Ok(v) if v.is_compatible_with(&one, Ignore::Primitive) => {}
                _ => diags.push(Diagnostic::new(
                    p.location.clone(),
                    format!("Prefix '{}' defined as '{}' is irreducible.", p.name, p.def),
                )),
            }
        }

        for u in units {
            match reduced(&u.name, self) {
                Ok(v) => {
                    if !v.is_compatible_with(&one, Ignore::Primitive) {
                        diags.push(Diagnostic::new(
                            u.location.clone(),
                            format!("Unit '{}' defined as '{}' is irreducible.", u.name, u.def),
                        ));
                    }
                }
                Err(e) => diags.push(Diagnostic::new(u.location.clone(), e.to_string())),
            }
        }

        diags
    }
}

/// Parses and completely reduces an expression.
fn reduced(expr: &str, catalog: &Catalog) -> Result<Quantity> {
    let mut v = Quantity::parse(expr, catalog)?;
    v.complete_reduce(catalog)?;
    Ok(v)
}

fn top_level_slash(def: &str) -> Option<char> {
    let mut level = 0i32;
    for c in def.chars() {
        match c {
            '(' => level += 1,
            ')' => level -= 1,
            '/' if level == 0 => return Some('/'),
            _ => {}
        }
    }
    None
}

/// Builds a [`Catalog`], collecting diagnostics instead of failing.
///
/// Later definitions with the same name replace earlier ones; replacement
/// is reported, not rejected.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: Catalog,
    diagnostics: Vec<Diagnostic>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        CatalogBuilder::default()
    }

    fn note(&mut self, location: Location, message: String) {
        self.diagnostics.push(Diagnostic::new(location, message));
    }

    /// Attaches an externally produced diagnostic (e.g. from the
    /// definitions-file loader) to this build.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn define_unit(&mut self, name: &str, def: &str, location: Location) {
        if let Some(reason) = check_name(name) {
            self.note(
                location,
                format!("Unit '{}' is ignored. Its name {}.", name, reason),
            );
            return;
        }
        // A name ending in 2-9 without a subscript could never be
        // referenced: the parser reads the trailing digit as an exponent.
        if !has_subscript(name) && name.ends_with(|c: char| matches!(c, '2'..='9')) {
            self.note(
                location,
                format!(
                    "Unit '{}' is ignored. Its name ends with a digit 2-9 without '_'.",
                    name
                ),
            );
            return;
        }
        let factor = Arc::new(Factor::new(FactorKind::Unit, name, def, location.clone()));
        if let Some(old) = self.catalog.units.insert(name.to_string(), factor) {
            self.note(
                location,
                format!("Unit '{}' defined in {} is redefined.", name, old.location),
            );
        }
    }

    /// Defines a prefix. `name` is the prefix without its trailing `-`.
    pub fn define_prefix(&mut self, name: &str, def: &str, location: Location) {
        if let Some(reason) = check_name(name) {
            self.note(
                location,
                format!("Prefix '{}' is ignored. It {}.", name, reason),
            );
            return;
        }
        let factor = Arc::new(Factor::new(FactorKind::Prefix, name, def, location.clone()));
        if let Some(old) = self.catalog.prefixes.insert(name.to_string(), factor) {
            self.note(
                location,
                format!("Prefix '{}-' defined in {} is redefined.", name, old.location),
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn define_computed(
        &mut self,
        name: &str,
        param: &str,
        fwd_dim: Option<String>,
        inv_dim: Option<String>,
        fwd_def: String,
        inv_def: Option<String>,
        location: Location,
    ) {
        if let Some(reason) = check_name(name) {
            self.note(
                location,
                format!("Function '{}' is ignored. Its name {}.", name, reason),
            );
            return;
        }
        let function = Function {
            name: name.to_string(),
            location: location.clone(),
            kind: FunctionKind::Computed {
                forward: FuncPart {
                    param: param.to_string(),
                    body: Some(fwd_def),
                    dim: fwd_dim,
                },
                // The inverse definition refers to the function's own name
                // as its parameter.
                inverse: FuncPart {
                    param: name.to_string(),
                    body: inv_def,
                    dim: inv_dim,
                },
            },
        };
        self.install_function(function);
    }

    pub fn define_tabular(
        &mut self,
        name: &str,
        result_unit: &str,
        points: Vec<(f64, f64)>,
        location: Location,
    ) {
        if let Some(reason) = check_name(name) {
            self.note(
                location,
                format!("Function '{}' is ignored. Its name {}.", name, reason),
            );
            return;
        }
        // Non-monotonic tables have no well-defined inverse; flag them now,
        // not on first use.
        let mut invertible = true;
        if points.len() < 2 {
            self.note(
                location.clone(),
                format!("Table '{}' has only one data point.", name),
            );
            invertible = false;
        } else {
            let direction = sign(points[1].1 - points[0].1);
            for w in points.windows(2).skip(1) {
                if direction == 0 || sign(w[1].1 - w[0].1) != direction {
                    self.note(
                        location.clone(),
                        format!(
                            "Table '{}' lacks unique inverse around entry {}.",
                            name,
                            crate::fmt::show_number(w[0].0)
                        ),
                    );
                    invertible = false;
                    break;
                }
            }
        }
        let function = Function {
            name: name.to_string(),
            location,
            kind: FunctionKind::Tabular {
                result_unit: result_unit.to_string(),
                points,
                invertible,
            },
        };
        self.install_function(function);
    }

    fn install_function(&mut self, function: Function) {
        let name = function.name.clone();
        let location = function.location.clone();
        if let Some(old) = self
            .catalog
            .functions
            .insert(name.clone(), Arc::new(function))
        {
            self.note(
                location,
                format!("Function '{}' defined in {} is redefined.", name, old.location),
            );
        }
    }

    pub fn define_alias(&mut self, name: &str, list: &str, location: Location) {
        if let Some(reason) = check_name(name) {
            self.note(
                location,
                format!("Alias '{}' is ignored. It {}.", name, reason),
            );
            return;
        }
        let alias = Alias {
            name: name.to_string(),
            list: list.replace([' ', '\t'], ""),
            location: location.clone(),
        };
        if let Some(old) = self.catalog.aliases.insert(name.to_string(), Arc::new(alias)) {
            self.note(
                location,
                format!("Unit list '{}' defined in {} is redefined.", name, old.location),
            );
        }
    }

    /// Finishes the build: runs the definition checks that need the
    /// complete tables (function inverses, alias lists) and returns the
    /// read-only catalog with all accumulated diagnostics.
    pub fn finish(self) -> (Catalog, Vec<Diagnostic>) {
        let catalog = self.catalog;
        let mut diagnostics = self.diagnostics;

        let mut function_names: Vec<&String> = catalog.functions.keys().collect();
        function_names.sort();
        for name in function_names {
            diagnostics.extend(catalog.functions[name].check(&catalog));
        }

        let mut alias_names: Vec<&String> = catalog.aliases.keys().collect();
        alias_names.sort();
        for name in alias_names {
            let a = &catalog.aliases[name];
            if let Err(e) = UnitList::parse(&a.list, &catalog, false) {
                diagnostics.push(Diagnostic::new(
                    a.location.clone(),
                    format!("Unit list '{}'. {}", a.name, e),
                ));
            }
        }

        (catalog, diagnostics)
    }
}

fn sign(d: f64) -> i32 {
    if d == 0.0 {
        0
    } else if d > 0.0 {
        1
    } else {
        -1
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A compact catalog used across the crate's tests.
    pub(crate) fn test_catalog() -> Catalog {
        let (catalog, _) = test_catalog_with_diagnostics();
        catalog
    }

    pub(crate) fn test_catalog_with_diagnostics() -> (Catalog, Vec<Diagnostic>) {
        let mut b = CatalogBuilder::new();
        let loc = Location::builtin();

        // Primitive units.
        for name in ["m", "kg", "s", "A", "K", "cd", "mol"] {
            b.define_unit(name, "!", loc.clone());
        }
        b.define_unit("radian", "!dimensionless", loc.clone());
        b.define_unit("sr", "!dimensionless", loc.clone());

        // Prefixes, including a short one shadowed by a longer one.
        b.define_prefix("k", "kilo", loc.clone());
        b.define_prefix("kilo", "1e3", loc.clone());
        b.define_prefix("c", "centi", loc.clone());
        b.define_prefix("centi", "1e-2", loc.clone());
        b.define_prefix("m", "milli", loc.clone());
        b.define_prefix("milli", "1e-3", loc.clone());
        b.define_prefix("u", "micro", loc.clone());
        b.define_prefix("micro", "1e-6", loc.clone());
        b.define_prefix("M", "mega", loc.clone());
        b.define_prefix("mega", "1e6", loc.clone());

        // Derived units.
        b.define_unit("meter", "m", loc.clone());
        b.define_unit("gram", "1|1000 kg", loc.clone());
        b.define_unit("g", "gram", loc.clone());
        b.define_unit("inch", "2.54 cm", loc.clone());
        b.define_unit("in", "inch", loc.clone());
        b.define_unit("ft", "12 in", loc.clone());
        b.define_unit("foot", "ft", loc.clone());
        b.define_unit("feet", "ft", loc.clone());
        b.define_unit("yard", "3 ft", loc.clone());
        b.define_unit("mile", "5280 ft", loc.clone());
        b.define_unit("minute", "60 s", loc.clone());
        b.define_unit("min", "minute", loc.clone());
        b.define_unit("hour", "60 minute", loc.clone());
        b.define_unit("hr", "hour", loc.clone());
        b.define_unit("liter", "1000 cm^3", loc.clone());
        b.define_unit("gallon", "231 in^3", loc.clone());
        b.define_unit("quart", "1|4 gallon", loc.clone());
        b.define_unit("Hz", "1/s", loc.clone());
        b.define_unit("candy", "42 g", loc.clone());
        b.define_unit("degC", "K", loc.clone());
        b.define_unit("degF", "5|9 degC", loc.clone());
        b.define_unit("pi", "3.14159265358979323846", loc.clone());

        // Deliberately broken definitions, for cycle tests.
        b.define_unit("snark", "boojum", loc.clone());
        b.define_unit("boojum", "snark", loc.clone());
        b.define_unit("ouroboros", "ouroboros", loc.clone());

        // Temperature scales.
        b.define_computed(
            "tempC",
            "x",
            Some("1".to_string()),
            Some("K".to_string()),
            "(x+273.15) K".to_string(),
            Some("tempC/K + (-273.15)".to_string()),
            loc.clone(),
        );
        b.define_computed(
            "tempF",
            "x",
            Some("1".to_string()),
            Some("K".to_string()),
            "(x+459.67) degF".to_string(),
            Some("tempF/degF + (-459.67)".to_string()),
            loc.clone(),
        );

        // A monotonic gauge table.
        b.define_tabular(
            "gauge",
            "mm",
            vec![(1.0, 7.348), (5.0, 4.621), (10.0, 2.588), (20.0, 0.812)],
            loc.clone(),
        );

        b.define_alias("ftin", "ft;in", loc.clone());

        b.finish()
    }

    #[test]
    fn test_check_name() {
        assert!(check_name("meter").is_none());
        assert!(check_name("flour_sifted").is_none());
        assert!(check_name("m_2").is_none());
        assert_eq!(check_name("2x"), Some("begins with a digit".to_string()));
        assert_eq!(check_name("~x"), Some("begins with '~'".to_string()));
        assert_eq!(check_name("x_"), Some("ends with '_'".to_string()));
        assert_eq!(check_name("a+b"), Some("contains '+'".to_string()));
    }

    #[test]
    fn test_plural_resolution() {
        let catalog = test_catalog();
        assert!(catalog.find_unit("ft").is_some());
        assert!(catalog.find_unit("inches").is_some(), "es-strip rule");
        assert!(catalog.find_unit("candies").is_some(), "ies-to-y rule");
        assert!(catalog.find_unit("liters").is_some(), "s-strip rule");
        assert!(catalog.find_unit("bogus").is_none());
        // Too short for plural stripping.
        assert!(catalog.find_unit("as").is_none());
    }

    #[test]
    fn test_longest_prefix_wins() {
        let catalog = test_catalog();
        // Both 'k' and 'kilo' are registered; 'kilogram' must use 'kilo',
        // not 'k' + 'ilogram'.
        match catalog.resolve("kilogram") {
            Some(Resolution::Prefixed { prefix, unit }) => {
                assert_eq!(prefix.name, "kilo");
                assert_eq!(unit.name, "gram");
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_bare_prefix_resolution() {
        let catalog = test_catalog();
        match catalog.resolve("kilo") {
            Some(Resolution::Prefix(p)) => assert_eq!(p.name, "kilo"),
            other => panic!("unexpected resolution: {:?}", other),
        }
        match catalog.resolve("km") {
            Some(Resolution::Prefixed { prefix, unit }) => {
                assert_eq!(prefix.name, "k");
                assert_eq!(unit.name, "m");
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_prefixed_plural() {
        let catalog = test_catalog();
        // "centi" + "meters" resolves through both prefix and plural rules.
        match catalog.resolve("centimeters") {
            Some(Resolution::Prefixed { prefix, .. }) => assert_eq!(prefix.name, "centi"),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_name_does_not_resolve() {
        let catalog = test_catalog();
        assert!(catalog.resolve("2m").is_none());
        assert!(catalog.resolve("a+b").is_none());
    }

    #[test]
    fn test_redefinition_is_reported() {
        let mut b = CatalogBuilder::new();
        let loc = Location::new("a.units", 1);
        b.define_unit("m", "!", loc.clone());
        b.define_unit("m", "!", Location::new("b.units", 9));
        let (catalog, diags) = b.finish();
        assert!(catalog.unit("m").is_some());
        assert!(diags.iter().any(|d| d.message.contains("redefined")));
    }

    #[test]
    fn test_bad_names_are_skipped() {
        let mut b = CatalogBuilder::new();
        let loc = Location::builtin();
        b.define_unit("2x", "!", loc.clone());
        b.define_unit("m2", "!", loc.clone());
        b.define_unit("m_2", "!", loc.clone());
        let (catalog, diags) = b.finish();
        assert!(catalog.unit("2x").is_none());
        assert!(catalog.unit("m2").is_none(), "trailing 2-9 without subscript");
        assert!(catalog.unit("m_2").is_some(), "subscripted name is fine");
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_stat_and_matching() {
        let catalog = test_catalog();
        assert!(catalog.stat().contains("unit lists"));
        let rows = catalog.matching("temp");
        assert!(rows.iter().any(|r| r.starts_with("tempC ")));
        assert!(rows.iter().any(|r| r.starts_with("tempF ")));
    }

    #[test]
    fn test_conformable() {
        let catalog = test_catalog();
        let mut v = Quantity::parse("m", &catalog).unwrap();
        v.complete_reduce(&catalog).unwrap();
        let rows = catalog.conformable(&v);
        assert!(rows.iter().any(|r| r.starts_with("ft ")));
        assert!(rows.iter().any(|r| r.starts_with("mile ")));
        assert!(!rows.iter().any(|r| r.starts_with("hour ")));
    }

    #[test]
    fn test_show_definition() {
        let catalog = test_catalog();
        assert_eq!(
            catalog.show_definition("m", true).as_deref(),
            Some("'m' is a primitive unit")
        );
        let ft = catalog.show_definition("ft", true).unwrap();
        assert!(ft.starts_with("ft = 12 in"), "{}", ft);
        assert!(ft.ends_with("= 0.3048 m"), "{}", ft);
        assert_eq!(
            catalog.show_definition("ftin", false).as_deref(),
            Some("unit list, ft;in")
        );
        assert!(catalog.show_definition("tempC", false).is_some());
        // Units are not shown unless asked for.
        assert!(catalog.show_definition("ft", false).is_none());
    }
}
