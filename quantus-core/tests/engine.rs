//! End-to-end engine scenarios against a small units database built
//! through the public API.

use proptest::prelude::*;
use quantus_core::{
    convert, render, Catalog, CatalogBuilder, Ignore, Location, Options, Outcome, Quantity,
    Verbosity,
};

fn catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    let loc = Location::builtin();

    for name in ["m", "kg", "s", "K"] {
        b.define_unit(name, "!", loc.clone());
    }
    b.define_prefix("k", "kilo", loc.clone());
    b.define_prefix("kilo", "1e3", loc.clone());
    b.define_prefix("c", "centi", loc.clone());
    b.define_prefix("centi", "1e-2", loc.clone());
    b.define_prefix("m", "milli", loc.clone());
    b.define_prefix("milli", "1e-3", loc.clone());

    b.define_unit("gram", "1|1000 kg", loc.clone());
    b.define_unit("meter", "m", loc.clone());
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
    b.define_unit("liter", "1000 cm^3", loc.clone());
    b.define_unit("gallon", "231 in^3", loc.clone());
    b.define_unit("Hz", "1/s", loc.clone());
    b.define_unit("degC", "K", loc.clone());
    b.define_unit("degF", "5|9 degC", loc.clone());

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

    let (catalog, diagnostics) = b.finish();
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    catalog
}

fn reduced(expr: &str, catalog: &Catalog) -> Quantity {
    let mut q = Quantity::parse(expr, catalog).expect(expr);
    q.complete_reduce(catalog).expect(expr);
    q
}

fn terse() -> Options {
    Options {
        verbosity: Verbosity::Terse,
        ..Options::default()
    }
}

#[test]
fn pluralization_resolves_to_compatible_quantities() {
    let catalog = catalog();
    let a = reduced("meters", &catalog);
    let b = reduced("meter", &catalog);
    let c = reduced("m", &catalog);
    assert!(a.is_compatible_with(&b, Ignore::None));
    assert!(b.is_compatible_with(&c, Ignore::None));
    assert_eq!(reduced("inches", &catalog).factor, reduced("inch", &catalog).factor);
}

#[test]
fn longest_prefix_precedence() {
    let catalog = catalog();
    // 'k' and 'kilo' are both prefixes; kilogram must mean kilo-gram.
    let q = reduced("kilogram", &catalog);
    assert_eq!(q.to_string(), "kg");
}

#[test]
fn mixed_radix_carry_literal_scenario() {
    let catalog = catalog();
    let have = Quantity::parse("2 m", &catalog).unwrap();
    let outcome = convert("2 m", &have, "ft;in;1|8 in;;", &catalog, &terse()).unwrap();
    assert_eq!(render(&outcome, &terse()), "6;6;6;-\n");
}

#[test]
fn reciprocal_conversion_is_flagged() {
    let catalog = catalog();
    let have = Quantity::parse("8 liter / 100 km", &catalog).unwrap();
    let outcome = convert(
        "8 liter / 100 km",
        &have,
        "mile/gallon",
        &catalog,
        &Options::default(),
    )
    .unwrap();
    match outcome {
        Outcome::Factor {
            value,
            inverse,
            reciprocal,
            ..
        } => {
            assert!(reciprocal);
            assert!((value - 29.401_823).abs() < 1e-5);
            assert!((inverse - 0.034_011_497).abs() < 1e-8);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn function_round_trip_through_conversion() {
    let catalog = catalog();
    // tempF(tempC^-1(36)) == 96.8
    let have = Quantity::parse("tempC(36)", &catalog).unwrap();
    let outcome = convert("tempC(36)", &have, "tempF", &catalog, &Options::default()).unwrap();
    match outcome {
        Outcome::Function { argument, .. } => assert_eq!(argument, "96.8"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn reduction_is_idempotent() {
    let catalog = catalog();
    let mut q = Quantity::parse("mile/hour", &catalog).unwrap();
    q.complete_reduce(&catalog).unwrap();
    let once = (q.factor, q.to_string());
    q.complete_reduce(&catalog).unwrap();
    assert_eq!((q.factor, q.to_string()), once);
}

#[test]
fn non_monotonic_table_warns_and_refuses_inverse() {
    let mut b = CatalogBuilder::new();
    let loc = Location::new("test.units", 1);
    b.define_unit("m", "!", loc.clone());
    b.define_tabular(
        "wobble",
        "m",
        vec![(0.0, 1.0), (1.0, 3.0), (2.0, 2.0)],
        loc,
    );
    let (catalog, diagnostics) = b.finish();
    assert!(diagnostics
        .iter()
        .any(|d| d.message.contains("lacks unique inverse")));
    let have = Quantity::parse("2.5 m", &catalog).unwrap();
    let err = convert("2.5 m", &have, "wobble", &catalog, &Options::default()).unwrap_err();
    assert!(err.to_string().contains("no inverse"), "{}", err);
}

const POOL: &[&str] = &[
    "m",
    "ft",
    "kg",
    "gram",
    "s",
    "hour",
    "mile/hour",
    "liter",
    "Hz",
    "42",
    "m^2",
    "kg m/s^2",
];

proptest! {
    #[test]
    fn conformability_is_symmetric(i in 0..POOL.len(), j in 0..POOL.len(), mode in 0..3usize) {
        let catalog = catalog();
        let a = reduced(POOL[i], &catalog);
        let b = reduced(POOL[j], &catalog);
        let mode = [Ignore::None, Ignore::Primitive, Ignore::Dimensionless][mode];
        prop_assert_eq!(
            a.is_compatible_with(&b, mode),
            b.is_compatible_with(&a, mode)
        );
    }

    #[test]
    fn round_trip_inverse_for_temperature(x in -200.0f64..500.0) {
        let catalog = catalog();
        let f = format!("tempF({})", x);
        let have = Quantity::parse(&f, &catalog).unwrap();
        let outcome = convert(&f, &have, "tempF", &catalog, &Options::default()).unwrap();
        match outcome {
            Outcome::Function { argument, .. } => {
                let back: f64 = argument.parse().unwrap();
                prop_assert!((back - x).abs() <= x.abs() * 1e-6 + 1e-4);
            }
            _ => prop_assert!(false, "expected a function outcome"),
        }
    }
}
