//! Conversions driven through a loaded definitions database, end to end.

use quantus_core::{convert, render, Catalog, CatalogBuilder, Options, Quantity, Verbosity};
use quantus_files::Loader;

const DEFS: &str = "\
# base dimensions
m       !
kg      !
s       !
A       !
K       !
mol     !
cd      !
radian  !dimensionless
sr      !dimensionless

# prefixes
kilo-   1e3
mega-   1e6
giga-   1e9
centi-  1e-2
milli-  1e-3
micro-  1e-6
k-      kilo
M-      mega
G-      giga
c-      centi
m-      milli
u-      micro

# time
sec     s
second  sec
minute  60 s
min     minute
hour    60 min
hr      hour
day     24 hr
Hz      1/s

# length
inch    2.54 cm
in      inch
foot    12 in
feet    foot
ft      foot
yard    3 ft
yd      yard
mile    5280 ft
mi      mile

# mass
gram    1|1000 kg
g       gram
pound   0.45359237 kg
lb      pound
ounce   1|16 pound
oz      ounce
grain   1|7000 pound

# volume
liter   1000 cm^3
L       liter
gallon  231 in^3
gal     gallon
quart   1|4 gallon
pint    1|2 quart

# electromagnetism
coulomb A s
joule   kg m^2 / s^2
watt    joule/s
volt    watt/A
ohm     volt/A
siemens 1/ohm
e       1.602176634e-19 coulomb

# constants
c       299792458 m/s
pi      3.14159265358979323846

# temperature
degC    K
degF    5|9 degC
tempC(x) [1;K] (x+273.15) K ; tempC/K+(-273.15)
tempF(x) [1;K] (x+459.67) degF ; tempF/degF+(-459.67)

!unitlist ftin ft;in
";

fn catalog() -> Catalog {
    let mut builder = CatalogBuilder::new();
    let mut loader = Loader::new(&mut builder, "en_US");
    loader.load_text("test.units", DEFS);
    let (catalog, diagnostics) = builder.finish();
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    catalog
}

fn run(have: &str, want: &str, options: &Options) -> String {
    let catalog = catalog();
    let value = Quantity::parse(have, &catalog).expect(have);
    let outcome = convert(have, &value, want, &catalog, options).expect(want);
    render(&outcome, options)
}

fn terse() -> Options {
    Options {
        verbosity: Verbosity::Terse,
        ..Options::default()
    }
}

fn one_line() -> Options {
    Options {
        verbosity: Verbosity::Terse,
        one_line: true,
        ..Options::default()
    }
}

#[test]
fn liters_to_quarts() {
    assert_eq!(run("2 liters", "quarts", &terse()), "2.1133764\n0.47317647\n");
}

#[test]
fn wavelength_of_a_radio_signal() {
    assert_eq!(run("c/144MHz", "m", &one_line()), "2.0818921\n");
}

#[test]
fn fuel_consumption_is_reciprocal() {
    assert_eq!(
        run("8 liters per 100 km", "miles per gallon", &Options::default()),
        "\treciprocal conversion\n\t* 29.401823\n\t/ 0.034011497\n"
    );
}

#[test]
fn grains_to_pounds() {
    assert_eq!(run("grains", "pounds", &terse()), "0.00014285714\n7000\n");
}

#[test]
fn ohms_to_siemens_is_reciprocal() {
    assert_eq!(
        run("6 ohms", "siemens", &terse()),
        "reciprocal conversion\n0.16666667\n6\n"
    );
}

#[test]
fn mixed_sum_of_feet_and_inches() {
    assert_eq!(run("6 ft + 7 in", "m", &one_line()), "2.0066\n");
}

#[test]
fn feet_inches_and_eighths() {
    assert_eq!(run("2 m", "ft;in;1|8 in;;", &one_line()), "6;6;6;-\n");
}

#[test]
fn unit_list_alias() {
    assert_eq!(run("2 m", "ftin", &one_line()), "6;6.7401575\n");
}

#[test]
fn fahrenheit_to_celsius() {
    assert_eq!(run("tempF(75)", "tempC", &one_line()), "23.888889\n");
}

#[test]
fn kelvin_to_fahrenheit() {
    assert_eq!(run("300 K", "tempF", &one_line()), "80.33\n");
}

#[test]
fn electron_flow() {
    assert_eq!(run("5 mA", "e/sec", &one_line()), "3.1207548e16\n");
}

#[test]
fn hours_minus_seconds() {
    assert_eq!(
        run("2 hours + 23 minutes - 32 seconds", "seconds", &one_line()),
        "8548\n"
    );
}

#[test]
fn torque_times_angular_speed() {
    // Radians are dimensionless and drop out against watts.
    assert_eq!(
        run("(3 joule) (12 radian/sec)", "watts", &one_line()),
        "36\n"
    );
}

#[test]
fn conformability_error_shows_both_reduced_sides() {
    let catalog = catalog();
    let value = Quantity::parse("0.17 gallons", &catalog).unwrap();
    let err = convert(
        "0.17 gallons",
        &value,
        "tempF(20)",
        &catalog,
        &Options::default(),
    )
    .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("conformability error"), "{}", message);
    assert!(message.contains("0.00064352 m^3"), "{}", message);
}
