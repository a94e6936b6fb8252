//! Text rendering of conversion outcomes
//!
//! Presentation only: the numbers were fixed by the orchestrator. Terse
//! mode prints bare numbers (unit-list results as `;`-joined values with a
//! trailing `;-`/`;+` rounding mark); normal mode prints the classic
//! `* value` / `/ inverse` pair; verbose mode prints full equations.

use crate::convert::{Options, Outcome, Verbosity};
use crate::fmt::show_number;

/// Renders an outcome as one or more output lines.
pub fn render(outcome: &Outcome, options: &Options) -> String {
    match outcome {
        Outcome::Factor {
            have,
            want,
            value,
            inverse,
            reciprocal,
        } => render_factor(have, want, *value, *inverse, *reciprocal, options),
        Outcome::Function {
            have,
            name,
            argument,
        } => match options.verbosity {
            Verbosity::Terse => format!("{}\n", argument),
            Verbosity::Normal => format!("\t{}\n", argument),
            Verbosity::Verbose => format!("\t{} = {}({})\n", have, name, argument),
        },
        Outcome::Mixed { have, list, result } => {
            let exprs = list.exprs();
            let last = exprs.last().map(String::as_str).unwrap_or("");
            if options.verbosity == Verbosity::Terse {
                let mut parts: Vec<String> =
                    result.amounts.iter().map(|a| show_number(*a)).collect();
                if let Some(fraction) = result.fraction {
                    parts.push(show_number(fraction));
                }
                let mut s = parts.join(";");
                if result.round_delta > 0.0 {
                    s.push_str(";-");
                } else if result.round_delta < 0.0 {
                    s.push_str(";+");
                }
                s.push('\n');
                return s;
            }

            let mut parts = Vec::new();
            for (amount, expr) in result.amounts.iter().zip(exprs) {
                if *amount != 0.0 {
                    parts.push(show_unit(*amount, expr));
                }
            }
            if let Some(fraction) = result.fraction {
                if fraction != 0.0 {
                    parts.push(show_unit(fraction, last));
                }
            }

            let mut s = String::from("\t");
            if options.verbosity == Verbosity::Verbose {
                s.push_str(have);
                s.push_str(" = ");
            }
            if parts.is_empty() {
                s.push_str(&format!("0 {}", exprs[0]));
            } else {
                s.push_str(&parts.join(" + "));
            }
            if result.round_delta > 0.0 {
                s.push_str(&format!(" (rounded up to nearest {})", last));
            } else if result.round_delta < 0.0 {
                s.push_str(&format!(" (rounded down to nearest {})", last));
            }
            s.push('\n');
            s
        }
    }
}

fn render_factor(
    have: &str,
    want: &str,
    value: f64,
    inverse: f64,
    reciprocal: bool,
    options: &Options,
) -> String {
    let mut s = String::new();
    match options.verbosity {
        Verbosity::Terse => {
            if reciprocal {
                s.push_str("reciprocal conversion\n");
            }
            s.push_str(&format!("{}\n", show_number(value)));
            if !options.one_line {
                s.push_str(&format!("{}\n", show_number(inverse)));
            }
        }
        Verbosity::Normal => {
            if reciprocal {
                s.push_str("\treciprocal conversion\n");
            }
            s.push_str(&format!("\t* {}\n", show_number(value)));
            if !options.one_line {
                s.push_str(&format!("\t/ {}\n", show_number(inverse)));
            }
        }
        Verbosity::Verbose => {
            if reciprocal {
                s.push_str("\treciprocal conversion\n");
            }
            let left = if reciprocal {
                format!("1 / ({})", have)
            } else {
                have.to_string()
            };
            s.push_str(&format!("\t{} = {} {}\n", left, show_number(value), want));
            if !options.one_line {
                s.push_str(&format!(
                    "\t{} = (1 / {}) {}\n",
                    left,
                    show_number(inverse),
                    want
                ));
            }
        }
    }
    s
}

/// Formats one element of a unit-list sum, following the shape of the
/// unit expression it came from.
fn show_unit(value: f64, unit: &str) -> String {
    // Expressions with arithmetic operators are parenthesized.
    if unit.contains(['+', '-']) {
        if value == 1.0 {
            return format!("({})", unit);
        }
        return format!("{} ({})", show_number(value), unit);
    }
    // `1|n unit` fraction elements: the 1 is replaced by the value, so
    // six eighths of an inch reads `6|8 in`.
    if value == value.trunc() && value.abs() < 10000.0 && unit.starts_with("1|") {
        let digits = unit[2..].chars().take_while(|c| c.is_ascii_digit()).count();
        if (1..=3).contains(&digits) {
            return format!("{}{}", show_number(value), &unit[1..]);
        }
    }
    // Elements that begin with a number multiply explicitly.
    if unit.starts_with(|c: char| c.is_ascii_digit() || c == '.' || c == ',') {
        if value == 1.0 {
            return unit.to_string();
        }
        return format!("{} * {}", show_number(value), unit);
    }
    format!("{} {}", show_number(value), unit)
}
