//! Source locations and build-time diagnostics

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where an entity was defined: definitions file and line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Location {
            file: file.into(),
            line,
        }
    }

    /// Location of entities that do not come from a file.
    pub fn builtin() -> Self {
        Location {
            file: "<built-in>".to_string(),
            line: 0,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}', line {}", self.file, self.line)
    }
}

/// A build-time problem attached to one entity or definition line.
///
/// Diagnostics never abort a catalog build; the loader and builder collect
/// them and the front end decides how to surface them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Diagnostic {
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.location, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let loc = Location::new("default.units", 42);
        assert_eq!(format!("{}", loc), "'default.units', line 42");

        let d = Diagnostic::new(loc, "Unit 'x' is ignored.");
        assert_eq!(format!("{}", d), "'default.units', line 42. Unit 'x' is ignored.");
    }
}
