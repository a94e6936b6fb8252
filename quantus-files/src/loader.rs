//! Line-oriented scanning of units definition files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use quantus_core::{CatalogBuilder, Diagnostic, Location};

/// Bound on `!include` nesting.
pub const MAX_INCLUDE_DEPTH: usize = 5;

/// Feeds definition files into a [`CatalogBuilder`].
pub struct Loader<'a> {
    builder: &'a mut CatalogBuilder,
    locale: String,
}

/// Per-file locale-section state.
#[derive(Default)]
struct LocaleState {
    in_locale: bool,
    wrong_locale: bool,
}

impl<'a> Loader<'a> {
    pub fn new(builder: &'a mut CatalogBuilder, locale: &str) -> Self {
        Loader {
            builder,
            locale: locale.to_string(),
        }
    }

    /// Loads one definitions file from disk. Includes are resolved
    /// relative to the file's directory.
    pub fn load_path(&mut self, path: &Path) -> io::Result<()> {
        let text = fs::read_to_string(path)?;
        let dir = path.parent().map(Path::to_path_buf);
        self.load(&path.display().to_string(), &text, dir.as_deref(), 0);
        Ok(())
    }

    /// Loads definitions from in-memory text (e.g. the built-in database).
    /// `!include` statements resolve against the working directory.
    pub fn load_text(&mut self, name: &str, text: &str) {
        self.load(name, text, None, 0);
    }

    fn note(&mut self, location: Location, message: String) {
        warn!("{}. {}", location, message);
        self.builder.report(Diagnostic::new(location, message));
    }

    fn load(&mut self, name: &str, text: &str, dir: Option<&Path>, depth: usize) {
        let raw: Vec<&str> = text.lines().collect();
        let mut state = LocaleState::default();
        let mut i = 0;
        while i < raw.len() {
            let start_line = i + 1;
            // Join continuation lines; a trailing backslash becomes a blank.
            let mut buf = String::new();
            loop {
                let line = raw[i];
                i += 1;
                match line.strip_suffix('\\') {
                    Some(stripped) => {
                        buf.push_str(stripped);
                        buf.push(' ');
                        if i >= raw.len() {
                            self.note(
                                Location::new(name, start_line),
                                format!(
                                    "The last line of '{}' is missing its continuation and is ignored.",
                                    name
                                ),
                            );
                            return;
                        }
                    }
                    None => {
                        buf.push_str(line);
                        break;
                    }
                }
            }
            let stmt = match buf.find('#') {
                Some(p) => &buf[..p],
                None => &buf[..],
            };
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            let loc = Location::new(name, start_line);
            if let Some(rest) = stmt.strip_prefix('!') {
                self.command(rest, loc, dir, depth, &mut state);
            } else if !state.wrong_locale {
                self.definition(stmt, loc);
            }
        }
    }

    fn command(
        &mut self,
        rest: &str,
        loc: Location,
        dir: Option<&Path>,
        depth: usize,
        state: &mut LocaleState,
    ) {
        let (word, arg) = split_word(rest);
        match word {
            "locale" => {
                if state.in_locale {
                    self.note(loc, "Nested locales are not allowed.".to_string());
                    return;
                }
                if arg.is_empty() {
                    self.note(loc, "No locale specified.".to_string());
                    return;
                }
                state.in_locale = true;
                if arg != self.locale {
                    state.wrong_locale = true;
                }
            }
            "endlocale" => {
                if !state.in_locale {
                    self.note(loc, "Unmatched !endlocale.".to_string());
                    return;
                }
                state.in_locale = false;
                state.wrong_locale = false;
            }
            "include" => {
                if state.wrong_locale {
                    return;
                }
                if arg.is_empty() {
                    self.note(loc, "No file name specified.".to_string());
                    return;
                }
                if depth >= MAX_INCLUDE_DEPTH {
                    self.note(
                        loc,
                        format!("Max include depth of {} exceeded.", MAX_INCLUDE_DEPTH),
                    );
                    return;
                }
                let path = resolve_include(arg, dir);
                match fs::read_to_string(&path) {
                    Ok(text) => {
                        let sub_dir = path.parent().map(Path::to_path_buf);
                        self.load(
                            &path.display().to_string(),
                            &text,
                            sub_dir.as_deref(),
                            depth + 1,
                        );
                    }
                    Err(e) => {
                        self.note(loc, format!("Cannot read '{}': {}.", path.display(), e));
                    }
                }
            }
            "unitlist" => {
                if state.wrong_locale {
                    return;
                }
                let (list_name, list) = split_word(arg);
                if list_name.is_empty() {
                    self.note(loc, "No name specified with '!unitlist'.".to_string());
                    return;
                }
                if list.is_empty() {
                    self.note(
                        loc,
                        format!("No unit list specified for '{}'.", list_name),
                    );
                    return;
                }
                self.builder.define_alias(list_name, list, loc);
            }
            _ => {
                self.note(loc, format!("Unrecognized command '!{}'.", word));
            }
        }
    }

    fn definition(&mut self, stmt: &str, loc: Location) {
        let name_end = stmt
            .find(|c: char| c.is_whitespace() || c == '(' || c == '[')
            .unwrap_or(stmt.len());
        let name = &stmt[..name_end];
        let after = &stmt[name_end..];

        if after.starts_with('(') {
            self.computed_function(name, after, loc);
        } else if after.starts_with('[') {
            self.tabular_function(name, after, loc);
        } else {
            let def = after.trim();
            if let Some(prefix_name) = name.strip_suffix('-') {
                if def.is_empty() {
                    self.note(
                        loc,
                        format!("Prefix '{}' is ignored. Definition missing.", prefix_name),
                    );
                    return;
                }
                self.builder.define_prefix(prefix_name, def, loc);
            } else {
                if def.is_empty() {
                    self.note(
                        loc,
                        format!("Unit '{}' is ignored. Definition missing.", name),
                    );
                    return;
                }
                self.builder.define_unit(name, def, loc);
            }
        }
    }

    /// `name(param) [fwddim;invdim] fwddef ; invdef`
    fn computed_function(&mut self, name: &str, after: &str, loc: Location) {
        let close = match after.find(')') {
            Some(p) => p,
            None => {
                self.note(
                    loc,
                    format!(
                        "Function '{}' is ignored. Parameter not found after '('.",
                        name
                    ),
                );
                return;
            }
        };
        let param = after[1..close].trim();
        if param.is_empty() {
            self.note(
                loc,
                format!(
                    "Function '{}' is ignored. Parameter not found after '('.",
                    name
                ),
            );
            return;
        }
        let mut rest = after[close + 1..].trim();

        let mut fwd_dim = None;
        let mut inv_dim = None;
        if let Some(stripped) = rest.strip_prefix('[') {
            let dims_end = match stripped.find(']') {
                Some(p) => p,
                None => {
                    self.note(
                        loc,
                        format!(
                            "Function '{}' is ignored. Argument dimensions not found after '['.",
                            name
                        ),
                    );
                    return;
                }
            };
            let dims = &stripped[..dims_end];
            match dims.split_once(';') {
                Some((f, i)) => {
                    fwd_dim = non_empty(f);
                    inv_dim = non_empty(i);
                }
                None => {
                    self.note(
                        loc,
                        format!(
                            "Function '{}' is ignored. Argument dimensions not found after '['.",
                            name
                        ),
                    );
                    return;
                }
            }
            rest = stripped[dims_end + 1..].trim();
        }

        let (fwd_def, inv_def) = match rest.split_once(';') {
            Some((f, i)) => (f.trim(), non_empty(i)),
            None => (rest, None),
        };
        if fwd_def.is_empty() {
            self.note(
                loc,
                format!("Function '{}' is ignored. Definition missing.", name),
            );
            return;
        }
        self.builder.define_computed(
            name,
            param,
            fwd_dim,
            inv_dim,
            fwd_def.to_string(),
            inv_def,
            loc,
        );
    }

    /// `name[resultUnit] x1 y1, x2 y2, ...`
    fn tabular_function(&mut self, name: &str, after: &str, loc: Location) {
        let close = match after.find(']') {
            Some(p) => p,
            None => {
                self.note(
                    loc,
                    format!(
                        "Function '{}' is ignored. Result unit not found after '['.",
                        name
                    ),
                );
                return;
            }
        };
        let result_unit = after[1..close].trim();
        let rest = after[close + 1..].trim();

        let mut points = Vec::new();
        for pair in rest.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let mut nums = pair.split_whitespace();
            let point = match (nums.next(), nums.next(), nums.next()) {
                (Some(x), Some(y), None) => match (x.parse::<f64>(), y.parse::<f64>()) {
                    (Ok(x), Ok(y)) => (x, y),
                    _ => {
                        self.note(
                            loc,
                            format!("Function '{}' is ignored. Bad point '{}'.", name, pair),
                        );
                        return;
                    }
                },
                _ => {
                    self.note(
                        loc,
                        format!("Function '{}' is ignored. Bad point '{}'.", name, pair),
                    );
                    return;
                }
            };
            points.push(point);
        }
        if points.len() == 1 {
            self.note(
                loc,
                format!("Function '{}' is ignored. Only one point is defined.", name),
            );
            return;
        }
        self.builder.define_tabular(name, result_unit, points, loc);
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.find(char::is_whitespace) {
        Some(p) => (&s[..p], s[p..].trim()),
        None => (s, ""),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn resolve_include(arg: &str, dir: Option<&Path>) -> PathBuf {
    let direct = PathBuf::from(arg);
    if direct.is_absolute() {
        return direct;
    }
    if let Some(dir) = dir {
        let relative = dir.join(arg);
        if relative.exists() {
            return relative;
        }
    }
    direct
}
