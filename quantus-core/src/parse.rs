//! Expression parsing and evaluation
//!
//! A hand-rolled recursive descent over the conversion grammar. There is no
//! retained AST: each production evaluates directly to a [`Quantity`], with
//! identifier leaves resolved through the catalog. Precedence, tightest
//! first: `a|b` fractions, `^`/`**` exponents, juxtaposition, `*` `/` `per`,
//! then `+` `-`. Juxtaposition binding tighter than `/` is what makes
//! `c/144MHz` mean `c / (144 MHz)`.

use crate::builtins;
use crate::catalog::{self, Catalog, Resolution};
use crate::error::{Error, Result};
use crate::fmt::show_number;
use crate::quantity::{Quantity, MAX_EVAL_DEPTH};

/// Expectation list shown when input remains after a complete expression.
const EXPECTED_TAIL: &str =
    "more name or ^ or ** or factor or * or / or 'per' or + or - or end of input";

/// Parses and evaluates an expression. `binding` supplies the value of a
/// function parameter during function application.
pub(crate) fn parse_with(
    expr: &str,
    catalog: &Catalog,
    binding: Option<(&str, &Quantity)>,
    depth: usize,
) -> Result<Quantity> {
    if depth > MAX_EVAL_DEPTH {
        return Err(Error::RecursionLimit(expr.to_string()));
    }
    let mut p = Parser {
        chars: expr.chars().collect(),
        pos: 0,
        catalog,
        binding,
        depth,
    };
    let q = p.expr()?;
    p.skip_space();
    if p.pos < p.chars.len() {
        return Err(p.expected(EXPECTED_TAIL));
    }
    Ok(q)
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !"+-*/|^();#~".contains(c)
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    catalog: &'a Catalog,
    binding: Option<(&'a str, &'a Quantity)>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_space(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// True when the input at the cursor starts with `s`.
    fn at(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    /// True when `w` appears at the cursor as a whole word.
    fn at_word(&self, w: &str) -> bool {
        self.at(w)
            && !matches!(self.chars.get(self.pos + w.len()), Some(&c) if is_name_char(c))
    }

    fn expected(&self, what: &str) -> Error {
        let after: String = self.chars[..self.pos].iter().collect();
        Error::Syntax {
            after: after.trim().to_string(),
            expected: what.to_string(),
        }
    }

    // expr := [-] term { (+|-) term }
    fn expr(&mut self) -> Result<Quantity> {
        self.skip_space();
        let negate = self.eat('-');
        let mut acc = self.term()?;
        if negate {
            acc.factor = -acc.factor;
        }
        loop {
            self.skip_space();
            if self.eat('+') {
                let t = self.term()?;
                acc.add(t, self.catalog, self.depth)?;
            } else if self.eat('-') {
                let mut t = self.term()?;
                t.factor = -t.factor;
                acc.add(t, self.catalog, self.depth)?;
            } else {
                break;
            }
        }
        Ok(acc)
    }

    // term := juxt { (* | / | 'per') juxt }
    fn term(&mut self) -> Result<Quantity> {
        let mut acc = self.juxt()?;
        loop {
            self.skip_space();
            if self.at("**") {
                // Power operator, never multiplication; handled in factor().
                return Err(self.expected("a factor before '**'"));
            }
            if self.eat('*') {
                let f = self.juxt()?;
                acc.mul(&f);
            } else if self.eat('/') {
                let f = self.juxt()?;
                acc.div(&f);
            } else if self.at_word("per") {
                self.pos += 3;
                let f = self.juxt()?;
                acc.div(&f);
            } else {
                break;
            }
        }
        Ok(acc)
    }

    // juxt := factor { factor }   (implicit multiplication)
    fn juxt(&mut self) -> Result<Quantity> {
        let mut acc = self.factor()?;
        loop {
            self.skip_space();
            if self.at_word("per") {
                break;
            }
            match self.peek() {
                Some(c)
                    if c == '('
                        || c == '~'
                        || c == '.'
                        || c.is_ascii_digit()
                        || is_name_char(c) =>
                {
                    let f = self.factor()?;
                    acc.mul(&f);
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    // factor := primary [ (^|**) factor ]   (right-associative)
    fn factor(&mut self) -> Result<Quantity> {
        let mut base = self.primary()?;
        self.skip_space();
        if self.at("**") {
            self.pos += 2;
        } else if !self.eat('^') {
            return Ok(base);
        }
        self.skip_space();
        let exp = self.factor()?;
        self.apply_exponent(&mut base, exp)?;
        Ok(base)
    }

    fn apply_exponent(&mut self, base: &mut Quantity, mut exp: Quantity) -> Result<()> {
        if !exp.is_number() {
            exp.complete_reduce_depth(self.catalog, self.depth)?;
        }
        if !exp.is_number() {
            return Err(Error::ExponentNotNumber(exp.to_string()));
        }
        let e = exp.factor;
        if base.is_number() {
            base.factor = base.factor.powf(e);
            return Ok(());
        }
        if e == e.trunc() && (i32::MIN as f64..=i32::MAX as f64).contains(&e) {
            base.pow(e as i32);
            return Ok(());
        }
        // Fractional exponent p/q: valid when the base product is a
        // perfect q-th power.
        for q in 2..=9u32 {
            let p = e * q as f64;
            if (p - p.round()).abs() < 1e-9 {
                base.root(q)?;
                base.pow(p.round() as i32);
                return Ok(());
            }
        }
        Err(Error::BadExponent(show_number(e)))
    }

    // primary := number | '(' expr ')' | ['~'] name [ '(' expr ')' ]
    fn primary(&mut self) -> Result<Quantity> {
        self.skip_space();
        match self.peek() {
            None => Err(self.expected("a factor")),
            Some('(') => {
                self.bump();
                let q = self.expr()?;
                self.skip_space();
                if !self.eat(')') {
                    return Err(self.expected("')'"));
                }
                Ok(q)
            }
            Some('~') => {
                self.bump();
                self.skip_space();
                let name = self.scan_name();
                if name.is_empty() {
                    return Err(self.expected("a function name after '~'"));
                }
                self.skip_space();
                if !self.eat('(') {
                    return Err(self.expected("'(' after function name"));
                }
                let arg = self.expr()?;
                self.skip_space();
                if !self.eat(')') {
                    return Err(self.expected("')'"));
                }
                self.apply_named(&name, arg, true)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) if is_name_char(c) => {
                let name = self.scan_name();
                if let Some((param, value)) = self.binding {
                    if name == param {
                        return Ok(value.clone());
                    }
                }
                if self.peek() == Some('(') && self.is_function(&name) {
                    self.bump();
                    let arg = self.expr()?;
                    self.skip_space();
                    if !self.eat(')') {
                        return Err(self.expected("')'"));
                    }
                    return self.apply_named(&name, arg, false);
                }
                self.resolve_name(&name)
            }
            Some(_) => Err(self.expected("a factor")),
        }
    }

    // number := numeric [ '|' numeric ]   (fraction binds tightest)
    fn number(&mut self) -> Result<Quantity> {
        let v = self.scan_number()?;
        if self.peek() == Some('|') {
            self.bump();
            self.skip_space();
            if !matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
                return Err(self.expected("a number after '|'"));
            }
            let d = self.scan_number()?;
            return Ok(Quantity::number(v / d));
        }
        Ok(Quantity::number(v))
    }

    fn scan_number(&mut self) -> Result<f64> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        // Scientific exponent, only when actually followed by digits; a
        // bare 'e' stays a name (3e = 3 * e).
        if matches!(self.peek(), Some('e') | Some('E')) {
            let mut k = self.pos + 1;
            if matches!(self.chars.get(k), Some('+') | Some('-')) {
                k += 1;
            }
            if matches!(self.chars.get(k), Some(c) if c.is_ascii_digit()) {
                self.pos = k + 1;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>().map_err(|_| self.expected("a number"))
    }

    fn scan_name(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn is_function(&self, name: &str) -> bool {
        self.catalog.function(name).is_some() || builtins::is_builtin(name)
    }

    fn apply_named(&mut self, name: &str, arg: Quantity, inverse: bool) -> Result<Quantity> {
        if let Some(f) = self.catalog.function(name).cloned() {
            return if inverse {
                f.apply_inverse(arg, self.catalog, self.depth + 1)
            } else {
                f.apply(arg, self.catalog, self.depth + 1)
            };
        }
        if builtins::is_builtin(name) {
            return if inverse {
                Err(Error::NoInverse(name.to_string()))
            } else {
                builtins::apply(name, arg, self.catalog, self.depth)
            };
        }
        Err(Error::NotAFunction(name.to_string()))
    }

    fn resolve_name(&mut self, name: &str) -> Result<Quantity> {
        if let Some(r) = self.catalog.resolve(name) {
            return Ok(resolution_to_quantity(r));
        }
        // A single trailing digit 2-9 is an exponent: ft3 = ft^3.
        // Subscripted names (name_2) are looked up literally.
        if let Some(last) = name.chars().last() {
            if matches!(last, '2'..='9') && !catalog::has_subscript(name) {
                let base = &name[..name.len() - 1];
                if !base.is_empty() {
                    if let Some(r) = self.catalog.resolve(base) {
                        let mut q = resolution_to_quantity(r);
                        q.pow(last as i32 - '0' as i32);
                        return Ok(q);
                    }
                }
            }
        }
        Err(Error::UnknownName(name.to_string()))
    }
}

fn resolution_to_quantity(r: Resolution) -> Quantity {
    match r {
        Resolution::Unit(u) => Quantity::from_factor(u),
        Resolution::Prefix(p) => Quantity::from_factor(p),
        Resolution::Prefixed { prefix, unit } => {
            let mut q = Quantity::from_factor(prefix);
            q.push_factor(unit);
            q
        }
    }
}
