//! Free-text ingredient parsing.
//!
//! Turns the loosely formatted lines a generative model writes
//! ("2 1/2 cups all-purpose flour, sifted", "salt to taste",
//! "onions (2) chopped") into `{name, quantity, unit}` records.
//!
//! Parsing is a fixed chain of pattern attempts, most specific first. The
//! first attempt that matches wins, so the order of [`ATTEMPTS`] is part of
//! the behaviour. Parsing never fails: anything unrecognised comes back as
//! the whole line with quantity 1 and no unit.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Unit marker for lines such as "salt to taste" that carry no amount.
pub const SPECIAL_UNIT: &str = "special";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    /// Unit as written (lowercased), not yet mapped to a base unit.
    pub unit: String,
}

impl Ingredient {
    pub fn is_special(&self) -> bool {
        self.unit == SPECIAL_UNIT
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quantity > 0.0 {
            write!(f, "{} ", self.quantity)?;
        }
        if !self.unit.is_empty() && !self.is_special() {
            write!(f, "{} ", self.unit)?;
        }
        write!(f, "{}", self.name)?;
        if self.is_special() && self.quantity == 0.0 {
            write!(f, " (to taste/as needed)")?;
        }
        Ok(())
    }
}

// Mixed number, range, fraction, decimal, integer. Order matters: the
// alternation is leftmost-first.
const QTY: &str = r"(?:[0-9]+\s+[0-9]+\s*/\s*[0-9]+|[0-9]+\s*-\s*[0-9]+|[0-9]+\s*/\s*[0-9]+|[0-9]*\.[0-9]+|[0-9]+)";

const UNIT_WORDS: &[&str] = &[
    "tablespoons?",
    "tbsps?",
    "tbs",
    "teaspoons?",
    "tsps?",
    "ts",
    "t",
    "cups?",
    "c",
    "ounces?",
    "oz",
    "pounds?",
    "lbs?",
    "milligrams?",
    "mg",
    "kilograms?",
    "kgs?",
    "grams?",
    "gms?",
    "gr",
    "g",
    "milliliters?",
    "millilitres?",
    "ml",
    "liters?",
    "litres?",
    "l",
    "pinch(?:es)?",
    "dash(?:es)?",
    "cloves?",
    "cans?",
    "packages?",
    "pkgs?",
    "sticks?",
    "bunch(?:es)?",
    "heads?",
    "slices?",
    "pieces?",
    "pcs?",
    "p",
];

/// Recognised unit. The closing word boundary keeps "t" from matching the
/// start of "tomato"; there is no opening one so "14oz" still splits. A
/// trailing period ("tbsp.") belongs to the unit.
static UNIT: LazyLock<String> =
    LazyLock::new(|| format!(r"(?:{})\b\.?", UNIT_WORDS.join("|")));

fn compile(pattern: &str) -> Regex {
    // Patterns are assembled from the constants above; a failure here is a
    // programming error caught by the unit tests.
    Regex::new(pattern).expect("ingredient pattern must compile")
}

static SPECIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(?:to taste|as needed|for garnish|optional)"));

static QTY_UNIT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?is)^({QTY})\s*({})\s+(.+)$", UNIT.as_str())));

static QTY_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?is)^({QTY})\s+(.+)$")));

static LEADING_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?is)^({})\s+(.+)$", UNIT.as_str())));

static ONLY_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?is)^({})$", UNIT.as_str())));

static PAREN_QTY_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?is)^(.*?)\s*\(\s*({QTY})\s*({})(.*?)\s*\)(.*)$",
        UNIT.as_str()
    ))
});

static PAREN_QTY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?is)^(.*?)\s*\(\s*({QTY})(.*?)\s*\)(.*)$")));

static TRAILING_QTY_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?is)^(.*?)\s+({QTY})\s*({})?$", UNIT.as_str())));

static TRAILING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?s)^(.*?)\s*([0-9]+\.?[0-9]*)$"));

static STARTS_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[+-]?(?:[0-9]|\.[0-9])"));

/// A parsing rule: a name for logging and the pure matching function.
pub type Attempt = (&'static str, fn(&str) -> Option<Ingredient>);

/// Parsing rules in priority order.
pub const ATTEMPTS: &[Attempt] = &[
    ("quantity-unit-name", quantity_unit_name),
    ("quantity-name", quantity_name),
    ("paren-quantity-unit", paren_quantity_unit),
    ("paren-quantity", paren_quantity),
    ("trailing-quantity-unit", trailing_quantity_unit),
    ("trailing-number", trailing_number),
];

/// Parse one raw ingredient line.
pub fn parse_ingredient(raw: &str) -> Ingredient {
    let line = raw.trim();

    if SPECIAL_RE.is_match(line) {
        trace!(line, "special quantity marker");
        return Ingredient {
            name: line.to_string(),
            quantity: 0.0,
            unit: SPECIAL_UNIT.to_string(),
        };
    }

    let parsed = ATTEMPTS.iter().find_map(|(label, attempt)| {
        let found = attempt(line)?;
        trace!(line, attempt = *label, "ingredient matched");
        Some(found)
    });

    let mut ingredient = parsed.unwrap_or_else(|| {
        debug!(line, "no quantity found, keeping the whole line as the name");
        Ingredient {
            name: line.to_string(),
            quantity: 1.0,
            unit: String::new(),
        }
    });

    ingredient.name = ingredient.name.trim().to_string();
    ingredient.unit = ingredient.unit.trim().to_string();
    if ingredient.name.is_empty() && !line.is_empty() {
        ingredient.name = line.to_string();
    }
    if !ingredient.quantity.is_finite() || (ingredient.quantity == 0.0 && !ingredient.is_special())
    {
        ingredient.quantity = 1.0;
    }
    ingredient
}

/// Parse every line of a recipe, preserving order.
pub fn parse_ingredients<S: AsRef<str>>(lines: &[S]) -> Vec<Ingredient> {
    lines.iter().map(|l| parse_ingredient(l.as_ref())).collect()
}

/// True when `word` is, in its entirety, a recognised unit spelling.
pub fn is_unit_word(word: &str) -> bool {
    ONLY_UNIT_RE.is_match(word.trim())
}

/// Numeric value of a quantity token. Ranges give their midpoint;
/// anything unreadable (including a zero denominator) gives 1.
pub fn parse_quantity(token: &str) -> f64 {
    let token = token.trim();
    if let Some((low, high)) = token.split_once('-') {
        return match (parse_number(low), parse_number(high)) {
            (Some(low), Some(high)) => (low + high) / 2.0,
            _ => 1.0,
        };
    }
    if let Some((left, denominator)) = token.split_once('/') {
        let mut parts = left.split_whitespace();
        let (whole, numerator) = match (parts.next(), parts.next()) {
            (Some(whole), Some(numerator)) => (parse_number(whole), parse_number(numerator)),
            (Some(numerator), None) => (Some(0.0), parse_number(numerator)),
            _ => (None, None),
        };
        return match (whole, numerator, parse_number(denominator)) {
            (Some(whole), Some(numerator), Some(denominator)) if denominator != 0.0 => {
                whole + numerator / denominator
            }
            _ => 1.0,
        };
    }
    parse_number(token).unwrap_or(1.0)
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().trim_end_matches('.').parse::<f64>().ok()
}

fn unit_of(m: regex::Match<'_>) -> String {
    m.as_str().trim().to_lowercase()
}

fn join_around(before: &str, after: &str) -> String {
    let (before, after) = (before.trim(), after.trim());
    match (before.is_empty(), after.is_empty()) {
        (_, true) => before.to_string(),
        (true, false) => after.to_string(),
        (false, false) => format!("{before} {after}"),
    }
}

fn looks_numeric(s: &str) -> bool {
    STARTS_NUMERIC_RE.is_match(s.trim())
}

/// "2 cups flour"
fn quantity_unit_name(line: &str) -> Option<Ingredient> {
    let caps = QTY_UNIT_NAME_RE.captures(line)?;
    Some(Ingredient {
        quantity: parse_quantity(&caps[1]),
        unit: unit_of(caps.get(2)?),
        name: caps[3].trim().to_string(),
    })
}

/// "2 eggs"; also the degenerate "2 cups" where the leftover is only a unit.
fn quantity_name(line: &str) -> Option<Ingredient> {
    let caps = QTY_NAME_RE.captures(line)?;
    let quantity = parse_quantity(&caps[1]);
    let rest = caps[2].trim();

    if let Some(inner) = LEADING_UNIT_RE.captures(rest) {
        return Some(Ingredient {
            name: inner[2].trim().to_string(),
            quantity,
            unit: unit_of(inner.get(1)?),
        });
    }
    if let Some(inner) = ONLY_UNIT_RE.captures(rest) {
        return Some(Ingredient {
            name: String::new(),
            quantity,
            unit: unit_of(inner.get(1)?),
        });
    }
    Some(Ingredient {
        name: rest.to_string(),
        quantity,
        unit: String::new(),
    })
}

/// "flour (2 cups sifted) for dusting". Text after the unit inside the
/// parentheses is dropped.
fn paren_quantity_unit(line: &str) -> Option<Ingredient> {
    let caps = PAREN_QTY_UNIT_RE.captures(line)?;
    Some(Ingredient {
        name: join_around(&caps[1], &caps[5]),
        quantity: parse_quantity(&caps[2]),
        unit: unit_of(caps.get(3)?),
    })
}

/// "onions (2) chopped"
fn paren_quantity(line: &str) -> Option<Ingredient> {
    let caps = PAREN_QTY_RE.captures(line)?;
    Some(Ingredient {
        name: join_around(&caps[1], &caps[4]),
        quantity: parse_quantity(&caps[2]),
        unit: String::new(),
    })
}

/// "All-purpose flour 2 cups"
fn trailing_quantity_unit(line: &str) -> Option<Ingredient> {
    let caps = TRAILING_QTY_UNIT_RE.captures(line)?;
    let name = caps[1].trim();
    if name.is_empty() || looks_numeric(name) {
        return None;
    }
    Some(Ingredient {
        name: name.to_string(),
        quantity: parse_quantity(&caps[2]),
        unit: caps.get(3).map(unit_of).unwrap_or_default(),
    })
}

/// "Ingredient Name 2"
fn trailing_number(line: &str) -> Option<Ingredient> {
    let caps = TRAILING_NUMBER_RE.captures(line)?;
    let name = caps[1].trim();
    if name.is_empty() || looks_numeric(name) {
        return None;
    }
    Some(Ingredient {
        name: name.to_string(),
        quantity: parse_number(&caps[2])?,
        unit: String::new(),
    })
}
