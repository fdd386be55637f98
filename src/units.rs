//! Unit-of-measure taxonomy used when shopping list quantities are summed.
//!
//! Every known spelling maps to a canonical base unit and a multiplier into
//! that base. Weight folds into grams, volume into milliliters; count-like
//! units (pieces, cans, pinches, ...) are their own base and never convert.

pub const BASE_GRAM: &str = "gram";
pub const BASE_MILLILITER: &str = "milliliter";
/// Base used for lines that carried no unit at all ("2 eggs").
pub const BASE_COUNT: &str = "unit";

/// Which optional families fold into the metric bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionPolicy {
    /// tbsp/tsp/cup → milliliter (15/5/240). Off: each is its own family.
    pub fold_spoon_measures: bool,
    /// oz/lb → gram. Off: ounce and pound are their own families.
    pub fold_imperial_weights: bool,
}

impl Default for ConversionPolicy {
    fn default() -> Self {
        Self {
            fold_spoon_measures: true,
            fold_imperial_weights: true,
        }
    }
}

impl ConversionPolicy {
    /// Spoons, cups and imperial weights all kept as separate families.
    pub fn strict() -> Self {
        Self {
            fold_spoon_measures: false,
            fold_imperial_weights: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fold {
    Always,
    SpoonMeasure,
    ImperialWeight,
}

struct UnitEntry {
    spelling: &'static str,
    base: &'static str,
    multiplier: f64,
    fold: Fold,
    /// Base reported when the entry's fold is switched off.
    own_base: &'static str,
}

const fn fixed(spelling: &'static str, base: &'static str, multiplier: f64) -> UnitEntry {
    UnitEntry {
        spelling,
        base,
        multiplier,
        fold: Fold::Always,
        own_base: base,
    }
}

const fn folded(
    spelling: &'static str,
    base: &'static str,
    multiplier: f64,
    fold: Fold,
    own_base: &'static str,
) -> UnitEntry {
    UnitEntry {
        spelling,
        base,
        multiplier,
        fold,
        own_base,
    }
}

const TBSP_ML: f64 = 15.0;
const TSP_ML: f64 = 5.0;
const CUP_ML: f64 = 240.0;
const OZ_G: f64 = 28.3495;
const LB_G: f64 = 453.592;

static UNIT_TABLE: &[UnitEntry] = &[
    // Weight
    fixed("g", BASE_GRAM, 1.0),
    fixed("gr", BASE_GRAM, 1.0),
    fixed("gram", BASE_GRAM, 1.0),
    fixed("grams", BASE_GRAM, 1.0),
    fixed("gm", BASE_GRAM, 1.0),
    fixed("gms", BASE_GRAM, 1.0),
    fixed("mg", BASE_GRAM, 0.001),
    fixed("milligram", BASE_GRAM, 0.001),
    fixed("milligrams", BASE_GRAM, 0.001),
    fixed("kg", BASE_GRAM, 1000.0),
    fixed("kgs", BASE_GRAM, 1000.0),
    fixed("kilogram", BASE_GRAM, 1000.0),
    fixed("kilograms", BASE_GRAM, 1000.0),
    folded("oz", BASE_GRAM, OZ_G, Fold::ImperialWeight, "ounce"),
    folded("ounce", BASE_GRAM, OZ_G, Fold::ImperialWeight, "ounce"),
    folded("ounces", BASE_GRAM, OZ_G, Fold::ImperialWeight, "ounce"),
    folded("lb", BASE_GRAM, LB_G, Fold::ImperialWeight, "pound"),
    folded("lbs", BASE_GRAM, LB_G, Fold::ImperialWeight, "pound"),
    folded("pound", BASE_GRAM, LB_G, Fold::ImperialWeight, "pound"),
    folded("pounds", BASE_GRAM, LB_G, Fold::ImperialWeight, "pound"),
    // Volume
    fixed("ml", BASE_MILLILITER, 1.0),
    fixed("milliliter", BASE_MILLILITER, 1.0),
    fixed("milliliters", BASE_MILLILITER, 1.0),
    fixed("millilitre", BASE_MILLILITER, 1.0),
    fixed("millilitres", BASE_MILLILITER, 1.0),
    fixed("l", BASE_MILLILITER, 1000.0),
    fixed("liter", BASE_MILLILITER, 1000.0),
    fixed("liters", BASE_MILLILITER, 1000.0),
    fixed("litre", BASE_MILLILITER, 1000.0),
    fixed("litres", BASE_MILLILITER, 1000.0),
    folded("tbsp", BASE_MILLILITER, TBSP_ML, Fold::SpoonMeasure, "tablespoon"),
    folded("tbsps", BASE_MILLILITER, TBSP_ML, Fold::SpoonMeasure, "tablespoon"),
    folded("tbs", BASE_MILLILITER, TBSP_ML, Fold::SpoonMeasure, "tablespoon"),
    folded("tablespoon", BASE_MILLILITER, TBSP_ML, Fold::SpoonMeasure, "tablespoon"),
    folded("tablespoons", BASE_MILLILITER, TBSP_ML, Fold::SpoonMeasure, "tablespoon"),
    folded("tsp", BASE_MILLILITER, TSP_ML, Fold::SpoonMeasure, "teaspoon"),
    folded("tsps", BASE_MILLILITER, TSP_ML, Fold::SpoonMeasure, "teaspoon"),
    folded("ts", BASE_MILLILITER, TSP_ML, Fold::SpoonMeasure, "teaspoon"),
    folded("teaspoon", BASE_MILLILITER, TSP_ML, Fold::SpoonMeasure, "teaspoon"),
    folded("teaspoons", BASE_MILLILITER, TSP_ML, Fold::SpoonMeasure, "teaspoon"),
    folded("c", BASE_MILLILITER, CUP_ML, Fold::SpoonMeasure, "cup"),
    folded("cup", BASE_MILLILITER, CUP_ML, Fold::SpoonMeasure, "cup"),
    folded("cups", BASE_MILLILITER, CUP_ML, Fold::SpoonMeasure, "cup"),
    // Counts and other discrete measures
    fixed("", BASE_COUNT, 1.0),
    fixed("unit", BASE_COUNT, 1.0),
    fixed("units", BASE_COUNT, 1.0),
    fixed("p", "piece", 1.0),
    fixed("pc", "piece", 1.0),
    fixed("pcs", "piece", 1.0),
    fixed("piece", "piece", 1.0),
    fixed("pieces", "piece", 1.0),
    fixed("can", "can", 1.0),
    fixed("cans", "can", 1.0),
    fixed("pkg", "package", 1.0),
    fixed("package", "package", 1.0),
    fixed("packages", "package", 1.0),
    fixed("stick", "stick", 1.0),
    fixed("sticks", "stick", 1.0),
    fixed("bunch", "bunch", 1.0),
    fixed("bunches", "bunch", 1.0),
    fixed("head", "head", 1.0),
    fixed("heads", "head", 1.0),
    fixed("slice", "slice", 1.0),
    fixed("slices", "slice", 1.0),
    fixed("clove", "clove", 1.0),
    fixed("cloves", "clove", 1.0),
    fixed("pinch", "pinch", 1.0),
    fixed("pinches", "pinch", 1.0),
    fixed("dash", "dash", 1.0),
    fixed("dashes", "dash", 1.0),
    // Non-quantifiable markers
    fixed("to taste", "to taste", 1.0),
    fixed("as needed", "as needed", 1.0),
    fixed("optional", "optional", 1.0),
    fixed("special", "special", 1.0),
];

/// A quantity re-expressed in its base unit.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseQuantity {
    pub quantity: f64,
    pub base_unit: String,
}

/// Trim, lowercase and drop a single trailing period ("Tbsp." → "tbsp").
pub fn normalize_unit(unit: &str) -> String {
    let lowered = unit.trim().to_lowercase();
    match lowered.strip_suffix('.') {
        Some(stripped) => stripped.trim_end().to_string(),
        None => lowered,
    }
}

/// Base unit and multiplier for a spelling, or `None` if the spelling is unknown.
pub fn lookup(unit: &str, policy: ConversionPolicy) -> Option<(&'static str, f64)> {
    let normalized = normalize_unit(unit);
    let entry = UNIT_TABLE.iter().find(|e| e.spelling == normalized)?;
    let folds = match entry.fold {
        Fold::Always => true,
        Fold::SpoonMeasure => policy.fold_spoon_measures,
        Fold::ImperialWeight => policy.fold_imperial_weights,
    };
    if folds {
        Some((entry.base, entry.multiplier))
    } else {
        Some((entry.own_base, 1.0))
    }
}

/// Convert a quantity into its base unit. Unknown spellings are their own
/// base (normalized spelling) with no conversion.
pub fn to_base(quantity: f64, unit: &str, policy: ConversionPolicy) -> BaseQuantity {
    match lookup(unit, policy) {
        Some((base, multiplier)) => BaseQuantity {
            quantity: quantity * multiplier,
            base_unit: base.to_string(),
        },
        None => BaseQuantity {
            quantity,
            base_unit: normalize_unit(unit),
        },
    }
}

/// Pick a human-friendly unit for a summed base quantity.
///
/// Grams switch to kilograms at 1000, milliliters to liters at 1000; every
/// other base is shown as-is. The value is rounded to two decimals.
pub fn to_display(total_base: f64, base_unit: &str) -> (f64, String) {
    let (value, label) = match base_unit {
        BASE_GRAM if total_base >= 1000.0 => (total_base / 1000.0, "kg"),
        BASE_GRAM => (total_base, "g"),
        BASE_MILLILITER if total_base >= 1000.0 => (total_base / 1000.0, "L"),
        BASE_MILLILITER => (total_base, "ml"),
        other => (total_base, other),
    };
    (round2(value), label.to_string())
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
