//! # Listing Types
//!
//! Equipment catalog types for civirent.
//! Listings are loaded from `config/equipment.toml`; a copy of that file is
//! compiled in so the catalog is never empty.

use crate::error::{CheckoutError, CheckoutResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const BUILTIN_CATALOG: &str = include_str!("../../../config/equipment.toml");

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "INR")]
    Inr,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
        }
    }

    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::Inr => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (paise).
    ///
    /// Rounds half away from zero on the decimal value as written: the
    /// scaled float is snapped to 6 places first so `1050.005` lands on
    /// `105000.5` rather than `105000.49999…`.
    ///
    /// `None` when the result is not finite or does not fit in an `i64`.
    pub fn to_smallest_unit(&self, amount: f64) -> Option<i64> {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        let scaled = amount * multiplier;
        let rounded = ((scaled * 1e6).round() / 1e6).round();
        (rounded.is_finite() && rounded.abs() < i64::MAX as f64).then(|| rounded as i64)
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rental duration tier: short (daily), medium (weekly), long (monthly)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalPlan {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl RentalPlan {
    /// All plans in display order
    pub const ALL: [RentalPlan; 3] = [RentalPlan::Daily, RentalPlan::Weekly, RentalPlan::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            RentalPlan::Daily => "daily",
            RentalPlan::Weekly => "weekly",
            RentalPlan::Monthly => "monthly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RentalPlan::Daily => "Daily",
            RentalPlan::Weekly => "Weekly",
            RentalPlan::Monthly => "Monthly",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RentalPlan::Daily => "Ideal for short-term jobs and urgent mobilizations.",
            RentalPlan::Weekly => "Best value for focused site work and batch pours.",
            RentalPlan::Monthly => "Long-term deployments with priority servicing.",
        }
    }
}

impl fmt::Display for RentalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentalPlan {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(RentalPlan::Daily),
            "weekly" => Ok(RentalPlan::Weekly),
            "monthly" => Ok(RentalPlan::Monthly),
            _ => Err(CheckoutError::UnknownPlan { plan: s.to_string() }),
        }
    }
}

/// Equipment category (fixed enumeration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Earthmoving,
    Concrete,
    Surveying,
    #[serde(rename = "Material Handling")]
    MaterialHandling,
    Compaction,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Earthmoving => "Earthmoving",
            Category::Concrete => "Concrete",
            Category::Surveying => "Surveying",
            Category::MaterialHandling => "Material Handling",
            Category::Compaction => "Compaction",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        [
            Category::Earthmoving,
            Category::Concrete,
            Category::Surveying,
            Category::MaterialHandling,
            Category::Compaction,
        ]
        .into_iter()
        .find(|c| c.label().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| CheckoutError::UnknownCategory {
            category: s.to_string(),
        })
    }
}

/// Category selector used by the catalog view ("All" or one category)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(c) => c.label(),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        trimmed.parse().map(CategoryFilter::Only)
    }
}

/// One label/value row in a listing's spec sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecPair {
    pub label: String,
    pub value: String,
}

/// Price per plan, in rupees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

impl Pricing {
    pub fn for_plan(&self, plan: RentalPlan) -> f64 {
        match plan {
            RentalPlan::Daily => self.daily,
            RentalPlan::Weekly => self.weekly,
            RentalPlan::Monthly => self.monthly,
        }
    }
}

/// Where a listing can be dispatched from, and how fast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub locations: Vec<String>,
    pub lead_time: String,
}

/// A rentable equipment unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentListing {
    /// Unique identifier (e.g., "eq-gnss-rover")
    pub id: String,

    /// Display name
    pub name: String,

    /// URL slug
    #[serde(default)]
    pub slug: String,

    pub category: Category,

    pub description: String,

    /// One-line field highlight shown on the card
    #[serde(default)]
    pub highlight: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default)]
    pub specs: Vec<SpecPair>,

    pub pricing: Pricing,

    pub availability: Availability,
}

impl EquipmentListing {
    /// Price for a plan, in rupees
    pub fn price(&self, plan: RentalPlan) -> f64 {
        self.pricing.for_plan(plan)
    }

    /// Price for a plan in paise; identical to what the order endpoint charges
    pub fn price_minor(&self, plan: RentalPlan, currency: Currency) -> Option<i64> {
        currency.to_smallest_unit(self.price(plan))
    }

    /// Case-insensitive substring match on name, description and category.
    /// `needle` must already be lowercased; an empty needle matches.
    fn matches_query(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.category.label().to_lowercase().contains(needle)
    }
}

/// Equipment catalog (static reference data)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentCatalog {
    #[serde(default)]
    pub equipment: Vec<EquipmentListing>,
}

impl EquipmentCatalog {
    pub fn new(equipment: Vec<EquipmentListing>) -> Self {
        Self { equipment }
    }

    /// The fleet shipped with the binary
    pub fn builtin() -> CheckoutResult<Self> {
        Self::from_toml(BUILTIN_CATALOG)
            .map_err(|e| CheckoutError::Internal(format!("built-in catalog is invalid: {}", e)))
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Find a listing by ID
    pub fn get(&self, id: &str) -> Option<&EquipmentListing> {
        self.equipment.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.equipment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equipment.is_empty()
    }

    /// Listings matching `query` and `category`, in catalog order.
    pub fn filter(&self, query: &str, category: CategoryFilter) -> Vec<&EquipmentListing> {
        let needle = query.trim().to_lowercase();
        self.equipment
            .iter()
            .filter(|e| e.matches_query(&needle) && category.matches(e.category))
            .collect()
    }

    /// "All" followed by each category present, in first-seen order
    pub fn categories(&self) -> Vec<CategoryFilter> {
        let mut out = vec![CategoryFilter::All];
        for listing in &self.equipment {
            let filter = CategoryFilter::Only(listing.category);
            if !out.contains(&filter) {
                out.push(filter);
            }
        }
        out
    }
}
