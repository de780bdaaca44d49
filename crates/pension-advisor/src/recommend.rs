//! Recommendation Engine
//!
//! A pure rule-based mapping from a user profile to a strategy label,
//! asset allocation and tax-deduction figures. No hidden state: the same
//! profile and policy always produce the same recommendation.
//!
//! Tax rate and cap encode external tax law, so they are configuration
//! (`TaxPolicy`), not literals. All monetary figures are in 10,000-KRW
//! units and use `Decimal`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

/// Risk preference driving the equity adjustment.
///
/// Unknown strings deserialize to `Moderate` - an explicit, documented
/// default for invalid caller input, not a silent fallback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskPreference {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskPreference {
    /// Case-insensitive parse; anything unrecognized is `Moderate`
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "conservative" => Self::Conservative,
            "aggressive" => Self::Aggressive,
            _ => Self::Moderate,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }

    /// Expected annual return band, in percent
    pub fn expected_return(self) -> (u32, u32) {
        match self {
            Self::Conservative => (0, 5),
            Self::Moderate => (3, 8),
            Self::Aggressive => (5, 15),
        }
    }
}

impl<'de> Deserialize<'de> for RiskPreference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A user profile, constructed per request and never persisted
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
    /// Age in years
    pub age: u32,

    /// Monthly income, 10,000-KRW units
    pub monthly_income: Decimal,

    pub risk_preference: RiskPreference,

    /// Defaults to 65 when absent
    #[serde(default)]
    pub target_retirement_age: Option<u32>,

    /// Accumulated pension amount, 10,000-KRW units; defaults to 0
    #[serde(default)]
    pub current_pension_amount: Option<Decimal>,
}

/// Default retirement age when the profile does not set one
pub const DEFAULT_RETIREMENT_AGE: u32 = 65;

impl UserProfile {
    pub fn retirement_age(&self) -> u32 {
        self.target_retirement_age.unwrap_or(DEFAULT_RETIREMENT_AGE)
    }

    /// Years until the target retirement age; zero once past it
    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age().saturating_sub(self.age)
    }

    pub fn pension_amount(&self) -> Decimal {
        self.current_pension_amount.unwrap_or(Decimal::ZERO)
    }

    /// Reject profiles the engine cannot meaningfully score
    pub fn validate(&self) -> Result<(), AdvisorError> {
        if self.age == 0 {
            return Err(AdvisorError::InvalidProfile("age must be positive".into()));
        }
        if self.monthly_income <= Decimal::ZERO {
            return Err(AdvisorError::InvalidProfile(
                "monthly_income must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Equity-adjustment policy constants
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AllocationPolicy {
    /// Subtracted from equity for conservative profiles
    pub conservative_offset: u32,

    /// Added to equity for aggressive profiles
    pub aggressive_offset: u32,

    /// Equity never drops below this
    pub equity_floor: u32,

    /// Equity never rises above this
    pub equity_cap: u32,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            conservative_offset: 20,
            aggressive_offset: 20,
            equity_floor: 20,
            equity_cap: 80,
        }
    }
}

/// Tax-deduction policy constants (external tax law; override from env)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaxPolicy {
    /// Deductible share of annual income
    pub deduction_rate: Decimal,

    /// Absolute annual cap, 10,000-KRW units
    pub annual_cap: Decimal,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            deduction_rate: dec!(0.15),
            annual_cap: dec!(700),
        }
    }
}

/// Combined engine configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub allocation: AllocationPolicy,
    pub tax: TaxPolicy,
}

impl PolicyConfig {
    /// Environment overrides: `TAX_DEDUCTION_RATE`, `TAX_ANNUAL_CAP`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(rate) = std::env::var("TAX_DEDUCTION_RATE") {
            if let Ok(parsed) = rate.parse() {
                config.tax.deduction_rate = parsed;
            }
        }
        if let Ok(cap) = std::env::var("TAX_ANNUAL_CAP") {
            if let Ok(parsed) = cap.parse() {
                config.tax.annual_cap = parsed;
            }
        }

        config
    }
}

/// Asset allocation percentages; invariant: the three shares sum to 100
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub equity: u32,
    pub mixed: u32,
    pub stable: u32,
}

impl Allocation {
    pub fn total(self) -> u32 {
        self.equity + self.mixed + self.stable
    }
}

/// Tax-deduction figures, 10,000-KRW units
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBenefit {
    pub max_annual_deduction: Decimal,
    pub current_deduction: Decimal,
    pub additional_available: Decimal,
}

/// The engine's output
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub strategy: String,
    pub allocation: Allocation,
    /// Expected annual return band, e.g. "3-8%"
    pub expected_return: String,
    pub tax_benefit: TaxBenefit,
    pub years_to_retirement: u32,
    /// Order is significant and stable across runs
    pub action_items: Vec<String>,
}

/// Base allocation and strategy label per age band
fn base_allocation(age: u32) -> (&'static str, Allocation) {
    if age < 35 {
        (
            "Long-term growth strategy",
            Allocation {
                equity: 60,
                mixed: 30,
                stable: 10,
            },
        )
    } else if age <= 50 {
        (
            "Balanced growth strategy",
            Allocation {
                equity: 40,
                mixed: 40,
                stable: 20,
            },
        )
    } else {
        (
            "Stability-focused strategy",
            Allocation {
                equity: 20,
                mixed: 30,
                stable: 50,
            },
        )
    }
}

/// Apply the risk-preference offset to the equity share, rebalancing the
/// delta into stable first and mixed second so the total stays at 100.
fn adjust_for_risk(
    base: Allocation,
    preference: RiskPreference,
    policy: &AllocationPolicy,
) -> Allocation {
    match preference {
        RiskPreference::Moderate => base,
        RiskPreference::Conservative => {
            let target = base
                .equity
                .saturating_sub(policy.conservative_offset)
                .max(policy.equity_floor)
                .min(base.equity);
            let freed = base.equity - target;
            Allocation {
                equity: target,
                mixed: base.mixed,
                stable: base.stable + freed,
            }
        }
        RiskPreference::Aggressive => {
            let target = (base.equity + policy.aggressive_offset)
                .min(policy.equity_cap)
                .max(base.equity);
            let needed = target - base.equity;
            let from_stable = needed.min(base.stable);
            let from_mixed = needed - from_stable;
            Allocation {
                equity: target,
                mixed: base.mixed - from_mixed,
                stable: base.stable - from_stable,
            }
        }
    }
}

/// Tax-deduction ceiling: `min(monthly_income x 12 x rate, annual_cap)`.
/// Monotonically non-decreasing in income and capped at the maximum.
fn tax_benefit(profile: &UserProfile, policy: &TaxPolicy) -> TaxBenefit {
    let annual_income = profile.monthly_income * dec!(12);
    let max_annual_deduction = (annual_income * policy.deduction_rate).min(policy.annual_cap);
    let current_deduction = profile.pension_amount() * policy.deduction_rate;
    let additional_available = (max_annual_deduction - current_deduction).max(Decimal::ZERO);

    TaxBenefit {
        max_annual_deduction,
        current_deduction,
        additional_available,
    }
}

/// Multiple of annual income below which savings count as underfunded
const UNDERFUNDED_INCOME_MULTIPLE: u32 = 10;

/// Build the ordered action-item list. Order matters: callers and tests
/// rely on it being reproducible.
fn action_items(profile: &UserProfile, benefit: &TaxBenefit) -> Vec<String> {
    let mut items = Vec::new();

    if benefit.additional_available > Decimal::ZERO {
        items.push(format!(
            "Use the remaining tax-deduction headroom of {} (10,000 KRW) this year",
            benefit.additional_available.round_dp(0)
        ));
    }

    if profile.years_to_retirement() > 10
        && profile.risk_preference == RiskPreference::Conservative
    {
        items.push(
            "Retirement is more than a decade away - consider a more growth-oriented allocation"
                .into(),
        );
    }

    let annual_income = profile.monthly_income * dec!(12);
    if profile.pension_amount() < annual_income * Decimal::from(UNDERFUNDED_INCOME_MULTIPLE) {
        items.push(
            "Increase pension contributions - target 10-15x annual income by retirement".into(),
        );
    }

    items.push("Rebalance the portfolio once a year".into());
    items.push("Prefer products with a 3-year average fee rate at or below 0.5%".into());

    items
}

/// Produce a recommendation for a validated profile
pub fn recommend(profile: &UserProfile, policy: &PolicyConfig) -> Recommendation {
    let (strategy, base) = base_allocation(profile.age);
    let allocation = adjust_for_risk(base, profile.risk_preference, &policy.allocation);
    debug_assert_eq!(allocation.total(), 100);

    let benefit = tax_benefit(profile, &policy.tax);
    let items = action_items(profile, &benefit);

    let (low, high) = profile.risk_preference.expected_return();

    Recommendation {
        strategy: strategy.to_string(),
        allocation,
        expected_return: format!("{low}-{high}%"),
        tax_benefit: benefit,
        years_to_retirement: profile.years_to_retirement(),
        action_items: items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(age: u32, preference: RiskPreference) -> UserProfile {
        UserProfile {
            age,
            monthly_income: dec!(400),
            risk_preference: preference,
            target_retirement_age: None,
            current_pension_amount: None,
        }
    }

    #[test]
    fn test_allocation_sums_to_100_over_full_domain() {
        let policy = PolicyConfig::default();
        for age in [20, 30, 34, 35, 40, 50, 51, 60, 75, 90] {
            for preference in [
                RiskPreference::Conservative,
                RiskPreference::Moderate,
                RiskPreference::Aggressive,
            ] {
                let rec = recommend(&profile(age, preference), &policy);
                assert_eq!(
                    rec.allocation.total(),
                    100,
                    "age {age}, {preference:?} sums to {}",
                    rec.allocation.total()
                );
            }
        }
    }

    #[test]
    fn test_age_30_conservative_scenario() {
        let rec = recommend(&profile(30, RiskPreference::Conservative), &PolicyConfig::default());
        // equity = max(20, 60 - 20)
        assert_eq!(rec.allocation.equity, 40);
        assert_eq!(rec.allocation, Allocation { equity: 40, mixed: 30, stable: 30 });
        assert_eq!(rec.strategy, "Long-term growth strategy");
    }

    #[test]
    fn test_equity_floor_applies() {
        // 50+ base equity is 20; conservative cannot push below the floor
        let rec = recommend(&profile(60, RiskPreference::Conservative), &PolicyConfig::default());
        assert_eq!(rec.allocation.equity, 20);
        assert_eq!(rec.allocation, Allocation { equity: 20, mixed: 30, stable: 50 });
    }

    #[test]
    fn test_aggressive_rebalances_stable_then_mixed() {
        let rec = recommend(&profile(30, RiskPreference::Aggressive), &PolicyConfig::default());
        // 60 + 20 = 80; stable empties (10), the remaining 10 comes from mixed
        assert_eq!(rec.allocation, Allocation { equity: 80, mixed: 20, stable: 0 });
    }

    #[test]
    fn test_moderate_keeps_base() {
        let rec = recommend(&profile(42, RiskPreference::Moderate), &PolicyConfig::default());
        assert_eq!(rec.allocation, Allocation { equity: 40, mixed: 40, stable: 20 });
        assert_eq!(rec.expected_return, "3-8%");
    }

    #[test]
    fn test_tax_ceiling_monotone_and_capped() {
        let policy = PolicyConfig::default();
        let mut last = Decimal::ZERO;

        for income in [50, 100, 200, 300, 389, 400, 1000, 5000] {
            let p = UserProfile {
                monthly_income: Decimal::from(income),
                ..profile(40, RiskPreference::Moderate)
            };
            let benefit = tax_benefit(&p, &policy.tax);
            assert!(benefit.max_annual_deduction >= last);
            assert!(benefit.max_annual_deduction <= policy.tax.annual_cap);
            last = benefit.max_annual_deduction;
        }

        // High income pins the ceiling to the cap
        assert_eq!(last, policy.tax.annual_cap);
    }

    #[test]
    fn test_headroom_saturates_at_zero() {
        let p = UserProfile {
            monthly_income: dec!(100),
            current_pension_amount: Some(dec!(20_000)),
            ..profile(55, RiskPreference::Moderate)
        };
        let benefit = tax_benefit(&p, &TaxPolicy::default());
        assert_eq!(benefit.additional_available, Decimal::ZERO);
    }

    #[test]
    fn test_action_item_order() {
        let rec = recommend(&profile(30, RiskPreference::Conservative), &PolicyConfig::default());

        assert_eq!(rec.action_items.len(), 5);
        assert!(rec.action_items[0].contains("tax-deduction headroom"));
        assert!(rec.action_items[1].contains("growth-oriented"));
        assert!(rec.action_items[2].contains("Increase pension contributions"));
        assert!(rec.action_items[3].contains("Rebalance"));
        assert!(rec.action_items[4].contains("fee rate"));
    }

    #[test]
    fn test_conditional_items_drop_out() {
        // Well-funded, aggressive, near retirement: only the two
        // unconditional items plus headroom remain
        let p = UserProfile {
            age: 65,
            monthly_income: dec!(100),
            risk_preference: RiskPreference::Aggressive,
            target_retirement_age: Some(65),
            current_pension_amount: Some(dec!(50_000)),
        };
        let rec = recommend(&p, &PolicyConfig::default());

        assert_eq!(rec.years_to_retirement, 0);
        assert_eq!(rec.action_items.len(), 2);
        assert!(rec.action_items[0].contains("Rebalance"));
    }

    #[test]
    fn test_unknown_risk_preference_defaults_to_moderate() {
        assert_eq!(RiskPreference::parse("yolo"), RiskPreference::Moderate);
        assert_eq!(RiskPreference::parse("CONSERVATIVE"), RiskPreference::Conservative);

        let parsed: RiskPreference = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(parsed, RiskPreference::Moderate);
    }

    #[test]
    fn test_profile_validation() {
        assert!(profile(30, RiskPreference::Moderate).validate().is_ok());

        let zero_age = UserProfile { age: 0, ..profile(30, RiskPreference::Moderate) };
        assert!(zero_age.validate().is_err());

        let broke = UserProfile {
            monthly_income: Decimal::ZERO,
            ..profile(30, RiskPreference::Moderate)
        };
        assert!(broke.validate().is_err());
    }

    #[test]
    fn test_profile_deserializes_with_defaults() {
        let p: UserProfile = serde_json::from_str(
            r#"{"age": 30, "monthly_income": 400, "risk_preference": "conservative"}"#,
        )
        .unwrap();

        assert_eq!(p.retirement_age(), DEFAULT_RETIREMENT_AGE);
        assert_eq!(p.years_to_retirement(), 35);
        assert_eq!(p.pension_amount(), Decimal::ZERO);
    }
}
