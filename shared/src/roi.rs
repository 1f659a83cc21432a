//! ROI estimation for warehouse maturity assessments
//!
//! Pure functions only: questionnaire answers in, [`RoiResult`] out.
//!
//! The model:
//! 1. financial metrics are read from fixed questions and scaled by unit;
//! 2. each assessment category is scored, its shortfall from the maximum is
//!    the improvement potential;
//! 3. eight savings categories apply a realization factor to a base cost,
//!    scaled by the potential of the category that drives them, then clamped
//!    to a floor and (for quality and compliance) a revenue cap;
//! 4. ROI, payback and a three-year projection follow from the total.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::models::{find_question, ids, questions_in, Category};
use crate::types::Answers;

/// Highest score a maturity answer can contribute
pub const MAX_ANSWER_SCORE: i64 = 4;

/// Numeric answers are clamped to this before unit scaling
pub const MAX_NUMERIC_ANSWER: i64 = 1_000_000_000_000;

/// Horizon used for ROI and projections
pub const PROJECTION_YEARS: u32 = 3;

/// Number of improvement areas reported
pub const TOP_IMPROVEMENT_AREAS: usize = 3;

/// Annual cost of one square foot of warehouse space
pub const SPACE_COST_PER_SQ_FT: Decimal = Decimal::TEN;
/// Inventory value as a share of revenue
pub const INVENTORY_TO_REVENUE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);
/// Annual carrying cost as a share of inventory value
pub const INVENTORY_CARRYING_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 2);
/// Cost of poor quality as a share of revenue
pub const QUALITY_COST_TO_REVENUE: Decimal = Decimal::from_parts(3, 0, 0, false, 2);
/// Compliance cost as a share of revenue
pub const COMPLIANCE_COST_TO_REVENUE: Decimal = Decimal::from_parts(15, 0, 0, false, 3);

/// Quality savings never exceed 0.5% of revenue
pub const QUALITY_REVENUE_CAP: Decimal = Decimal::from_parts(5, 0, 0, false, 3);
/// Compliance savings never exceed 0.2% of revenue
pub const COMPLIANCE_REVENUE_CAP: Decimal = Decimal::from_parts(2, 0, 0, false, 3);

const fn rate(hundredths: u32) -> Decimal {
    Decimal::from_parts(hundredths, 0, 0, false, 2)
}

// ============================================================================
// Inputs
// ============================================================================

/// Parse an answer as a number. `None` when it is missing, not numeric, or
/// too large for a `Decimal`.
pub fn parse_answer(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => {
            let cleaned = s.trim().replace(',', "");
            Decimal::from_str(&cleaned)
                .ok()
                .or_else(|| Decimal::from_scientific(&cleaned).ok())
        }
        _ => None,
    }
}

/// Coerce an answer to a number. Missing, empty or unparseable values are zero.
pub fn answer_value(value: &Value) -> Decimal {
    parse_answer(value).unwrap_or_default()
}

/// Financial figures in absolute currency units (square feet for space)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialMetrics {
    pub annual_revenue: Decimal,
    pub fte_count: Decimal,
    pub cost_per_fte: Decimal,
    pub annual_waste_value: Decimal,
    pub transportation_cost: Decimal,
    pub warehouse_size: Decimal,
    pub license_cost: Decimal,
    pub implementation_cost: Decimal,
}

impl FinancialMetrics {
    pub fn from_answers(answers: &Answers) -> Self {
        Self {
            annual_revenue: scaled_metric(answers, ids::ANNUAL_REVENUE),
            fte_count: scaled_metric(answers, ids::FTE_COUNT),
            cost_per_fte: scaled_metric(answers, ids::COST_PER_FTE),
            annual_waste_value: scaled_metric(answers, ids::ANNUAL_WASTE_VALUE),
            transportation_cost: scaled_metric(answers, ids::TRANSPORTATION_COST),
            warehouse_size: scaled_metric(answers, ids::WAREHOUSE_SIZE),
            license_cost: scaled_metric(answers, ids::LICENSE_COST),
            implementation_cost: scaled_metric(answers, ids::IMPLEMENTATION_COST),
        }
    }

    pub fn labor_cost(&self) -> Decimal {
        self.fte_count * self.cost_per_fte
    }

    /// License plus implementation
    pub fn total_cost(&self) -> Decimal {
        self.license_cost + self.implementation_cost
    }
}

fn scaled_metric(answers: &Answers, id: &str) -> Decimal {
    let raw = answers
        .get(id)
        .map(answer_value)
        .unwrap_or_default()
        .clamp(Decimal::ZERO, Decimal::from(MAX_NUMERIC_ANSWER));
    let multiplier = find_question(id)
        .and_then(|q| q.unit)
        .map(|unit| unit.multiplier())
        .unwrap_or(Decimal::ONE);
    raw * multiplier
}

// ============================================================================
// Category scores
// ============================================================================

/// Maturity score for one assessment category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryScore {
    pub category: Category,
    pub label: String,
    pub score: Decimal,
    pub max_score: Decimal,
    pub percent_score: Decimal,
    pub improvement_potential: Decimal,
    pub question_count: usize,
    pub answered_count: usize,
}

impl CategoryScore {
    /// Share of the maximum score still missing, in 0..=1
    pub fn potential_fraction(&self) -> Decimal {
        if self.max_score.is_zero() {
            return Decimal::ZERO;
        }
        (self.max_score - self.score) / self.max_score
    }
}

/// Score every assessment category
pub fn score_categories(answers: &Answers) -> Vec<CategoryScore> {
    Category::ASSESSMENT
        .iter()
        .map(|&category| score_category(answers, category))
        .collect()
}

/// Score a single category: sum of answers over 4 × question count
pub fn score_category(answers: &Answers, category: Category) -> CategoryScore {
    let max_answer = Decimal::from(MAX_ANSWER_SCORE);
    let mut score = Decimal::ZERO;
    let mut question_count = 0;
    let mut answered_count = 0;

    for question in questions_in(category) {
        question_count += 1;
        if let Some(value) = answers.get(question.id).filter(|v| !v.is_null()) {
            answered_count += 1;
            score += answer_value(value).clamp(Decimal::ZERO, max_answer);
        }
    }

    let max_score = max_answer * Decimal::from(question_count);
    let percent = if max_score.is_zero() {
        Decimal::ZERO
    } else {
        score / max_score * Decimal::ONE_HUNDRED
    };

    CategoryScore {
        category,
        label: category.display_name().to_string(),
        score,
        max_score,
        percent_score: round2(percent),
        improvement_potential: round2(Decimal::ONE_HUNDRED - percent),
        question_count,
        answered_count,
    }
}

// ============================================================================
// Savings
// ============================================================================

/// Areas where savings are estimated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SavingsCategory {
    Labor,
    Inventory,
    Waste,
    Space,
    Transportation,
    Productivity,
    Quality,
    Compliance,
}

impl SavingsCategory {
    pub const ALL: [SavingsCategory; 8] = [
        SavingsCategory::Labor,
        SavingsCategory::Inventory,
        SavingsCategory::Waste,
        SavingsCategory::Space,
        SavingsCategory::Transportation,
        SavingsCategory::Productivity,
        SavingsCategory::Quality,
        SavingsCategory::Compliance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SavingsCategory::Labor => "Labor",
            SavingsCategory::Inventory => "Inventory Carrying Cost",
            SavingsCategory::Waste => "Waste Reduction",
            SavingsCategory::Space => "Space Utilization",
            SavingsCategory::Transportation => "Transportation",
            SavingsCategory::Productivity => "Productivity",
            SavingsCategory::Quality => "Quality",
            SavingsCategory::Compliance => "Compliance",
        }
    }

    /// Assessment category whose improvement potential drives this saving
    pub fn driver(&self) -> Category {
        match self {
            SavingsCategory::Labor => Category::LaborManagement,
            SavingsCategory::Inventory | SavingsCategory::Waste => Category::InventoryManagement,
            SavingsCategory::Space => Category::WarehouseOperations,
            SavingsCategory::Transportation => Category::TransportationLogistics,
            SavingsCategory::Productivity => Category::TechnologySystems,
            SavingsCategory::Quality | SavingsCategory::Compliance => Category::QualityCompliance,
        }
    }

    /// Share of the theoretical saving expected to be realized
    pub fn realization_factor(&self) -> Decimal {
        match self {
            SavingsCategory::Labor => rate(30),
            SavingsCategory::Inventory => rate(35),
            SavingsCategory::Waste => rate(45),
            SavingsCategory::Space => rate(20),
            SavingsCategory::Transportation => rate(20),
            SavingsCategory::Productivity => rate(15),
            SavingsCategory::Quality => rate(25),
            SavingsCategory::Compliance => rate(20),
        }
    }

    /// Minimum saving, as a share of the base cost
    pub fn floor_rate(&self) -> Decimal {
        match self {
            SavingsCategory::Labor | SavingsCategory::Transportation => rate(1),
            SavingsCategory::Inventory | SavingsCategory::Space | SavingsCategory::Productivity => {
                rate(2)
            }
            SavingsCategory::Waste | SavingsCategory::Quality | SavingsCategory::Compliance => {
                rate(5)
            }
        }
    }

    /// Maximum saving, as a share of revenue
    pub fn revenue_cap(&self) -> Option<Decimal> {
        match self {
            SavingsCategory::Quality => Some(QUALITY_REVENUE_CAP),
            SavingsCategory::Compliance => Some(COMPLIANCE_REVENUE_CAP),
            _ => None,
        }
    }

    /// Annual cost the saving is taken from
    pub fn base_cost(&self, metrics: &FinancialMetrics) -> Decimal {
        match self {
            SavingsCategory::Labor | SavingsCategory::Productivity => metrics.labor_cost(),
            SavingsCategory::Inventory => {
                metrics.annual_revenue * INVENTORY_TO_REVENUE * INVENTORY_CARRYING_RATE
            }
            SavingsCategory::Waste => metrics.annual_waste_value,
            SavingsCategory::Space => metrics.warehouse_size * SPACE_COST_PER_SQ_FT,
            SavingsCategory::Transportation => metrics.transportation_cost,
            SavingsCategory::Quality => metrics.annual_revenue * QUALITY_COST_TO_REVENUE,
            SavingsCategory::Compliance => metrics.annual_revenue * COMPLIANCE_COST_TO_REVENUE,
        }
    }

    /// Estimated annual saving for a given improvement potential (0..=1)
    pub fn estimate(&self, metrics: &FinancialMetrics, potential_fraction: Decimal) -> Decimal {
        let base = self.base_cost(metrics);
        let potential = potential_fraction.clamp(Decimal::ZERO, Decimal::ONE);
        let estimate = (base * self.realization_factor() * potential).max(base * self.floor_rate());
        let capped = match self.revenue_cap() {
            Some(cap) => estimate.min(metrics.annual_revenue * cap),
            None => estimate,
        };
        round2(capped)
    }
}

impl std::fmt::Display for SavingsCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of the savings breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsItem {
    pub category: SavingsCategory,
    pub label: String,
    pub amount: Decimal,
    /// Share of annual savings, 0 when there are no savings
    pub percentage: Decimal,
    pub driver: Category,
}

// ============================================================================
// Results
// ============================================================================

/// Overall maturity band
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    Initial,
    Developing,
    Defined,
    Managed,
    Optimized,
}

impl MaturityLevel {
    pub fn from_score(percent: Decimal) -> Self {
        if percent < Decimal::from(20) {
            MaturityLevel::Initial
        } else if percent < Decimal::from(40) {
            MaturityLevel::Developing
        } else if percent < Decimal::from(60) {
            MaturityLevel::Defined
        } else if percent < Decimal::from(80) {
            MaturityLevel::Managed
        } else {
            MaturityLevel::Optimized
        }
    }
}

impl std::fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MaturityLevel::Initial => "Initial",
            MaturityLevel::Developing => "Developing",
            MaturityLevel::Defined => "Defined",
            MaturityLevel::Managed => "Managed",
            MaturityLevel::Optimized => "Optimized",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoiSummary {
    pub total_investment: Decimal,
    pub annual_savings: Decimal,
    pub three_year_savings: Decimal,
    pub net_benefit: Decimal,
    pub roi_percent: Decimal,
    /// `None` when there are no savings to pay the investment back
    pub payback_period_months: Option<u32>,
    pub overall_score: Decimal,
    pub maturity_level: MaturityLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImprovementArea {
    pub category: Category,
    pub label: String,
    pub percent_score: Decimal,
    pub improvement_potential: Decimal,
    pub potential_savings: Decimal,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionYear {
    pub year: u32,
    pub cost: Decimal,
    pub savings: Decimal,
    pub net_benefit: Decimal,
    pub cumulative_net_benefit: Decimal,
}

/// Full ROI estimate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoiResult {
    pub summary: RoiSummary,
    pub financials: FinancialMetrics,
    pub category_scores: Vec<CategoryScore>,
    pub improvement_areas: Vec<ImprovementArea>,
    pub savings_breakdown: Vec<SavingsItem>,
    pub projections: Vec<ProjectionYear>,
}

/// Compute the ROI estimate for a set of answers
pub fn calculate_roi(answers: &Answers) -> RoiResult {
    let financials = FinancialMetrics::from_answers(answers);
    let category_scores = score_categories(answers);

    let savings_breakdown = savings_breakdown(&financials, &category_scores);
    let annual_savings: Decimal = savings_breakdown.iter().map(|item| item.amount).sum();
    let total_cost = financials.total_cost();
    let years = Decimal::from(PROJECTION_YEARS);
    let three_year_savings = annual_savings * years;

    let roi_percent = if total_cost.is_zero() {
        Decimal::ZERO
    } else {
        round2((three_year_savings - total_cost) / total_cost * Decimal::ONE_HUNDRED)
    };

    let payback_period_months = if annual_savings.is_zero() {
        None
    } else {
        (total_cost / annual_savings * Decimal::from(12))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
    };

    let overall_score = overall_score(&category_scores);

    RoiResult {
        summary: RoiSummary {
            total_investment: total_cost,
            annual_savings,
            three_year_savings,
            net_benefit: three_year_savings - total_cost,
            roi_percent,
            payback_period_months,
            overall_score,
            maturity_level: MaturityLevel::from_score(overall_score),
        },
        improvement_areas: improvement_areas(&category_scores, &savings_breakdown),
        projections: projections(&financials, annual_savings),
        financials,
        category_scores,
        savings_breakdown,
    }
}

fn savings_breakdown(metrics: &FinancialMetrics, scores: &[CategoryScore]) -> Vec<SavingsItem> {
    let mut items: Vec<SavingsItem> = SavingsCategory::ALL
        .iter()
        .map(|&category| {
            let driver = category.driver();
            let potential = scores
                .iter()
                .find(|s| s.category == driver)
                .map(CategoryScore::potential_fraction)
                .unwrap_or(Decimal::ONE);
            SavingsItem {
                category,
                label: category.label().to_string(),
                amount: category.estimate(metrics, potential),
                percentage: Decimal::ZERO,
                driver,
            }
        })
        .collect();

    let total: Decimal = items.iter().map(|item| item.amount).sum();
    if !total.is_zero() {
        for item in &mut items {
            item.percentage = round2(item.amount / total * Decimal::ONE_HUNDRED);
        }
    }
    items
}

fn overall_score(scores: &[CategoryScore]) -> Decimal {
    let score: Decimal = scores.iter().map(|s| s.score).sum();
    let max: Decimal = scores.iter().map(|s| s.max_score).sum();
    if max.is_zero() {
        return Decimal::ZERO;
    }
    round2(score / max * Decimal::ONE_HUNDRED)
}

/// Categories with room to improve, ranked by the savings they drive
fn improvement_areas(scores: &[CategoryScore], breakdown: &[SavingsItem]) -> Vec<ImprovementArea> {
    let mut areas: Vec<ImprovementArea> = scores
        .iter()
        .filter(|s| s.improvement_potential > Decimal::ZERO)
        .map(|s| ImprovementArea {
            category: s.category,
            label: s.label.clone(),
            percent_score: s.percent_score,
            improvement_potential: s.improvement_potential,
            potential_savings: breakdown
                .iter()
                .filter(|item| item.driver == s.category)
                .map(|item| item.amount)
                .sum(),
            recommendation: s.category.recommendation().to_string(),
        })
        .collect();

    areas.sort_by(|a, b| {
        b.potential_savings
            .cmp(&a.potential_savings)
            .then_with(|| a.percent_score.cmp(&b.percent_score))
            .then_with(|| a.label.cmp(&b.label))
    });
    areas.truncate(TOP_IMPROVEMENT_AREAS);
    areas
}

/// Year 1 carries license and implementation; later years carry license only
fn projections(metrics: &FinancialMetrics, annual_savings: Decimal) -> Vec<ProjectionYear> {
    (1..=PROJECTION_YEARS)
        .scan(Decimal::ZERO, |cumulative, year| {
            let cost = if year == 1 {
                metrics.total_cost()
            } else {
                metrics.license_cost
            };
            let net_benefit = annual_savings - cost;
            *cumulative += net_benefit;
            Some(ProjectionYear {
                year,
                cost,
                savings: annual_savings,
                net_benefit,
                cumulative_net_benefit: *cumulative,
            })
        })
        .collect()
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
