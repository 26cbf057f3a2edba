use std::collections::HashMap;

use clap::ValueEnum;

use crate::analysis::constants::*;
use crate::models::{Day, Ingredient, WeekMenu};

/// A cost line tagged with its compliance flags.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostRecord {
    pub cost: f64,
    pub is_bio: bool,
    pub is_egalim: bool,
}

/// BIO / EGALIM breakdown of a set of cost records.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComplianceStats {
    pub total_cost: f64,
    pub bio_cost: f64,
    /// EGALIM-flagged cost that is not also BIO.
    pub egalim_only_cost: f64,
    /// `bio_cost + egalim_only_cost`.
    pub total_egalim_cost: f64,
    pub bio_pct: f64,
    pub egalim_pct: f64,
    /// Always `100 - bio_pct`.
    pub non_bio_pct: f64,
}

impl ComplianceStats {
    pub fn meets_bio_target(&self) -> bool {
        self.bio_pct >= BIO_TARGET_PCT
    }

    pub fn meets_egalim_target(&self) -> bool {
        self.egalim_pct >= EGALIM_TARGET_PCT
    }
}

/// Compute the BIO / EGALIM breakdown.
///
/// BIO items count toward EGALIM once. `non_bio_pct` is the complement of
/// `bio_pct`, so items that are neither BIO nor EGALIM land in it too.
pub fn compliance_stats(records: &[CostRecord]) -> ComplianceStats {
    let total_cost: f64 = records.iter().map(|r| r.cost).sum();
    let bio_cost: f64 = records.iter().filter(|r| r.is_bio).map(|r| r.cost).sum();
    let egalim_only_cost: f64 = records
        .iter()
        .filter(|r| r.is_egalim && !r.is_bio)
        .map(|r| r.cost)
        .sum();
    let total_egalim_cost = bio_cost + egalim_only_cost;

    let (bio_pct, egalim_pct) = if total_cost > 0.0 {
        (
            bio_cost / total_cost * 100.0,
            total_egalim_cost / total_cost * 100.0,
        )
    } else {
        (0.0, 0.0)
    };

    ComplianceStats {
        total_cost,
        bio_cost,
        egalim_only_cost,
        total_egalim_cost,
        bio_pct,
        egalim_pct,
        non_bio_pct: 100.0 - bio_pct,
    }
}

/// One record per dish component used in the week.
///
/// Cost is the snapshot taken when the component was added; flags come from
/// the source ingredient, and default to false when it is no longer in the
/// catalog.
pub fn menu_cost_records(items: &WeekMenu, ingredients: &[Ingredient]) -> Vec<CostRecord> {
    let by_id: HashMap<&str, &Ingredient> =
        ingredients.iter().map(|i| (i.id.as_str(), i)).collect();

    items
        .values()
        .flat_map(|item| item.components.iter())
        .map(|comp| {
            let source = by_id.get(comp.ingredient_id.as_str());
            CostRecord {
                cost: comp.cost(),
                is_bio: source.is_some_and(|i| i.is_bio),
                is_egalim: source.is_some_and(|i| i.is_egalim),
            }
        })
        .collect()
}

/// One record per catalog ingredient, costed at its total price.
pub fn purchase_cost_records(ingredients: &[Ingredient]) -> Vec<CostRecord> {
    ingredients
        .iter()
        .map(|i| CostRecord {
            cost: i.price,
            is_bio: i.is_bio,
            is_egalim: i.is_egalim,
        })
        .collect()
}

/// Cost of one day of the menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayCost {
    pub day: Day,
    pub total_cost: f64,
    pub cost_per_student: f64,
}

impl DayCost {
    pub fn is_over_alert(&self) -> bool {
        self.cost_per_student > COST_PER_STUDENT_ALERT
    }

    /// Gauge fill in [0, 1].
    pub fn gauge_fill(&self) -> f64 {
        (self.cost_per_student / COST_PER_STUDENT_GAUGE_MAX).clamp(0.0, 1.0)
    }
}

/// Sum of component costs over every item served on `day`.
pub fn day_total_cost(items: &WeekMenu, day: Day) -> f64 {
    items
        .values()
        .filter(|item| item.day == day)
        .map(|item| item.total_cost())
        .sum()
}

/// `total / student_count`, or 0 when the count is not positive.
pub fn cost_per_student(total_cost: f64, student_count: i64) -> f64 {
    if student_count > 0 {
        total_cost / student_count as f64
    } else {
        0.0
    }
}

/// Per-day totals for `days`, in the given order.
pub fn daily_analysis(items: &WeekMenu, student_count: i64, days: &[Day]) -> Vec<DayCost> {
    days.iter()
        .map(|&day| {
            let total_cost = day_total_cost(items, day);
            DayCost {
                day,
                total_cost,
                cost_per_student: cost_per_student(total_cost, student_count),
            }
        })
        .collect()
}

/// Which cost records feed the compliance breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AnalysisMode {
    /// Dish components used in the active week.
    #[default]
    Menu,
    /// Every ingredient in the catalog.
    Purchases,
}

/// Daily costs plus the compliance breakdown for the selected mode.
#[derive(Debug, Clone)]
pub struct WeeklyAnalysis {
    pub mode: AnalysisMode,
    pub student_count: i64,
    pub days: Vec<DayCost>,
    pub stats: ComplianceStats,
}

pub fn weekly_analysis(
    mode: AnalysisMode,
    items: &WeekMenu,
    ingredients: &[Ingredient],
    student_count: i64,
    days: &[Day],
) -> WeeklyAnalysis {
    let records = match mode {
        AnalysisMode::Menu => menu_cost_records(items, ingredients),
        AnalysisMode::Purchases => purchase_cost_records(ingredients),
    };

    WeeklyAnalysis {
        mode,
        student_count,
        days: daily_analysis(items, student_count, days),
        stats: compliance_stats(&records),
    }
}
