pub mod calculations;
pub mod constants;

pub use calculations::{
    compliance_stats, cost_per_student, daily_analysis, day_total_cost, menu_cost_records,
    purchase_cost_records, weekly_analysis, AnalysisMode, ComplianceStats, CostRecord, DayCost,
    WeeklyAnalysis,
};
pub use constants::*;
