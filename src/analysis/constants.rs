/// EGALIM target share of organic purchases, in percent.
pub const BIO_TARGET_PCT: f64 = 20.0;

/// EGALIM target share of sustainable-or-organic purchases, in percent.
pub const EGALIM_TARGET_PCT: f64 = 50.0;

/// Cost per student above which a day is flagged (euros).
pub const COST_PER_STUDENT_ALERT: f64 = 2.5;

/// Cost per student that fills the daily gauge (euros).
pub const COST_PER_STUDENT_GAUGE_MAX: f64 = 3.0;

/// Headcount divisor used until the user sets one.
pub const DEFAULT_STUDENT_COUNT: i64 = 100;
