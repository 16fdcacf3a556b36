mod engine;
mod error;
mod planner;
mod types;

pub use engine::{
    DRAWDOWN_MONTH_CAP, MAX_YEARS, amortization_schedule, amortized_installment, cagr,
    compound_lumpsum, compound_series_monthly, compound_series_yearly, growth_curve,
    inflate_expense, withdrawal_drawdown,
};
pub use error::ProjectionError;
pub use planner::plan;
pub use types::{
    BalancePoint, Drawdown, MonthPoint, Product, ProductInput, Projection, ValuePoint, YearPoint,
    round_currency,
};
