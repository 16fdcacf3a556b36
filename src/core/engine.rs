use super::error::ProjectionError;
use super::types::{BalancePoint, Drawdown, MonthPoint, ValuePoint, YearPoint};

pub const MAX_YEARS: u32 = 100;
pub const DRAWDOWN_MONTH_CAP: u32 = 2000;
const DRAWDOWN_SAMPLE_POINTS: u32 = 30;

pub fn compound_lumpsum(
    principal: f64,
    annual_rate_pct: f64,
    years: u32,
) -> Result<Vec<YearPoint>, ProjectionError> {
    require_positive("principal", principal)?;
    let r = annual_rate(annual_rate_pct)?;
    require_tenure(years)?;
    growth_minus_one("rate", r, years)?;

    let series = with_baseline(years, |year| YearPoint {
        year_index: year,
        invested: principal,
        projected_value: principal * (1.0 + r).powi(year as i32),
    });
    require_finite_series("principal", series)
}

/// SIP-style monthly contributions, valued as an annuity-due so each
/// deposit earns interest in the month it is made.
pub fn compound_series_monthly(
    monthly_amount: f64,
    annual_rate_pct: f64,
    years: u32,
) -> Result<Vec<YearPoint>, ProjectionError> {
    require_positive("monthly", monthly_amount)?;
    let r = monthly_rate(annual_rate_pct)?;
    require_tenure(years)?;
    growth_minus_one("rate", r, years * 12)?;

    let series = with_baseline(years, |year| {
        let months = year * 12;
        let invested = monthly_amount * months as f64;
        let projected_value = if r == 0.0 {
            invested
        } else {
            // Never below contributions while r >= 0.
            (monthly_amount * compounded_minus_one(r, months) / r * (1.0 + r)).max(invested)
        };
        YearPoint {
            year_index: year,
            invested,
            projected_value,
        }
    });
    require_finite_series("monthly", series)
}

pub fn compound_series_yearly(
    yearly_amount: f64,
    annual_rate_pct: f64,
    years: u32,
) -> Result<Vec<YearPoint>, ProjectionError> {
    require_positive("yearly", yearly_amount)?;
    let r = annual_rate(annual_rate_pct)?;
    require_tenure(years)?;
    growth_minus_one("rate", r, years)?;

    let mut invested = 0.0;
    let mut balance = 0.0;
    let series = with_baseline(years, |year| {
        invested += yearly_amount;
        balance = (balance + yearly_amount) * (1.0 + r);
        YearPoint {
            year_index: year,
            invested,
            projected_value: balance,
        }
    });
    require_finite_series("yearly", series)
}

/// Compound annual growth rate as a fraction (1.0 is 100% a year).
pub fn cagr(initial: f64, final_value: f64, years: u32) -> Result<f64, ProjectionError> {
    require_positive("initial", initial)?;
    require_positive("final", final_value)?;
    require_tenure(years)?;

    let rate = ((final_value.ln() - initial.ln()) / years as f64).exp_m1();
    require_finite("final", rate)
}

/// Equated monthly installment for a loan repaid over `years * 12` months.
pub fn amortized_installment(
    principal: f64,
    annual_rate_pct: f64,
    years: u32,
) -> Result<f64, ProjectionError> {
    require_positive("principal", principal)?;
    let r = monthly_rate(annual_rate_pct)?;
    require_tenure(years)?;

    let months = years * 12;
    if r == 0.0 {
        return Ok(principal / months as f64);
    }
    // P*r*(1+r)^n / ((1+r)^n - 1) with g = (1+r)^n - 1.
    let growth = growth_minus_one("rate", r, months)?;
    require_finite("principal", principal * r * (1.0 + 1.0 / growth))
}

pub fn amortization_schedule(
    principal: f64,
    annual_rate_pct: f64,
    years: u32,
) -> Result<Vec<BalancePoint>, ProjectionError> {
    let installment = amortized_installment(principal, annual_rate_pct, years)?;
    let r = monthly_rate(annual_rate_pct)?;
    let total_months = years * 12;
    let growth_n = if r == 0.0 {
        0.0
    } else {
        growth_minus_one("rate", r, total_months)?
    };

    let schedule: Vec<BalancePoint> = (0..=years)
        .map(|year| {
            let months = year * 12;
            let remaining_share = if r == 0.0 {
                1.0 - months as f64 / total_months as f64
            } else {
                1.0 - compounded_minus_one(r, months) / growth_n
            };
            let outstanding = (principal * remaining_share).max(0.0);
            let paid_to_date = installment * months as f64;
            let interest_to_date = (paid_to_date - (principal - outstanding)).max(0.0);
            BalancePoint {
                year_index: year,
                outstanding,
                paid_to_date,
                interest_to_date,
            }
        })
        .collect();

    require_finite_all(
        "principal",
        schedule
            .iter()
            .flat_map(|p| [p.outstanding, p.paid_to_date, p.interest_to_date]),
    )?;
    Ok(schedule)
}

/// Value of `initial` compounding at its CAGR; the last point lands on
/// `final_value`.
pub fn growth_curve(
    initial: f64,
    final_value: f64,
    years: u32,
) -> Result<Vec<ValuePoint>, ProjectionError> {
    let rate = cagr(initial, final_value, years)?;
    let curve: Vec<ValuePoint> = (0..=years)
        .map(|year| ValuePoint {
            year_index: year,
            value: initial * (1.0 + rate).powi(year as i32),
        })
        .collect();

    require_finite_all("final", curve.iter().map(|p| p.value))?;
    Ok(curve)
}

pub fn inflate_expense(
    monthly_expense: f64,
    inflation_pct: f64,
    years: u32,
) -> Result<Vec<ValuePoint>, ProjectionError> {
    require_positive("expense", monthly_expense)?;
    let inflation = require_rate("inflation", inflation_pct)? / 100.0;
    require_tenure(years)?;
    growth_minus_one("inflation", inflation, years)?;

    let curve: Vec<ValuePoint> = (0..=years)
        .map(|year| ValuePoint {
            year_index: year,
            value: monthly_expense * (1.0 + inflation).powi(year as i32),
        })
        .collect();

    require_finite_all("expense", curve.iter().map(|p| p.value))?;
    Ok(curve)
}

/// Runs monthly withdrawals against a corpus until it is exhausted or
/// [`DRAWDOWN_MONTH_CAP`] months pass. Growth is applied before each
/// withdrawal; the last withdrawal takes only what is left.
pub fn withdrawal_drawdown(
    corpus: f64,
    annual_rate_pct: f64,
    monthly_withdrawal: f64,
) -> Result<Drawdown, ProjectionError> {
    require_positive("corpus", corpus)?;
    let r = monthly_rate(annual_rate_pct)?;
    require_positive("withdrawal", monthly_withdrawal)?;

    let mut balances = Vec::with_capacity(DRAWDOWN_MONTH_CAP as usize + 1);
    balances.push(corpus);
    let mut balance = corpus;
    let mut total_withdrawn = 0.0;

    while balances.len() <= DRAWDOWN_MONTH_CAP as usize {
        let grown = balance * (1.0 + r);
        if !grown.is_finite() {
            return Err(too_large_to_compound("rate", DRAWDOWN_MONTH_CAP));
        }
        let taken = monthly_withdrawal.min(grown);
        balance = grown - taken;
        total_withdrawn += taken;
        balances.push(balance);
        if balance <= 0.0 {
            break;
        }
    }

    let months_lasted = (balances.len() - 1) as u32;
    Ok(Drawdown {
        months_lasted,
        sustainable: balance > 0.0,
        total_withdrawn: require_finite("withdrawal", total_withdrawn)?,
        points: sample_months(&balances),
    })
}

fn sample_months(balances: &[f64]) -> Vec<MonthPoint> {
    let last = (balances.len() - 1) as u32;
    let step = (last / DRAWDOWN_SAMPLE_POINTS).max(1);
    let mut points: Vec<MonthPoint> = (0..=last)
        .step_by(step as usize)
        .map(|month| MonthPoint {
            month,
            balance: balances[month as usize],
        })
        .collect();
    if points.last().map(|p| p.month) != Some(last) {
        points.push(MonthPoint {
            month: last,
            balance: balances[last as usize],
        });
    }
    points
}

fn with_baseline(years: u32, point: impl FnMut(u32) -> YearPoint) -> Vec<YearPoint> {
    let mut series = Vec::with_capacity(years as usize + 1);
    series.push(YearPoint {
        year_index: 0,
        invested: 0.0,
        projected_value: 0.0,
    });
    series.extend((1..=years).map(point));
    series
}

/// `(1 + r)^periods - 1` without cancellation for small `r`.
fn compounded_minus_one(r: f64, periods: u32) -> f64 {
    (periods as f64 * r.ln_1p()).exp_m1()
}

fn growth_minus_one(field: &'static str, r: f64, periods: u32) -> Result<f64, ProjectionError> {
    let growth = compounded_minus_one(r, periods);
    if !growth.is_finite() {
        return Err(too_large_to_compound(field, periods));
    }
    Ok(growth)
}

fn too_large_to_compound(field: &'static str, periods: u32) -> ProjectionError {
    ProjectionError::invalid(
        field,
        format!("is too large to compound over {periods} periods"),
    )
}

fn annual_rate(annual_rate_pct: f64) -> Result<f64, ProjectionError> {
    Ok(require_rate("rate", annual_rate_pct)? / 100.0)
}

fn monthly_rate(annual_rate_pct: f64) -> Result<f64, ProjectionError> {
    Ok(require_rate("rate", annual_rate_pct)? / 12.0 / 100.0)
}

fn require_positive(field: &'static str, value: f64) -> Result<f64, ProjectionError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ProjectionError::invalid(field, "must be > 0"));
    }
    Ok(value)
}

fn require_rate(field: &'static str, value: f64) -> Result<f64, ProjectionError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ProjectionError::invalid(field, "must be >= 0"));
    }
    Ok(value)
}

fn require_tenure(years: u32) -> Result<u32, ProjectionError> {
    if years == 0 || years > MAX_YEARS {
        return Err(ProjectionError::invalid(
            "years",
            format!("must be between 1 and {MAX_YEARS}"),
        ));
    }
    Ok(years)
}

fn require_finite(field: &'static str, value: f64) -> Result<f64, ProjectionError> {
    require_finite_all(field, std::iter::once(value))?;
    Ok(value)
}

fn require_finite_all(
    field: &'static str,
    mut values: impl Iterator<Item = f64>,
) -> Result<(), ProjectionError> {
    if !values.all(f64::is_finite) {
        return Err(ProjectionError::invalid(field, "is too large to project"));
    }
    Ok(())
}

fn require_finite_series(
    field: &'static str,
    series: Vec<YearPoint>,
) -> Result<Vec<YearPoint>, ProjectionError> {
    require_finite_all(
        field,
        series.iter().flat_map(|p| [p.invested, p.projected_value]),
    )?;
    Ok(series)
}
