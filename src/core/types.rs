use std::fmt;

use serde::Serialize;

/// Calculator widgets served by the planner.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Sip,
    Lumpsum,
    Fd,
    Rd,
    Ppf,
    Nps,
    Emi,
    Cagr,
    Swp,
    Retirement,
}

impl Product {
    pub fn as_str(self) -> &'static str {
        match self {
            Product::Sip => "sip",
            Product::Lumpsum => "lumpsum",
            Product::Fd => "fd",
            Product::Rd => "rd",
            Product::Ppf => "ppf",
            Product::Nps => "nps",
            Product::Emi => "emi",
            Product::Cagr => "cagr",
            Product::Swp => "swp",
            Product::Retirement => "retirement",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rates are annual percentages (12.0 means 12% a year).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ProductInput {
    Principal {
        principal: f64,
        annual_rate_pct: f64,
        years: u32,
    },
    Monthly {
        monthly: f64,
        annual_rate_pct: f64,
        years: u32,
    },
    Yearly {
        yearly: f64,
        annual_rate_pct: f64,
        years: u32,
    },
    Growth {
        initial: f64,
        final_value: f64,
        years: u32,
    },
    Withdrawal {
        corpus: f64,
        annual_rate_pct: f64,
        monthly_withdrawal: f64,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearPoint {
    pub year_index: u32,
    pub invested: f64,
    pub projected_value: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub year_index: u32,
    pub outstanding: f64,
    pub paid_to_date: f64,
    pub interest_to_date: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuePoint {
    pub year_index: u32,
    pub value: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthPoint {
    pub month: u32,
    pub balance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawdown {
    pub months_lasted: u32,
    /// True when the corpus outlived the month cap.
    pub sustainable: bool,
    pub total_withdrawn: f64,
    pub points: Vec<MonthPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Projection {
    #[serde(rename_all = "camelCase")]
    Growth { series: Vec<YearPoint> },
    #[serde(rename_all = "camelCase")]
    Amortization {
        installment: f64,
        schedule: Vec<BalancePoint>,
    },
    #[serde(rename_all = "camelCase")]
    GrowthCurve {
        cagr_percent: f64,
        curve: Vec<ValuePoint>,
    },
    #[serde(rename_all = "camelCase")]
    ExpenseCurve { curve: Vec<ValuePoint> },
    #[serde(rename_all = "camelCase")]
    Drawdown { drawdown: Drawdown },
}

/// Nearest whole currency unit, halves away from zero. Amounts are never
/// negative, so for them this is round half up.
pub fn round_currency(value: f64) -> f64 {
    value.round()
}

impl Projection {
    /// Applies [`round_currency`] to every monetary amount. Rates and the
    /// EMI installment keep two decimals.
    pub fn rounded(&self) -> Projection {
        match self {
            Projection::Growth { series } => Projection::Growth {
                series: series
                    .iter()
                    .map(|p| YearPoint {
                        year_index: p.year_index,
                        invested: round_currency(p.invested),
                        projected_value: round_currency(p.projected_value),
                    })
                    .collect(),
            },
            Projection::Amortization {
                installment,
                schedule,
            } => Projection::Amortization {
                installment: round_cents(*installment),
                schedule: schedule
                    .iter()
                    .map(|p| BalancePoint {
                        year_index: p.year_index,
                        outstanding: round_currency(p.outstanding),
                        paid_to_date: round_currency(p.paid_to_date),
                        interest_to_date: round_currency(p.interest_to_date),
                    })
                    .collect(),
            },
            Projection::GrowthCurve { cagr_percent, curve } => Projection::GrowthCurve {
                cagr_percent: round_cents(*cagr_percent),
                curve: round_curve(curve),
            },
            Projection::ExpenseCurve { curve } => Projection::ExpenseCurve {
                curve: round_curve(curve),
            },
            Projection::Drawdown { drawdown } => Projection::Drawdown {
                drawdown: Drawdown {
                    months_lasted: drawdown.months_lasted,
                    sustainable: drawdown.sustainable,
                    total_withdrawn: round_currency(drawdown.total_withdrawn),
                    points: drawdown
                        .points
                        .iter()
                        .map(|p| MonthPoint {
                            month: p.month,
                            balance: round_currency(p.balance),
                        })
                        .collect(),
                },
            },
        }
    }
}

fn round_cents(value: f64) -> f64 {
    round_currency(value * 100.0) / 100.0
}

fn round_curve(curve: &[ValuePoint]) -> Vec<ValuePoint> {
    curve
        .iter()
        .map(|p| ValuePoint {
            year_index: p.year_index,
            value: round_currency(p.value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_currency_does_not_carry_values_just_below_half() {
        assert_eq!(round_currency(0.499_999_999_999_999_94), 0.0);
        assert_eq!(round_currency(2152.5), 2153.0);
        assert_eq!(round_currency(3310.125), 3310.0);
    }

    #[test]
    fn negative_rates_round_symmetrically_to_cents() {
        let projection = Projection::GrowthCurve {
            cagr_percent: -12.345,
            curve: vec![ValuePoint {
                year_index: 0,
                value: 100.0,
            }],
        };
        let Projection::GrowthCurve { cagr_percent, .. } = projection.rounded() else {
            panic!("kind changes under rounding");
        };
        assert_eq!(cagr_percent, -12.35);
    }
}
