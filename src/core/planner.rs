use super::engine::{
    amortization_schedule, amortized_installment, cagr, compound_lumpsum,
    compound_series_monthly, compound_series_yearly, growth_curve, inflate_expense,
    withdrawal_drawdown,
};
use super::error::ProjectionError;
use super::types::{Product, ProductInput, Projection};

impl Product {
    /// Input shape the product's widget collects.
    pub fn expected_input(self) -> &'static str {
        match self {
            Product::Sip | Product::Rd | Product::Nps => "monthly",
            Product::Lumpsum | Product::Fd | Product::Emi | Product::Retirement => "principal",
            Product::Ppf => "yearly",
            Product::Cagr => "growth",
            Product::Swp => "withdrawal",
        }
    }
}

/// Builds the chart projection for one calculator submission.
///
/// Retirement reads its principal as today's monthly expense and its rate as
/// the inflation percentage.
pub fn plan(product: Product, input: &ProductInput) -> Result<Projection, ProjectionError> {
    let mismatch = || ProjectionError::InputMismatch {
        product,
        expected: product.expected_input(),
    };

    match (product, *input) {
        (
            Product::Sip | Product::Rd | Product::Nps,
            ProductInput::Monthly {
                monthly,
                annual_rate_pct,
                years,
            },
        ) => Ok(Projection::Growth {
            series: compound_series_monthly(monthly, annual_rate_pct, years)?,
        }),
        (
            Product::Lumpsum | Product::Fd,
            ProductInput::Principal {
                principal,
                annual_rate_pct,
                years,
            },
        ) => Ok(Projection::Growth {
            series: compound_lumpsum(principal, annual_rate_pct, years)?,
        }),
        (
            Product::Ppf,
            ProductInput::Yearly {
                yearly,
                annual_rate_pct,
                years,
            },
        ) => Ok(Projection::Growth {
            series: compound_series_yearly(yearly, annual_rate_pct, years)?,
        }),
        (
            Product::Emi,
            ProductInput::Principal {
                principal,
                annual_rate_pct,
                years,
            },
        ) => Ok(Projection::Amortization {
            installment: amortized_installment(principal, annual_rate_pct, years)?,
            schedule: amortization_schedule(principal, annual_rate_pct, years)?,
        }),
        (
            Product::Cagr,
            ProductInput::Growth {
                initial,
                final_value,
                years,
            },
        ) => Ok(Projection::GrowthCurve {
            cagr_percent: cagr(initial, final_value, years)? * 100.0,
            curve: growth_curve(initial, final_value, years)?,
        }),
        (
            Product::Retirement,
            ProductInput::Principal {
                principal,
                annual_rate_pct,
                years,
            },
        ) => Ok(Projection::ExpenseCurve {
            curve: inflate_expense(principal, annual_rate_pct, years)?,
        }),
        (
            Product::Swp,
            ProductInput::Withdrawal {
                corpus,
                annual_rate_pct,
                monthly_withdrawal,
            },
        ) => Ok(Projection::Drawdown {
            drawdown: withdrawal_drawdown(corpus, annual_rate_pct, monthly_withdrawal)?,
        }),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly(amount: f64, rate: f64, years: u32) -> ProductInput {
        ProductInput::Monthly {
            monthly: amount,
            annual_rate_pct: rate,
            years,
        }
    }

    #[test]
    fn sip_rd_and_nps_share_the_monthly_series() {
        let sip = plan(Product::Sip, &monthly(5000.0, 12.0, 10)).expect("valid");
        let rd = plan(Product::Rd, &monthly(5000.0, 12.0, 10)).expect("valid");
        let nps = plan(Product::Nps, &monthly(5000.0, 12.0, 10)).expect("valid");
        assert_eq!(sip, rd);
        assert_eq!(sip, nps);
        let Projection::Growth { series } = sip else {
            panic!("expected growth projection");
        };
        assert_eq!(series.len(), 11);
    }

    #[test]
    fn emi_returns_installment_and_schedule() {
        let input = ProductInput::Principal {
            principal: 100_000.0,
            annual_rate_pct: 10.0,
            years: 1,
        };
        let Projection::Amortization {
            installment,
            schedule,
        } = plan(Product::Emi, &input).expect("valid")
        else {
            panic!("expected amortization projection");
        };
        assert!((installment - 8791.59).abs() < 0.005);
        assert_eq!(schedule.len(), 2);
    }

    #[test]
    fn cagr_reports_percent() {
        let input = ProductInput::Growth {
            initial: 100.0,
            final_value: 200.0,
            years: 1,
        };
        let Projection::GrowthCurve { cagr_percent, curve } =
            plan(Product::Cagr, &input).expect("valid")
        else {
            panic!("expected growth curve");
        };
        assert!((cagr_percent - 100.0).abs() < 1e-9);
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn mismatched_input_shape_is_rejected() {
        let err = plan(Product::Ppf, &monthly(1000.0, 7.1, 15)).expect_err("must reject");
        assert_eq!(
            err,
            ProjectionError::InputMismatch {
                product: Product::Ppf,
                expected: "yearly",
            }
        );
        assert_eq!(err.to_string(), "ppf expects yearly inputs");
    }

    #[test]
    fn engine_errors_pass_through() {
        let input = ProductInput::Withdrawal {
            corpus: 1_000_000.0,
            annual_rate_pct: 8.0,
            monthly_withdrawal: 0.0,
        };
        let err = plan(Product::Swp, &input).expect_err("must reject");
        assert!(err.to_string().contains("withdrawal"));
    }

    #[test]
    fn rounded_projection_applies_half_up() {
        let input = ProductInput::Yearly {
            yearly: 1000.0,
            annual_rate_pct: 5.0,
            years: 3,
        };
        let Projection::Growth { series } = plan(Product::Ppf, &input).expect("valid").rounded()
        else {
            panic!("expected growth projection");
        };
        let values: Vec<f64> = series.iter().map(|p| p.projected_value).collect();
        assert_eq!(values, vec![0.0, 1050.0, 2153.0, 3310.0]);
    }
}
