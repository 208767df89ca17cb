//! Demand variability: population standard deviation and linear trend.

use crate::numeric::{finite_or_zero, round2, round_to_i64};
use crate::series::DemandSeries;

/// Variability measures over the forecast window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variability {
    /// Rounded population standard deviation.
    pub stdev: i64,
    /// OLS slope per month, two decimals.
    pub trend: f64,
}

impl Variability {
    pub fn of(series: &DemandSeries) -> Self {
        let qtys = series.quantities();
        let stdev = if qtys.len() >= 2 {
            round_to_i64(population_stdev(&qtys))
        } else {
            0
        };

        Self {
            stdev,
            trend: linear_trend(&qtys),
        }
    }
}

/// Population (divide-by-N) standard deviation.
pub fn population_stdev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    finite_or_zero(var.sqrt())
}

/// Slope of the least-squares line through `(1, y1) .. (n, yn)`, rounded to two decimals.
///
/// Degenerate inputs (fewer than two points) have no slope and yield `0`.
pub fn linear_trend(ys: &[f64]) -> f64 {
    let n = ys.len() as f64;

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let x = (i + 1) as f64;
        let y = finite_or_zero(*y);
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }

    round2((n * sum_xy - sum_x * sum_y) / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_not_sample_stdev() {
        let v = Variability::of(&DemandSeries::from_quantities(&[0.0, 10.0, 0.0, 10.0, 0.0, 10.0]));
        assert_eq!(v.stdev, 5);
    }

    #[test]
    fn short_series_has_no_spread() {
        assert_eq!(Variability::of(&DemandSeries::from_quantities(&[42.0])).stdev, 0);
        assert_eq!(Variability::of(&DemandSeries::empty()).stdev, 0);
    }

    #[test]
    fn trend_is_regression_slope() {
        assert_eq!(linear_trend(&[4.0, 14.0, 9.0, 11.0, 0.0, 0.0]), -1.71);
        assert_eq!(linear_trend(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), 1.0);
        assert_eq!(linear_trend(&[5.0, 5.0, 5.0, 5.0, 10.0, 10.0]), 1.14);
    }

    #[test]
    fn trend_of_degenerate_series_is_zero() {
        assert_eq!(linear_trend(&[7.0]), 0.0);
        assert_eq!(linear_trend(&[]), 0.0);
    }

    #[test]
    fn trend_handles_zero_months_without_blowing_up() {
        assert_eq!(linear_trend(&[0.0, 0.0, 0.0, 0.0, 0.0, 6.0]), 0.86);
    }
}
