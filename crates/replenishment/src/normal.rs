//! Standard normal quantile function (inverse CDF).
//!
//! Rational approximation by P. J. Acklam (relative error < 1.15e-9), which
//! is far below the two-decimal precision z-scores are reported at.

const A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_69e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];

const B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];

const C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];

const D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];

const P_LOW: f64 = 0.02425;
const P_HIGH: f64 = 1.0 - P_LOW;

/// `Φ⁻¹(p)` for the standard normal distribution.
///
/// Returns `-∞`/`+∞` at the closed bounds and `NaN` outside `[0, 1]`.
pub fn inverse_standard_normal(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    if p == 0.5 {
        return 0.0;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        tail(q)
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -tail(q)
    }
}

/// Inverse normal with arbitrary mean and standard deviation.
pub fn inverse_normal(p: f64, mean: f64, sd: f64) -> f64 {
    mean + sd * inverse_standard_normal(p)
}

fn tail(q: f64) -> f64 {
    (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
        / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Φ(z) via the Hastings approximation (error < 7.5e-8).
    fn normal_cdf(z: f64) -> f64 {
        let (z_abs, negate) = if z < 0.0 { (-z, true) } else { (z, false) };
        let t = 1.0 / (1.0 + 0.231_641_9 * z_abs);
        let poly = t
            * (0.319_381_530
                + t * (-0.356_563_782 + t * (1.781_477_937 + t * (-1.821_255_978 + t * 1.330_274_429))));
        let pdf = (-0.5 * z_abs * z_abs).exp() / (2.0 * std::f64::consts::PI).sqrt();
        let cdf = 1.0 - pdf * poly;
        if negate { 1.0 - cdf } else { cdf }
    }

    #[test]
    fn known_quantiles() {
        assert!((inverse_standard_normal(0.95) - 1.644_853_626_951).abs() < 1e-8);
        assert!((inverse_standard_normal(0.93) - 1.475_791_028_179).abs() < 1e-8);
        assert!((inverse_standard_normal(0.975) - 1.959_963_984_540).abs() < 1e-8);
        assert_eq!(inverse_standard_normal(0.5), 0.0);
    }

    #[test]
    fn symmetric_around_median() {
        for p in [0.01, 0.1, 0.3, 0.45] {
            let lo = inverse_standard_normal(p);
            let hi = inverse_standard_normal(1.0 - p);
            assert!((lo + hi).abs() < 1e-8, "p={p}");
        }
    }

    #[test]
    fn round_trips_through_cdf() {
        for p in [0.001, 0.02, 0.2, 0.5, 0.8, 0.98, 0.999] {
            let z = inverse_standard_normal(p);
            assert!((normal_cdf(z) - p).abs() < 1e-6, "p={p} z={z}");
        }
    }

    #[test]
    fn bounds_and_out_of_range() {
        assert_eq!(inverse_standard_normal(0.0), f64::NEG_INFINITY);
        assert_eq!(inverse_standard_normal(1.0), f64::INFINITY);
        assert!(inverse_standard_normal(1.5).is_nan());
        assert!(inverse_standard_normal(f64::NAN).is_nan());
        assert!((inverse_normal(0.95, 10.0, 2.0) - 13.289_707).abs() < 1e-5);
    }
}
