use rand::{Rng, RngCore};

/// Uniform draw in `[0, 1)`.
pub fn random_unit(rng: &mut dyn RngCore) -> f64 {
    rng.random::<f64>()
}

/// Uniform draw in `[lo, hi)`.
pub fn random_between(rng: &mut dyn RngCore, lo: f64, hi: f64) -> f64 {
    lo + random_unit(rng) * (hi - lo)
}

/// Exponential draw with the given mean, by inverse CDF.
pub fn exponential(rng: &mut dyn RngCore, mean: f64) -> f64 {
    if mean <= 0.0 {
        return 0.0;
    }
    -mean * (1.0 - random_unit(rng)).ln()
}

/// Round half away from zero to `digits` decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Round to `sig` significant figures.
pub fn round_significant(value: f64, sig: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let exp = sig - 1 - magnitude;
    // Keep the power of ten integral so large values round exactly.
    if exp >= 0 {
        let scale = 10f64.powi(exp);
        (value * scale).round() / scale
    } else {
        let scale = 10f64.powi(-exp);
        (value / scale).round() * scale
    }
}

/// Whole-number rendering with comma thousands separators.
pub fn format_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 && digits != "0" {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FixedRng, seeded_rng};

    #[test]
    fn exponential_mean_converges() {
        let mut rng = seeded_rng(11);
        let n = 20_000;
        let total: f64 = (0..n).map(|_| exponential(&mut rng, 4.0)).sum();
        let mean = total / n as f64;
        assert!((mean - 4.0).abs() < 0.2, "mean = {mean}");
    }

    #[test]
    fn exponential_zero_draw_is_zero() {
        let mut rng = FixedRng::new(0.0);
        assert_eq!(exponential(&mut rng, 10.0), 0.0);
    }

    #[test]
    fn significant_rounding() {
        assert_eq!(round_significant(123_456_789.0, 6), 123_457_000.0);
        assert_eq!(round_significant(0.0, 6), 0.0);
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1_234_567.0), "1,234,567");
        assert_eq!(format_thousands(1.0e21), "1,000,000,000,000,000,000,000");
    }
}
