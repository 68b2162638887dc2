/// Currency utility functions.
///
/// All monetary values in the database are stored in minor units
/// (1 major unit = 100 minor units) to avoid floating-point precision
/// issues. DTOs expose amounts as two-decimal major units.

/// Convert a major-unit amount to minor units (multiply by 100)
pub fn to_minor(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Convert minor units to a major-unit amount (divide by 100)
pub fn to_major(minor: i64) -> f64 {
    minor as f64 / 100.0
}

/// Platform fee for auction-derived bookings: 7% of the proposed price,
/// rounded half-up to the nearest minor unit.
pub const PLATFORM_FEE_PERCENT: i64 = 7;

pub fn platform_fee(amount_minor: i64) -> i64 {
    (amount_minor * PLATFORM_FEE_PERCENT + 50) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor() {
        assert_eq!(to_minor(100.0), 10000);
        assert_eq!(to_minor(0.50), 50);
        assert_eq!(to_minor(123.45), 12345);
    }

    #[test]
    fn test_to_major() {
        assert_eq!(to_major(10000), 100.0);
        assert_eq!(to_major(50), 0.50);
        assert_eq!(to_major(12345), 123.45);
    }

    #[test]
    fn test_platform_fee() {
        // 7% of 1000.00 = 70.00
        assert_eq!(platform_fee(100000), 7000);
        // 7% of 0.50 = 0.035, rounds to 0.04
        assert_eq!(platform_fee(50), 4);
        // 7% of 0.07 = 0.0049, rounds to 0.00
        assert_eq!(platform_fee(7), 0);
    }
}
