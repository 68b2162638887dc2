// utils/reference.rs
use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;

fn random_suffix(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
        .to_uppercase()
}

/// Unique transaction reference, e.g. TXN-20250830142501-X7K2P9
pub fn generate_transaction_reference() -> String {
    format!(
        "TXN-{}-{}",
        Utc::now().format("%Y%m%d%H%M%S"),
        random_suffix(6)
    )
}

/// Unique booking number, e.g. BKG-20250830-A3F8K2
pub fn generate_booking_number() -> String {
    format!("BKG-{}-{}", Utc::now().format("%Y%m%d"), random_suffix(6))
}

/// Unique contract number, e.g. CTR-20250830-Q9T4L7
pub fn generate_contract_number() -> String {
    format!("CTR-{}-{}", Utc::now().format("%Y%m%d"), random_suffix(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_shapes() {
        assert!(generate_transaction_reference().starts_with("TXN-"));
        assert!(generate_booking_number().starts_with("BKG-"));
        assert!(generate_contract_number().starts_with("CTR-"));
    }

    #[test]
    fn test_references_are_unique() {
        let a = generate_transaction_reference();
        let b = generate_transaction_reference();
        assert_ne!(a, b);
    }
}
