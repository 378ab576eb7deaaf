use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Internal ledger references look like "TXN-8F3K2M9QD1".
pub fn generate_transaction_reference() -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();

    format!("TXN-{}", suffix.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_have_prefix_and_length() {
        let reference = generate_transaction_reference();
        assert!(reference.starts_with("TXN-"));
        assert_eq!(reference.len(), 14);
    }

    #[test]
    fn references_are_unique_enough() {
        let a = generate_transaction_reference();
        let b = generate_transaction_reference();
        assert_ne!(a, b);
    }
}
