use rand::distributions::Alphanumeric;
use rand::Rng;

const SUFFIX_LEN: usize = 9;

/// `ORD-<unix millis>-<9 random base36 chars>`.
pub fn generate_order_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("ORD-{}-{}", chrono::Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn has_prefix_timestamp_and_suffix() {
        let id = generate_order_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn ids_generated_in_a_burst_are_distinct() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_order_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
