use rand::{distributions::Uniform, Rng};
use time::OffsetDateTime;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Record id: unix millis followed by a short random base-36 suffix.
/// Collision-resistant, not collision-proof.
pub fn generate_id(now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    let dist = Uniform::from(0..BASE36.len());
    let suffix: String = rand::thread_rng()
        .sample_iter(dist)
        .take(SUFFIX_LEN)
        .map(|i| BASE36[i] as char)
        .collect();
    format!("{millis}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use time::macros::datetime;

    #[test]
    fn id_starts_with_millis_and_has_suffix() {
        let id = generate_id(datetime!(2026-10-17 00:00 UTC));
        assert!(id.starts_with("1792195200000"));
        assert_eq!(id.len(), "1792195200000".len() + SUFFIX_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn ids_generated_in_the_same_millisecond_differ() {
        let now = OffsetDateTime::now_utc();
        let ids: HashSet<String> = (0..200).map(|_| generate_id(now)).collect();
        assert_eq!(ids.len(), 200);
    }
}
