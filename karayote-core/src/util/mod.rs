mod id;

pub use id::*;

use rand::{distributions::Alphanumeric, distributions::DistString, thread_rng};

/// A random alphanumeric id, for songs that have no id of their own
pub fn random_id(length: usize) -> String {
    Alphanumeric.sample_string(&mut thread_rng(), length)
}

#[cfg(test)]
mod test {
    use super::random_id;

    #[test]
    fn random_ids() {
        let id = random_id(12);

        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, random_id(12));
    }
}
