//! Identifier source for per-run user agents.

use rand::Rng;

const ID_CHARSET: &[u8] = b"1234567890abcdefghijklmnopqrstuvwxyz";
const ID_LENGTH: usize = 10;

/// Produces the identifiers embedded in each run's user agent.
///
/// The default [`RandomIds`] draws from the thread-local RNG. Swap in a
/// deterministic source through
/// [`Runner::with_id_source`](crate::Runner::with_id_source) when runs need
/// to be correlated with server-side logs or replayed in tests.
pub trait RunIdSource: Send + Sync {
    /// Produce the next identifier.
    fn next_id(&self) -> String;
}

/// Default source: ten random characters from `[0-9a-z]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl RunIdSource for RandomIds {
    fn next_id(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..ID_LENGTH)
            .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_have_fixed_length_and_charset() {
        let id = RandomIds.next_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.bytes().all(|b| ID_CHARSET.contains(&b)));
    }

    #[test]
    fn random_ids_differ_across_draws() {
        let draws: Vec<String> = (0..8).map(|_| RandomIds.next_id()).collect();
        assert!(draws.windows(2).any(|pair| pair[0] != pair[1]));
    }
}
