//! Unique name generation for newly created objects
//!
//! Names only need to be generated for objects the current state does not
//! reference yet; once an object exists its name is reused on every pass.

#[cfg(test)]
use mockall::automock;
use rand::Rng;

/// Maximum length of a Kubernetes object name
pub const MAX_NAME_LENGTH: usize = 63;

/// Number of random characters appended to a prefix
pub const RANDOM_SUFFIX_LENGTH: usize = 5;

/// Longest prefix kept before the random suffix
const MAX_PREFIX_LENGTH: usize = MAX_NAME_LENGTH - RANDOM_SUFFIX_LENGTH;

/// Characters used for the random suffix (no vowels, no confusable digits)
const ALPHANUMS: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";

/// Source of unique object names
///
/// Implementations must return a different name on every call; the compiler
/// never retries on collision.
#[cfg_attr(test, automock)]
pub trait NameGenerator: Send + Sync {
    /// Generate a unique name starting with `prefix`
    fn generate_name(&self, prefix: &str) -> String;
}

/// Appends a random suffix to the prefix, truncating the prefix so the
/// result is a valid object name
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleNameGenerator;

impl NameGenerator for SimpleNameGenerator {
    fn generate_name(&self, prefix: &str) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_SUFFIX_LENGTH)
            .map(|_| ALPHANUMS[rng.gen_range(0..ALPHANUMS.len())] as char)
            .collect();
        format!("{}{}", truncate(prefix, MAX_PREFIX_LENGTH), suffix)
    }
}

/// Truncate to at most `max` bytes without splitting a character
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max)
        .last()
        .unwrap_or(0);
    &s[..end]
}
