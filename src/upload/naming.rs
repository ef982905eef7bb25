//! Random directory names
//!
//! Every name is the lowercase hex rendering of a 10-byte value from the
//! OS random source.
//!
//! | Policy  | Attempts | Candidate for attempt `n` (1-based)             |
//! |---------|----------|-------------------------------------------------|
//! | `Short` | 20       | first `n` hex chars of one value drawn up front |
//! | `Long`  | 3        | all 20 hex chars of a freshly drawn value       |

use rand::rngs::OsRng;
use rand::RngCore;

/// Random identifier length in bytes
pub const ID_LEN: usize = 10;

/// Hex length of a full identifier
pub const ID_HEX_LEN: usize = ID_LEN * 2;

/// Attempts made under [`NamingPolicy::Long`]
pub const LONG_ATTEMPTS: usize = 3;

/// Draw a fresh identifier from the OS random source.
///
/// # Panics
/// If the OS random source is unavailable. There is no sensible fallback
/// for unpredictable names, so this aborts the upload.
pub fn random_id() -> [u8; ID_LEN] {
    let mut buf = [0u8; ID_LEN];
    if let Err(e) = OsRng.try_fill_bytes(&mut buf) {
        panic!("secure random source unavailable: {}", e);
    }
    buf
}

/// How candidate directory names are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingPolicy {
    /// Shortest free prefix of a single random value
    #[default]
    Short,
    /// Full-width names, a fresh value per attempt
    Long,
}

impl NamingPolicy {
    pub fn from_long_flag(long: bool) -> Self {
        if long {
            Self::Long
        } else {
            Self::Short
        }
    }

    /// Upper bound on creation attempts
    pub fn max_attempts(&self) -> usize {
        match self {
            Self::Short => ID_HEX_LEN,
            Self::Long => LONG_ATTEMPTS,
        }
    }

    /// Candidate names backed by [`random_id`]
    pub fn candidates(self) -> Candidates<fn() -> [u8; ID_LEN]> {
        self.candidates_from(random_id as fn() -> [u8; ID_LEN])
    }

    /// Candidate names backed by a custom identifier source
    pub fn candidates_from<F>(self, draw: F) -> Candidates<F>
    where
        F: FnMut() -> [u8; ID_LEN],
    {
        Candidates {
            policy: self,
            draw,
            attempt: 0,
            shared: None,
        }
    }
}

/// Iterator over candidate names. Identifiers are drawn lazily, so an
/// early success never consumes more randomness than it used.
pub struct Candidates<F> {
    policy: NamingPolicy,
    draw: F,
    attempt: usize,
    /// Short policy: the single value every prefix is cut from
    shared: Option<String>,
}

impl<F> Iterator for Candidates<F>
where
    F: FnMut() -> [u8; ID_LEN],
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.attempt >= self.policy.max_attempts() {
            return None;
        }
        self.attempt += 1;

        match self.policy {
            NamingPolicy::Long => Some(hex::encode((self.draw)())),
            NamingPolicy::Short => {
                let draw = &mut self.draw;
                let full = self.shared.get_or_insert_with(|| hex::encode(draw()));
                Some(full[..self.attempt].to_string())
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.policy.max_attempts() - self.attempt;
        (left, Some(left))
    }
}
