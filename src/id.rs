//! Transcript entry identifiers.
//!
//! Shape: `<tag>-<epoch-millis>-<base36-suffix>`. The suffix is drawn from the
//! OS entropy source; when that is unavailable the generator switches to a
//! zero-padded sub-millisecond clock reading followed by a per-generator
//! counter, which keeps ids unique without any cross-instance coordination.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::OsRng;
use rand::TryRngCore;
use time::OffsetDateTime;
use tracing::debug;

/// Namespace tag prefixed to every id produced by the pi adapter.
pub const PI_ID_TAG: &str = "pi";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
/// Width needed to render any nanosecond-of-second value in base 36.
const NANOS_WIDTH: usize = 6;

#[derive(Debug)]
pub struct MessageIdGenerator {
    tag: &'static str,
    fallback_counter: AtomicU64,
}

impl MessageIdGenerator {
    #[must_use]
    pub const fn new(tag: &'static str) -> Self {
        Self {
            tag,
            fallback_counter: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Generates an id stamped with the current wall-clock time.
    #[must_use]
    pub fn next_id(&self) -> String {
        self.next_id_at(OffsetDateTime::now_utc())
    }

    /// Generates an id stamped with `at`. Never fails.
    #[must_use]
    pub fn next_id_at(&self, at: OffsetDateTime) -> String {
        let suffix = match OsRng.try_next_u64() {
            Ok(bits) => to_base36(bits),
            Err(error) => {
                debug!(%error, "entropy source unavailable; using counter id suffix");
                self.fallback_suffix(at)
            }
        };

        format!("{}-{}-{}", self.tag, epoch_millis(at), suffix)
    }

    fn fallback_suffix(&self, at: OffsetDateTime) -> String {
        let count = self.fallback_counter.fetch_add(1, Ordering::Relaxed);
        let nanos = to_base36(u64::from(at.nanosecond()));
        format!("{nanos:0>width$}{}", to_base36(count), width = NANOS_WIDTH)
    }
}

impl Default for MessageIdGenerator {
    fn default() -> Self {
        Self::new(PI_ID_TAG)
    }
}

fn epoch_millis(at: OffsetDateTime) -> u64 {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    u64::try_from(millis).unwrap_or(0)
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}
