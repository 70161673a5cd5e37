//! Progressive reveal of an already-received summary.
//!
//! The browser animates summaries by showing a growing prefix on a fixed
//! tick. Modelled here as a pure function of elapsed time so any client can
//! reproduce the same frames without a timer owning the string.

use std::time::Duration;

pub const REVEAL_TICK: Duration = Duration::from_millis(18);
pub const REVEAL_CHARS_PER_TICK: usize = 6;

/// Prefix of `text` visible after `elapsed`, clamped to the full string.
pub fn revealed(text: &str, elapsed: Duration) -> &str {
    let ticks = elapsed.as_millis() / REVEAL_TICK.as_millis();
    let chars = usize::try_from(ticks)
        .unwrap_or(usize::MAX)
        .saturating_mul(REVEAL_CHARS_PER_TICK);

    match text.char_indices().nth(chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Time until `text` is fully revealed.
pub fn reveal_duration(text: &str) -> Duration {
    ticks_duration(text.chars().count().div_ceil(REVEAL_CHARS_PER_TICK))
}

fn ticks_duration(ticks: usize) -> Duration {
    REVEAL_TICK.saturating_mul(u32::try_from(ticks).unwrap_or(u32::MAX))
}
