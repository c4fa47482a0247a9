//! Lenient field parse policy for numeric editor input.
//!
//! Editor integrations hand positions and counters over as text. A malformed
//! value must not cost the whole event, so invalid numeric input maps to zero
//! and the event is still recorded with best-effort data.

use std::str::FromStr;

/// Parses `raw` as an unsigned integer, mapping anything invalid to zero.
///
/// Leading and trailing whitespace is ignored. Negative, fractional and
/// out-of-range values are all treated as invalid.
pub fn parse_or_zero<T>(field: &'static str, raw: &str) -> T
where
    T: FromStr + Default,
{
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::debug!(field, raw, "invalid numeric input, recording zero");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_numbers() {
        assert_eq!(parse_or_zero::<u32>("line", "42"), 42);
        assert_eq!(parse_or_zero::<u64>("changed_tick", " 7 "), 7);
    }

    #[test]
    fn invalid_input_maps_to_zero() {
        for raw in ["", "abc", "4.5", "-3", "99999999999"] {
            assert_eq!(parse_or_zero::<u32>("line", raw), 0, "input {raw:?}");
        }
    }
}
