//! Permissive integer parsing.
//!
//! Mirrors the classic `strtol(.., 0)` prefix rules: a leading integer is
//! parsed and whatever follows it is ignored. Only input with no digits at
//! all is an error.

/// Parse the leading integer of `input`.
///
/// - leading whitespace is skipped
/// - an optional `+` or `-` sign is accepted
/// - `0x`/`0X` followed by a hex digit selects base 16, a leading `0`
///   selects base 8, anything else is decimal
/// - parsing stops at the first character that is not a digit of the base
///
/// Returns `None` when no digit was consumed. Magnitudes beyond `i64`
/// saturate.
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let bytes = input.trim_start().as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let rest = &bytes[pos..];
    let radix = match rest {
        [b'0', b'x' | b'X', d, ..] if d.is_ascii_hexdigit() => {
            pos += 2;
            16
        }
        [b'0', ..] => 8,
        _ => 10,
    };

    let mut magnitude: i64 = 0;
    let mut consumed = 0usize;
    for &b in &bytes[pos..] {
        let digit = match (b as char).to_digit(radix) {
            Some(d) => d as i64,
            None => break,
        };
        magnitude = magnitude.saturating_mul(radix as i64).saturating_add(digit);
        consumed += 1;
    }

    if consumed == 0 {
        return None;
    }

    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("-17"), Some(-17));
        assert_eq!(parse_leading_int("+5"), Some(5));
    }

    #[test]
    fn test_whitespace_and_trailing_garbage() {
        assert_eq!(parse_leading_int("  50\n"), Some(50));
        assert_eq!(parse_leading_int("12abc"), Some(12));
        assert_eq!(parse_leading_int("7 8"), Some(7));
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(parse_leading_int("0x1F"), Some(31));
        assert_eq!(parse_leading_int("0X1f"), Some(31));
        assert_eq!(parse_leading_int("-0x10"), Some(-16));
        assert_eq!(parse_leading_int("017"), Some(15));
        assert_eq!(parse_leading_int("0"), Some(0));
        // "0x" without a hex digit parses the zero and stops at 'x'
        assert_eq!(parse_leading_int("0xg"), Some(0));
        // 8 is not an octal digit
        assert_eq!(parse_leading_int("08"), Some(0));
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("   "), None);
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("x12"), None);
    }

    #[test]
    fn test_saturates() {
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_leading_int("-99999999999999999999999"), Some(-i64::MAX));
    }
}
