//! Exact decimal truncation
//!
//! Decimal fields store fixed-scale decimal strings. Scaling is done on the
//! digit string itself so no binary rounding ever leaks into storage:
//! `0 + x` at scale `dp`, truncated toward zero.

/// Largest number of fractional digits a decimal field may carry.
pub const MAX_DECIMAL_PLACES: u32 = 48;

/// Exponents beyond this magnitude are rejected rather than expanded.
const MAX_EXPONENT: i64 = 4096;

struct Parsed {
    negative: bool,
    /// All significant digits, integer part first
    digits: Vec<u8>,
    /// Position of the decimal point within `digits`, after the exponent
    point: i64,
}

fn parse(input: &str) -> Option<Parsed> {
    let bytes = input.as_bytes();
    let mut i = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let mut digits = Vec::with_capacity(bytes.len());
    let mut int_len: i64 = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        digits.push(bytes[i]);
        int_len += 1;
        i += 1;
    }

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            digits.push(bytes[i]);
            i += 1;
        }
    }

    if digits.is_empty() {
        return None;
    }

    let mut exponent: i64 = 0;
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        let exp_negative = match bytes.get(i) {
            Some(b'-') => {
                i += 1;
                true
            }
            Some(b'+') => {
                i += 1;
                false
            }
            _ => false,
        };

        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            exponent = exponent * 10 + i64::from(bytes[i] - b'0');
            if exponent > MAX_EXPONENT {
                return None;
            }
            i += 1;
        }
        if i == start {
            return None;
        }
        if exp_negative {
            exponent = -exponent;
        }
    }

    if i != bytes.len() {
        return None;
    }

    Some(Parsed {
        negative,
        digits,
        point: int_len + exponent,
    })
}

/// Truncates the decimal string `input` to exactly `dp` fractional digits.
///
/// Accepts an optional sign, integer digits, an optional fraction and an
/// optional exponent. Returns `None` for anything else. Negative zero is
/// rendered without its sign.
pub fn truncate(input: &str, dp: u32) -> Option<String> {
    let Parsed {
        negative,
        digits,
        point,
    } = parse(input)?;
    let len = digits.len() as i64;

    let mut int_part: Vec<u8> = if point <= 0 {
        Vec::new()
    } else if point >= len {
        let mut all = digits.clone();
        all.resize(point as usize, b'0');
        all
    } else {
        digits[..point as usize].to_vec()
    };
    let leading = int_part.iter().take_while(|&&b| b == b'0').count();
    int_part.drain(..leading);
    if int_part.is_empty() {
        int_part.push(b'0');
    }

    let frac: Vec<u8> = (0..i64::from(dp))
        .map(|k| {
            let idx = point + k;
            if (0..len).contains(&idx) {
                digits[idx as usize]
            } else {
                b'0'
            }
        })
        .collect();

    let is_zero = int_part == b"0" && frac.iter().all(|&b| b == b'0');

    let mut out = String::with_capacity(int_part.len() + frac.len() + 2);
    if negative && !is_zero {
        out.push('-');
    }
    out.extend(int_part.iter().map(|&b| b as char));
    if dp > 0 {
        out.push('.');
        out.extend(frac.iter().map(|&b| b as char));
    }
    Some(out)
}
