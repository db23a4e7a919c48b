use super::error::ParseError;

/// Largest magnitude a 96-bit fixed-precision decimal can hold.
pub const MAX_VALUE: &str = "79228162514264337593543950334";

/// Maximum number of significant digits the canonical form keeps.
pub const SIGNIFICANT_DIGITS: usize = 29;

/// A base-10 decimal value kept in its canonical string form. The wire
/// format stores these as length-prefixed UTF-8 strings, not as binary
/// numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal(String);

impl Decimal {
    /// Validates `value` against the grammar `-?[0-9]+(\.[0-9]+)?`, rounds
    /// it to 29 significant digits, and saturates at ±MAX_VALUE.
    pub fn new(value: &str) -> Result<Self, ParseError> {
        if !verify(value) {
            return Err(ParseError::MalformedDecimal(value.to_string()));
        }

        let rounded = if count_digits(value) > SIGNIFICANT_DIGITS {
            round(value)
        } else {
            value.to_string()
        };

        Ok(Decimal(saturate(rounded)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// True if `value` matches `-?[0-9]+(\.[0-9]+)?`: at least one digit before
/// a decimal point, at least one after it if a point is present.
pub fn verify(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.is_empty() {
        return false;
    }

    let mut idx = 0;
    if bytes[0] == b'-' {
        idx = 1;
    }

    let int_start = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == int_start {
        return false;
    }
    if idx == bytes.len() {
        return true;
    }

    if bytes[idx] != b'.' {
        return false;
    }
    idx += 1;

    let frac_start = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    idx == bytes.len() && idx > frac_start
}

pub fn count_digits(value: &str) -> usize {
    value.bytes().filter(|b| b.is_ascii_digit()).count()
}

/// Rounds a verified decimal string to 29 significant digits: keep the
/// first 29 digits, inspect the digit after the 29th, and either truncate
/// or propagate a carry leftward, skipping the decimal point and inserting
/// a new leading digit if the carry leaves the first digit.
///
/// An integer with more than 29 digits cannot be represented at any scale,
/// so it saturates to ±MAX_VALUE directly.
pub fn round(value: &str) -> String {
    let bytes = value.as_bytes();
    let negative = bytes.first() == Some(&b'-');

    let mut chars: Vec<u8> = Vec::with_capacity(SIGNIFICANT_DIGITS + 2);
    let mut point = None;
    let mut digits = 0;
    let mut last = 0;
    for (i, &c) in bytes.iter().enumerate() {
        chars.push(c);
        if c == b'.' {
            point = Some(i);
        }
        if c.is_ascii_digit() {
            digits += 1;
        }
        if digits == SIGNIFICANT_DIGITS {
            last = i;
            break;
        }
    }

    // Fewer than 30 significant digits: nothing to round.
    if digits < SIGNIFICANT_DIGITS || chars.len() == bytes.len() {
        return value.to_string();
    }

    // The digit deciding the rounding direction. When the 29th digit lands
    // right before the point, it is the first fractional digit; when more
    // integer digits follow, no scale can represent the value at all.
    let next = if point.is_some() {
        bytes[chars.len()]
    } else if bytes[chars.len()] == b'.' {
        bytes[chars.len() + 1]
    } else {
        return saturated(negative);
    };
    if next < b'5' {
        return String::from_utf8(chars).expect("rounded prefix is ASCII");
    }

    let first_digit = usize::from(negative);
    let mut idx = last as isize;
    let mut carry = true;
    while carry && idx >= first_digit as isize {
        let i = idx as usize;
        if chars[i] == b'.' {
            idx -= 1;
            continue;
        }
        if chars[i] == b'9' {
            chars[i] = b'0';
        } else {
            chars[i] += 1;
            carry = false;
        }
        idx -= 1;
    }

    if carry {
        chars.insert(first_digit, b'1');
    }

    String::from_utf8(chars).expect("rounded value is ASCII")
}

fn saturated(negative: bool) -> String {
    if negative {
        format!("-{MAX_VALUE}")
    } else {
        MAX_VALUE.to_string()
    }
}

/// Clamps a rounded decimal string whose magnitude exceeds MAX_VALUE.
fn saturate(value: String) -> String {
    let negative = value.starts_with('-');
    let unsigned = value.strip_prefix('-').unwrap_or(&value);
    let int_part = unsigned.split('.').next().unwrap_or(unsigned);
    let int_part = int_part.trim_start_matches('0');

    let exceeds = match int_part.len().cmp(&MAX_VALUE.len()) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Equal => int_part > MAX_VALUE,
        std::cmp::Ordering::Less => false,
    };

    if exceeds { saturated(negative) } else { value }
}
