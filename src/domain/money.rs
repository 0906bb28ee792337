use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// For EUR/USD, 1 unit = 100 cents, so €50.00 = 5000 cents.
pub type Cents = i64;

/// Largest magnitude a stored amount may have: 8 integer digits and 2 decimals,
/// i.e. 99,999,999.99.
pub const MAX_AMOUNT_CENTS: Cents = 9_999_999_999;

/// Format cents as a human-readable currency string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
///
/// Extra decimal places are rounded half away from zero, the way a
/// `DECIMAL(10, 2)` column stores them: "19.995" -> 2000.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, decimal_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };

    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !decimal_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }

    // Leading zeros are harmless, anything longer than 8 significant digits is not.
    let units_str = units_str.trim_start_matches('0');
    if units_str.len() > 8 {
        return Err(ParseCentsError::OutOfRange);
    }
    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?
    };

    let mut decimals = decimal_str.bytes().map(|b| i64::from(b - b'0'));
    let tenths = decimals.next().unwrap_or(0);
    let hundredths = decimals.next().unwrap_or(0);
    let round_up = decimals.next().is_some_and(|d| d >= 5);

    let mut cents = units * 100 + tenths * 10 + hundredths;
    if round_up {
        cents += 1;
    }

    if cents > MAX_AMOUNT_CENTS {
        return Err(ParseCentsError::OutOfRange);
    }

    Ok(if negative { -cents } else { cents })
}

/// Whether an amount fits a `DECIMAL(10, 2)` column.
pub fn fits_amount_column(cents: Cents) -> bool {
    cents.unsigned_abs() <= MAX_AMOUNT_CENTS as u64
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::OutOfRange => {
                write!(f, "amount exceeds {}", format_cents(MAX_AMOUNT_CENTS))
            }
        }
    }
}

impl std::error::Error for ParseCentsError {}
