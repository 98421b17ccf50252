use std::fmt;

/// Amounts are plain f64 currency values with a 2-decimal display contract.
/// The settlement engine classifies balances with a 0.01 tolerance band, so
/// everything upstream stays in floats and rounding happens at the edges.
pub type Amount = f64;

/// Round an amount to cent granularity (2 decimal places).
/// Example: 33.333333 -> 33.33, 66.666666 -> 66.67
pub fn round_to_cents(amount: Amount) -> Amount {
    (amount * 100.0).round() / 100.0
}

/// Format an amount with exactly two decimals.
/// Example: 50.0 -> "50.00", -3.4 -> "-3.40"
pub fn format_amount(amount: Amount) -> String {
    format!("{:.2}", round_to_cents(amount))
}

/// Parse a decimal string into an amount.
/// Example: "50.00" -> 50.0, "12.5" -> 12.5, "100" -> 100.0
/// Extra fractional digits are truncated to cent precision.
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() || input.starts_with('-') {
        // Expenses and transfers are never negative; a sign here is a typo.
        return Err(ParseAmountError::InvalidFormat);
    }

    let parts: Vec<&str> = input.split('.').collect();
    match parts.len() {
        1 => {
            let units: i64 = parts[0]
                .parse()
                .map_err(|_| ParseAmountError::InvalidFormat)?;
            Ok(units as Amount)
        }
        2 => {
            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0]
                    .parse()
                    .map_err(|_| ParseAmountError::InvalidFormat)?
            };

            let decimal_str = parts[1];
            let cents: i64 = match decimal_str.len() {
                0 => 0,
                1 => {
                    // Single digit like "5" means 50 cents
                    decimal_str
                        .parse::<i64>()
                        .map_err(|_| ParseAmountError::InvalidFormat)?
                        * 10
                }
                2 => decimal_str
                    .parse()
                    .map_err(|_| ParseAmountError::InvalidFormat)?,
                _ => {
                    // More than 2 decimal places - truncate
                    decimal_str[..2]
                        .parse()
                        .map_err(|_| ParseAmountError::InvalidFormat)?
                }
            };

            Ok(units as Amount + cents as Amount / 100.0)
        }
        _ => Err(ParseAmountError::InvalidFormat),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
