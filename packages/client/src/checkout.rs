use crate::error::BuilderError;

/// Convert a display price (`"$19.99"`, `"19"`, `"1,299.50"`) to integer cents.
///
/// Currency symbols and whitespace are ignored and commas are thousands
/// separators. Zero, negative and malformed prices are rejected.
pub fn price_to_cents(price: &str) -> Result<u64, BuilderError> {
    let invalid = || BuilderError::InvalidPrice(price.to_string());

    let cleaned: String = price
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .skip_while(|c| !c.is_ascii_digit() && *c != '.' && *c != '-')
        .collect();

    let (whole, fraction) = match cleaned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (cleaned.as_str(), ""),
    };

    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits(whole) || !digits(fraction) || fraction.len() > 2 {
        return Err(invalid());
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction: u64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(invalid)?;
    if cents == 0 {
        return Err(invalid());
    }
    Ok(cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_formats() {
        assert_eq!(price_to_cents("$19.99").unwrap(), 1999);
        assert_eq!(price_to_cents("19").unwrap(), 1900);
        assert_eq!(price_to_cents("1,299.50").unwrap(), 129950);
        assert_eq!(price_to_cents("€ 4.5").unwrap(), 450);
        assert_eq!(price_to_cents(".99").unwrap(), 99);
    }

    #[test]
    fn test_rejected_prices() {
        for bad in ["", "$", "0", "$0.00", "-5", "$-5.00", "12.345", "ten", "1.2.3", "99999999999999999999"] {
            assert!(
                matches!(price_to_cents(bad), Err(BuilderError::InvalidPrice(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
