use rust_decimal::Decimal;

/// Format an amount in won with thousands separators: 87,000 원
///
/// Whole amounts print without decimals; fractional ones keep up to two places.
pub fn won(val: Decimal) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let rounded = val.abs().round_dp(2).normalize();
    let text = rounded.to_string();
    let (int_part, dec_part) = match text.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (text.as_str(), None),
    };

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    match dec_part {
        Some(d) => format!("{sign}{with_commas}.{d} 원"),
        None => format!("{sign}{with_commas} 원"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_won_formatting() {
        assert_eq!(won(Decimal::new(87000, 0)), "87,000 원");
        assert_eq!(won(Decimal::new(-63150, 0)), "-63,150 원");
        assert_eq!(won(Decimal::ZERO), "0 원");
        assert_eq!(won(Decimal::new(100000099, 2)), "1,000,000.99 원");
        assert_eq!(won(Decimal::new(368500, 1)), "36,850 원");
        assert_eq!(won(Decimal::new(4210, 2)), "42.1 원");
    }
}
