// Money/number normalization for loosely formatted spreadsheet cells.

/// Anything that can be read as an amount. Numbers pass through; text goes
/// through `parse_amount_text`.
pub trait AmountSource {
    fn to_amount(&self) -> f64;
}

impl AmountSource for f64 {
    fn to_amount(&self) -> f64 {
        if self.is_finite() {
            *self
        } else {
            0.0
        }
    }
}

impl AmountSource for i64 {
    fn to_amount(&self) -> f64 {
        *self as f64
    }
}

impl AmountSource for str {
    fn to_amount(&self) -> f64 {
        parse_amount_text(self)
    }
}

impl AmountSource for String {
    fn to_amount(&self) -> f64 {
        parse_amount_text(self)
    }
}

/// Parse a number or a currency-ish string. Never fails: anything that does
/// not yield a finite number becomes 0.
///
/// ```
/// use courtside_nba::money::parse_amount;
/// assert_eq!(parse_amount("US$1,234"), 1234.0);
/// assert_eq!(parse_amount("(1,000)"), -1000.0);
/// assert_eq!(parse_amount(&2.5_f64), 2.5);
/// ```
pub fn parse_amount<A: AmountSource + ?Sized>(raw: &A) -> f64 {
    raw.to_amount()
}

fn parse_amount_text(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let negative_paren = trimmed.len() >= 2 && trimmed.starts_with('(') && trimmed.ends_with(')');

    let cleaned: String = trimmed
        .chars()
        .filter_map(|c| match c {
            '\u{2212}' | '\u{2013}' | '\u{2014}' | '\u{FE63}' | '\u{FF0D}' => Some('-'),
            '\u{FF0B}' | '\u{FE62}' => Some('+'),
            '0'..='9' | '+' | '-' | '.' => Some(c),
            _ => None,
        })
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }
    let value = match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return 0.0,
    };
    if negative_paren {
        -value.abs()
    } else {
        value
    }
}

/// Round half toward positive infinity, the way spreadsheet users expect
/// `-2.5` to display as `-2`.
pub fn round_half_up(n: f64) -> f64 {
    (n + 0.5).floor()
}

/// Largest whole amount stored on a record: 2^53 - 1, the last integer an
/// f64 holds exactly.
pub const MAX_WHOLE_AMOUNT: i64 = 9_007_199_254_740_991;

/// Round an amount half-up and clamp it to `±MAX_WHOLE_AMOUNT`, so sums and
/// differences of two stored amounts never overflow an i64.
pub fn whole_amount(n: f64) -> i64 {
    let limit = MAX_WHOLE_AMOUNT as f64;
    let n = if n.is_finite() { n } else { 0.0 };
    round_half_up(n).clamp(-limit, limit) as i64
}

/// Render an amount as `$1,234` / `-$1,234`. `None` renders as an empty
/// string rather than `$0`.
pub fn format_amount(n: Option<f64>) -> String {
    let Some(n) = n else {
        return String::new();
    };
    let n = if n.is_finite() { n } else { 0.0 };
    let v = round_half_up(n);
    let digits = group_thousands(v.abs() as u64);
    if v < 0.0 {
        format!("-${digits}")
    } else {
        format!("${digits}")
    }
}

fn group_thousands(n: u64) -> String {
    let raw = n.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_currency_prefixes() {
        assert_eq!(parse_amount("US$1,234"), 1234.0);
        assert_eq!(parse_amount("NT$ 45,000,000"), 45_000_000.0);
        assert_eq!(parse_amount("€12.5"), 12.5);
        assert_eq!(parse_amount("＄１"), 0.0);
        assert_eq!(parse_amount("＄1，000"), 1000.0);
    }

    #[test]
    fn parenthesized_is_negative() {
        assert_eq!(parse_amount("(1,000)"), -1000.0);
        assert_eq!(parse_amount("($250)"), -250.0);
        assert_eq!(parse_amount("(-7)"), -7.0);
    }

    #[test]
    fn unicode_signs() {
        assert_eq!(parse_amount("−500"), -500.0);
        assert_eq!(parse_amount("–3"), -3.0);
        assert_eq!(parse_amount("＋42"), 42.0);
    }

    #[test]
    fn whole_amount_rounds_and_clamps() {
        assert_eq!(whole_amount(1234.5), 1235);
        assert_eq!(whole_amount(-2.5), -2);
        assert_eq!(whole_amount(f64::NAN), 0);
        assert_eq!(whole_amount(1e30), MAX_WHOLE_AMOUNT);
        assert_eq!(whole_amount(-1e30), -MAX_WHOLE_AMOUNT);
        assert_eq!(whole_amount(parse_amount("99999999999999999999")), MAX_WHOLE_AMOUNT);
    }

    #[test]
    fn garbage_is_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
        assert_eq!(parse_amount("1.2.3"), 0.0);
        assert_eq!(parse_amount("--5"), 0.0);
        assert_eq!(parse_amount("."), 0.0);
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(parse_amount(&1500.0_f64), 1500.0);
        assert_eq!(parse_amount(&-3_i64), -3.0);
        assert_eq!(parse_amount(&f64::NAN), 0.0);
        assert_eq!(parse_amount(&f64::INFINITY), 0.0);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_amount(Some(-9876.0)), "-$9,876");
        assert_eq!(format_amount(Some(0.0)), "$0");
        assert_eq!(format_amount(Some(999.0)), "$999");
        assert_eq!(format_amount(Some(1_000.0)), "$1,000");
        assert_eq!(format_amount(Some(45_123_456.4)), "$45,123,456");
    }

    #[test]
    fn formats_none_as_empty() {
        assert_eq!(format_amount(None), "");
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(format_amount(Some(2.5)), "$3");
        assert_eq!(format_amount(Some(-2.5)), "-$2");
        assert_eq!(format_amount(Some(-0.4)), "$0");
    }
}
