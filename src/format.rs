use crate::model::{AnalysisResult, BreakdownItem};

/// Formats `value` with exactly two decimals.
///
/// Rounds the shortest decimal representation of the float half away from zero,
/// so a value written as `1500.005` is shown as `1500.01`.
pub fn fixed2(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    if frac_part.as_bytes().get(2).is_some_and(|d| *d >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let to_str = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let split = digits.len() - 2;
    let sign = if value < 0.0 && digits.iter().any(|d| *d != 0) {
        "-"
    } else {
        ""
    };
    format!("{sign}{}.{}", to_str(&digits[..split]), to_str(&digits[split..]))
}

/// Currency prefix for an ISO code; results without a code are in rupees.
pub fn currency_symbol(code: Option<&str>) -> String {
    match code.map(str::to_uppercase).as_deref() {
        None | Some("INR") => "₹".to_string(),
        Some("USD") | Some("CAD") | Some("AUD") | Some("HKD") | Some("SGD") => "$".to_string(),
        Some("EUR") => "€".to_string(),
        Some("GBP") => "£".to_string(),
        Some("JPY") => "¥".to_string(),
        Some(other) => format!("{other} "),
    }
}

pub fn total_line(result: &AnalysisResult) -> String {
    format!(
        "Total Value: {}{}",
        currency_symbol(result.currency.as_deref()),
        fixed2(result.total_value)
    )
}

/// One breakdown line without the risk label, e.g.
/// `AAPL: 10 × ₹150 = ₹1500.00 | 100.00%`.
pub fn item_valuation(item: &BreakdownItem, currency: &str) -> String {
    format!(
        "{}: {} × {currency}{} = {currency}{} | {}%",
        item.symbol,
        item.quantity,
        item.price,
        fixed2(item.value),
        fixed2(item.percentage)
    )
}
