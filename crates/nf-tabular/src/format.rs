//! Number rendering for answers: `1,234.56` money, `1,234` counts.

/// Two decimals with `,` thousands grouping, e.g. `1,200.50`.
pub fn format_money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{}.{frac_part}", group_thousands(int_part))
}

/// Integer count with `,` thousands grouping.
pub fn format_count(count: usize) -> String {
    group_thousands(&count.to_string())
}

/// Quantity rounded to an integer, without grouping (e.g. `1200`).
pub fn format_quantity(quantity: f64) -> String {
    format!("{quantity:.0}")
}

/// Quantity rounded to an integer, with grouping (e.g. `1,200`).
pub fn format_quantity_grouped(quantity: f64) -> String {
    let rounded = format!("{:.0}", quantity.abs());
    let sign = if quantity < 0.0 && rounded != "0" { "-" } else { "" };
    format!("{sign}{}", group_thousands(&rounded))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
