/// Formats `amount` as Indian rupees: lakh grouping, no trailing zero paise.
///
/// `1500.0` renders as `₹1,500`, `1234567.5` as `₹12,34,567.5`.
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("₹{amount}");
    }

    let paise = (amount.abs() * 100.0).round() as u64;
    let rupees = paise / 100;
    let fraction = paise % 100;

    let mut out = String::new();
    if amount < 0.0 && paise != 0 {
        out.push('-');
    }
    out.push('₹');
    out.push_str(&group_lakh(rupees));
    if fraction != 0 {
        let digits = format!("{fraction:02}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

// Last three digits, then pairs: 12,34,567.
fn group_lakh(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, c) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push(',');
    out.push_str(tail);
    out
}

/// Hides the middle of a UPI ID's local part for logs: `sarah.johnson@gpay` -> `sa*********on@gpay`.
pub fn mask_address(address: &str) -> String {
    let Some((local, domain)) = address.split_once('@') else {
        return address.to_string();
    };
    let chars: Vec<char> = local.chars().collect();
    if chars.len() <= 3 {
        return address.to_string();
    }

    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}@{domain}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_indian_grouping() {
        assert_eq!(format_amount(0.0), "₹0");
        assert_eq!(format_amount(1.0), "₹1");
        assert_eq!(format_amount(999.0), "₹999");
        assert_eq!(format_amount(1500.0), "₹1,500");
        assert_eq!(format_amount(100_000.0), "₹1,00,000");
        assert_eq!(format_amount(12_345_678.0), "₹1,23,45,678");
        assert_eq!(format_amount(1_234_567.5), "₹12,34,567.5");
        assert_eq!(format_amount(1500.07), "₹1,500.07");
        assert_eq!(format_amount(2.999), "₹3");
        assert_eq!(format_amount(-250.5), "-₹250.5");
    }

    #[test]
    fn formatting_is_stable() {
        for amount in [0.5, 1.0, 3200.0, 99_999.99, 100_000.0] {
            assert_eq!(format_amount(amount), format_amount(amount));
        }
    }

    #[test]
    fn masks_local_part() {
        assert_eq!(mask_address("sarah.johnson@gpay"), "sa*********on@gpay");
        assert_eq!(mask_address("abcd@paytm"), "abcd@paytm");
        assert_eq!(mask_address("abc@paytm"), "abc@paytm");
        assert_eq!(mask_address("not-an-address"), "not-an-address");
    }
}
