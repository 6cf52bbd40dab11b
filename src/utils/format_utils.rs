/// Insert `separator` between every group of three integer digits.
/// `group_thousands("1234567.89", ',')` -> "1,234,567.89"
pub fn group_thousands(formatted: &str, separator: char) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(idx) => unsigned.split_at(idx),
        None => (unsigned, ""),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(formatted.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(*c);
    }

    format!("{}{}{}", sign, grouped, frac_part)
}

/// Keep only the characters that can appear in an axis price label.
pub fn strip_to_numeric(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | ' '))
        .collect()
}
