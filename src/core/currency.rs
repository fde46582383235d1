/// Currency text in en-SG style: `SGD 1,250,000.00` with the code, or
/// `1,250,000` without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyFormatter {
    code: &'static str,
}

impl CurrencyFormatter {
    pub const SGD: CurrencyFormatter = CurrencyFormatter { code: "SGD" };

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Formats `value` with two decimals and the currency code when
    /// `with_symbol` is set, otherwise as a whole number.
    ///
    /// Missing or NaN values render as zero in the requested style. Ties
    /// round away from zero.
    pub fn format(&self, value: Option<f64>, with_symbol: bool) -> String {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            return if with_symbol {
                format!("{} 0.00", self.code)
            } else {
                "0".to_string()
            };
        };

        let digits = if with_symbol { 2 } else { 0 };
        let magnitude = grouped_magnitude(value.abs(), digits);
        // -0.001 rounds to zero and should not keep its sign.
        let negative = value < 0.0
            && (value.is_infinite() || magnitude.bytes().any(|b| matches!(b, b'1'..=b'9')));
        let sign = if negative { "-" } else { "" };

        if with_symbol {
            format!("{sign}{} {magnitude}", self.code)
        } else {
            format!("{sign}{magnitude}")
        }
    }
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self::SGD
    }
}

fn grouped_magnitude(abs: f64, digits: usize) -> String {
    if abs.is_infinite() {
        return "∞".to_string();
    }

    let (int_part, frac_part) = rounded_digits(abs, digits);

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + digits + 1);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if digits > 0 {
        grouped.push('.');
        grouped.push_str(&frac_part);
    }
    grouped
}

/// Rounds the shortest decimal form of `abs` to `digits` places, ties away
/// from zero, and returns the integer and fraction digits.
fn rounded_digits(abs: f64, digits: usize) -> (String, String) {
    // Display for f64 never uses exponent notation.
    let text = abs.to_string();
    let (int_text, frac_text) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut kept: Vec<u8> = int_text.bytes().collect();
    kept.extend(frac_text.bytes().chain(std::iter::repeat(b'0')).take(digits));
    let round_up = frac_text.as_bytes().get(digits).is_some_and(|d| *d >= b'5');

    if round_up {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }

    let split = kept.len() - digits;
    let int_part = String::from_utf8_lossy(&kept[..split]).into_owned();
    let frac_part = String::from_utf8_lossy(&kept[split..]).into_owned();
    (int_part, frac_part)
}
