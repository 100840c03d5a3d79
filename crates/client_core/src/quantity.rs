//! Bounds-checked quantity stepper.

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity(u32);

impl Default for Quantity {
    fn default() -> Self {
        Self(MIN_QUANTITY)
    }
}

impl Quantity {
    pub fn get(self) -> u32 {
        self.0
    }

    pub fn increment(&mut self) {
        if self.0 < MAX_QUANTITY {
            self.0 += 1;
        }
    }

    pub fn decrement(&mut self) {
        if self.0 > MIN_QUANTITY {
            self.0 -= 1;
        }
    }

    /// Stores the normalized value of user-typed text and returns the text to write back.
    pub fn set_raw(&mut self, raw: &str) -> String {
        self.0 = normalize(raw);
        self.display()
    }

    pub fn display(self) -> String {
        self.0.to_string()
    }
}

/// Leading-integer parse, clamped into `[MIN_QUANTITY, MAX_QUANTITY]`.
/// Anything without a leading integer falls back to the floor.
fn normalize(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, ch)| !ch.is_ascii_digit())
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        &rest[..end]
    };

    if digits.is_empty() || negative {
        return MIN_QUANTITY;
    }

    match digits.parse::<u64>() {
        Ok(value) if value < u64::from(MIN_QUANTITY) => MIN_QUANTITY,
        Ok(value) if value > u64::from(MAX_QUANTITY) => MAX_QUANTITY,
        Ok(value) => value as u32,
        // only overflow is possible here: an absurdly long digit run
        Err(_) => MAX_QUANTITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepper_respects_bounds() {
        let mut quantity = Quantity::default();
        quantity.decrement();
        assert_eq!(quantity.get(), 1);

        for _ in 0..150 {
            quantity.increment();
        }
        assert_eq!(quantity.get(), 99);

        quantity.decrement();
        assert_eq!(quantity.get(), 98);
    }

    #[test]
    fn raw_input_is_normalized_and_written_back() {
        let mut quantity = Quantity::default();
        assert_eq!(quantity.set_raw("abc"), "1");
        assert_eq!(quantity.set_raw(""), "1");
        assert_eq!(quantity.set_raw("0"), "1");
        assert_eq!(quantity.set_raw("-4"), "1");
        assert_eq!(quantity.set_raw("250"), "99");
        assert_eq!(quantity.set_raw("99999999999999999999999"), "99");
        assert_eq!(quantity.set_raw(" 12 "), "12");
        assert_eq!(quantity.set_raw("7 units"), "7");
        assert_eq!(quantity.set_raw("3.9"), "3");
        assert_eq!(quantity.get(), 3);
    }

    #[test]
    fn every_integer_normalizes_into_range_idempotently() {
        let mut quantity = Quantity::default();
        for typed in -200_i64..=200 {
            let shown = quantity.set_raw(&typed.to_string());
            let stored = quantity.get();
            assert!((MIN_QUANTITY..=MAX_QUANTITY).contains(&stored), "{typed} -> {stored}");
            assert_eq!(shown, stored.to_string());
            assert_eq!(quantity.set_raw(&shown), shown);
        }
    }
}
