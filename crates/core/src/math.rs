use rust_decimal::Decimal;

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// `part / whole × 100`, or zero when `whole` is zero.
pub fn percent(part: Decimal, whole: Decimal) -> Decimal {
    ratio(part, whole) * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_by_zero_is_zero() {
        assert_eq!(ratio(Decimal::TEN, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn percent_of_whole() {
        assert_eq!(percent(Decimal::from(20), Decimal::from(1000)), Decimal::from(2));
        assert_eq!(percent(Decimal::ONE, Decimal::ZERO), Decimal::ZERO);
    }
}
