/// Mean of `numbers` rounded to 2 decimal places (half away from zero).
/// Returns 0.0 for an empty slice.
pub fn average(numbers: &[i64]) -> f64 {
    if numbers.is_empty() {
        return 0.0;
    }
    // i128 keeps the sum exact for any window of i64 values.
    let sum: i128 = numbers.iter().map(|&n| i128::from(n)).sum();
    let mean = sum as f64 / numbers.len() as f64;
    round_2dp(mean)
}

#[inline]
fn round_2dp(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
