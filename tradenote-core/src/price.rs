//! Price rounding by magnitude.
//!
//! Instruments span fractional-pip currency pairs up to four-digit indices,
//! so the number of kept decimals shrinks as the price grows.

/// Round `value` to `decimals` places.
///
/// Rounds the exact binary value, so `147.0005` (stored as 147.000499...)
/// goes down. Scaling by a power of ten first would land on .5 and go up.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Decimals kept for a price of this magnitude.
pub fn decimals_for(price: f64) -> u32 {
    let magnitude = price.abs();
    if magnitude < 10.0 {
        5
    } else if magnitude < 1000.0 {
        3
    } else {
        2
    }
}

/// Round a price: 5 decimals below 10, 3 below 1000, 2 otherwise.
pub fn round_by_magnitude(price: f64) -> f64 {
    round_to(price, decimals_for(price))
}
