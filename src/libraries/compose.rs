use crate::models::LocationFix;

/// Build the SMS body for an alert.
///
/// The user's text passes through verbatim: no emoji or links are added, since
/// carriers filter those. With a location, exactly one line is appended, the
/// resolved address when there is one and the coordinates otherwise.
pub fn compose(message: &str, location: Option<&LocationFix>, address: Option<&str>) -> String {
    match (location, address) {
        (Some(_), Some(address)) => format!("{}\n\nAddress: {}", message, address),
        (Some(fix), None) => format!(
            "{}\n\nLocation: {}, {}",
            message,
            fixed4(fix.lat),
            fixed4(fix.lng)
        ),
        (None, _) => message.to_string(),
    }
}

/// Four decimal places, rounding on the exact binary value with ties away
/// from zero. Negative zero prints unsigned.
fn fixed4(value: f64) -> String {
    const SCALE: u128 = 10_000;

    if value == 0.0 {
        return "0.0000".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let bits = value.abs().to_bits();
    let biased_exp = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exp) = if biased_exp == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased_exp - 1075)
    };

    // Integral values need no rounding
    if exp >= 0 {
        return format!("{:.4}", value);
    }

    let shift = exp.unsigned_abs();
    let scaled = mantissa as u128 * SCALE;
    // scaled < 2^67, so any larger shift leaves less than half a unit
    let units = if shift > 67 {
        0
    } else {
        let half = 1u128 << (shift - 1);
        let remainder = scaled & ((1u128 << shift) - 1);
        (scaled >> shift) + u128::from(remainder >= half)
    };

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{:04}", sign, units / SCALE, units % SCALE)
}
