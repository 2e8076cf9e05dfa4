//! training::report — the fixed-width per-epoch console line.
//!
//! Fields appear in the order loss, alpha, decay, rho, sw. Each value is
//! rendered left-justified in a 6-character field with three decimals and a
//! leading space in place of a `+` sign (printf `%- 6.3f`).
use crate::training::metrics::EpochRecord;

/// Render one value as printf `%- 6.3f` would.
pub fn format_value(value: f64) -> String {
    let sign = if value.is_sign_negative() && !value.is_nan() { '-' } else { ' ' };
    let body = format!("{sign}{:.3}", value.abs());
    format!("{body:<6}")
}

/// The console line for one epoch.
pub fn format_line(record: &EpochRecord) -> String {
    format!(
        "    loss: {}    alpha: {}    decay: {}      rho: {}       sw: {} ",
        format_value(record.loss),
        format_value(record.alpha),
        format_value(record.decay),
        format_value(record.rho),
        format_value(record.sw),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Match printf `%- 6.3f` on the cases that matter for the report.
    //
    // Given
    // -----
    // - 0.5, −0.123, 12.34, 0.0.
    //
    // Expect
    // ------
    // - " 0.500", "-0.123", " 12.340", " 0.000".
    fn format_value_matches_printf_flags() {
        // Act / Assert
        assert_eq!(format_value(0.5), " 0.500");
        assert_eq!(format_value(-0.123), "-0.123");
        assert_eq!(format_value(12.34), " 12.340");
        assert_eq!(format_value(0.0), " 0.000");
    }

    #[test]
    // Purpose
    // -------
    // The line carries the five values in the order loss, alpha, decay,
    // rho, sw.
    //
    // Given
    // -----
    // - A record with distinct values.
    //
    // Expect
    // ------
    // - The exact fixed-width line.
    fn line_orders_fields() {
        // Arrange
        let record = EpochRecord { loss: 0.012, alpha: 0.512, decay: 0.045, rho: 12.34, sw: 3.21 };

        // Act
        let line = format_line(&record);

        // Assert
        assert_eq!(
            line,
            "    loss:  0.012    alpha:  0.512    decay:  0.045      rho:  12.340       sw:  3.210 "
        );
    }
}
