//! Forecast overlay and amount presentation

use rust_decimal::{Decimal, RoundingStrategy};

use cashfeed_config::{CurrencyConfig, SymbolPosition};

use crate::models::{DisplayItem, ForecastRecord, Record};

/// Merge the feed with forecasts into one newest-first sequence
///
/// Records come before forecasts, each in their own order, and a stable sort
/// on calendar date (descending) keeps that order among same-day items.
/// Items whose date cannot be read sink to the bottom.
pub fn merge(records: &[Record], forecasts: &[ForecastRecord]) -> Vec<DisplayItem> {
    let mut items: Vec<DisplayItem> = records
        .iter()
        .cloned()
        .map(DisplayItem::Record)
        .chain(forecasts.iter().cloned().map(DisplayItem::Forecast))
        .collect();

    items.sort_by(|a, b| b.calendar_date().cmp(&a.calendar_date()));
    items
}

/// Flip between store sign (debits positive) and display sign (money in positive)
pub fn invert(amount: Decimal) -> Decimal {
    -amount
}

/// Amount as shown to the user for a stored amount
pub fn display_amount(stored: Decimal) -> Decimal {
    invert(stored)
}

/// Renders stored amounts for display. Never touches the records themselves.
pub struct AmountFormatter<'a> {
    config: &'a CurrencyConfig,
}

impl<'a> AmountFormatter<'a> {
    pub fn new(config: &'a CurrencyConfig) -> Self {
        Self { config }
    }

    /// Format a stored amount with the display sign applied
    pub fn format(&self, stored: Decimal) -> String {
        self.format_display(display_amount(stored))
    }

    /// Format an amount that is already in display sign
    pub fn format_display(&self, amount: Decimal) -> String {
        let places = self.config.decimal_places;
        let rounded =
            amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else if rounded.is_zero() || !self.config.show_plus_sign {
            ""
        } else {
            "+"
        };

        let magnitude = format!("{:.*}", places as usize, rounded.abs());
        let (whole, fraction) = match magnitude.split_once('.') {
            Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
            None => (magnitude.clone(), None),
        };

        let mut number = cashfeed_utils::format_number(&whole, &self.config.thousands_separator);
        if let Some(fraction) = fraction {
            number.push_str(&self.config.decimal_separator);
            number.push_str(&fraction);
        }

        match self.config.symbol_position {
            SymbolPosition::Before => format!("{}{}{}", sign, self.config.symbol, number),
            SymbolPosition::After => format!("{}{} {}", sign, number, self.config.symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, date: &str, amount: i64) -> Record {
        Record {
            id: id.to_string(),
            amount: Decimal::new(amount, 0),
            date: date.to_string(),
            counterparty_name: format!("Payee {}", id),
            merchant_name: None,
            merchant_entity_id: None,
            logo_url: None,
        }
    }

    fn forecast(id: &str, date: &str, amount: i64) -> ForecastRecord {
        ForecastRecord {
            id: Some(id.to_string()),
            user_id: "u1".to_string(),
            amount: Decimal::new(amount, 0),
            date: date.to_string(),
            counterparty_name: format!("Plan {}", id),
            merchant_name: None,
            merchant_entity_id: None,
            logo_url: None,
        }
    }

    fn ids(items: &[DisplayItem]) -> Vec<&str> {
        items.iter().filter_map(|i| i.id()).collect()
    }

    #[test]
    fn test_merge_sorts_newest_first() {
        let records = vec![record("r1", "2024-01-03", 5), record("r2", "2024-01-01", 5)];
        let forecasts = vec![forecast("f1", "2024-01-02", -5), forecast("f2", "2024-01-09", -5)];

        let merged = merge(&records, &forecasts);
        assert_eq!(ids(&merged), vec!["f2", "r1", "f1", "r2"]);
        for pair in merged.windows(2) {
            assert!(pair[0].calendar_date() >= pair[1].calendar_date());
        }
    }

    #[test]
    fn test_same_day_keeps_records_before_forecasts() {
        let records = vec![record("r9", "2024-01-05", 1), record("r3", "2024-01-05", 1)];
        let forecasts = vec![forecast("f2", "2024-01-05", -1), forecast("f1", "2024-01-05", -1)];

        let merged = merge(&records, &forecasts);
        assert_eq!(ids(&merged), vec!["r9", "r3", "f2", "f1"]);
        assert!(!merged[1].is_forecast());
        assert!(merged[2].is_forecast());
    }

    #[test]
    fn test_time_of_day_does_not_reorder_same_day() {
        let records = vec![
            record("early", "2024-01-05T08:00:00Z", 1),
            record("late", "2024-01-05T22:00:00Z", 1),
        ];
        let merged = merge(&records, &[]);
        assert_eq!(ids(&merged), vec!["early", "late"]);
    }

    #[test]
    fn test_unreadable_dates_sink() {
        let records = vec![record("bad", "someday", 1), record("ok", "2020-01-01", 1)];
        let merged = merge(&records, &[]);
        assert_eq!(ids(&merged), vec!["ok", "bad"]);
    }

    #[test]
    fn test_merge_does_not_touch_inputs() {
        let records = vec![record("r1", "2024-01-01", 42)];
        let merged = merge(&records, &[]);
        assert_eq!(merged[0].amount(), Decimal::new(42, 0));
        assert_eq!(records[0].amount, Decimal::new(42, 0));
    }

    #[test]
    fn test_display_inverts_store_sign() {
        let config = CurrencyConfig::default();
        let fmt = AmountFormatter::new(&config);
        assert_eq!(fmt.format(Decimal::new(1250, 2)), "-$12.50");
        assert_eq!(fmt.format(Decimal::new(-123456789, 2)), "+$1,234,567.89");
        assert_eq!(fmt.format(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_double_inversion_is_identity() {
        let config = CurrencyConfig::default();
        let fmt = AmountFormatter::new(&config);
        for stored in [Decimal::new(-5000, 2), Decimal::new(1, 2), Decimal::new(987654, 1)] {
            assert_eq!(fmt.format(invert(invert(stored))), fmt.format(stored));
        }
    }

    #[test]
    fn test_half_cents_round_away_from_zero() {
        let config = CurrencyConfig::default();
        let fmt = AmountFormatter::new(&config);
        assert_eq!(fmt.format(Decimal::new(125, 3)), "-$0.13");
        assert_eq!(fmt.format(Decimal::new(-2005, 3)), "+$2.01");
        assert_eq!(fmt.format(Decimal::new(-2004, 3)), "+$2.00");
    }

    #[test]
    fn test_formatting_options() {
        let config = CurrencyConfig {
            symbol: "EUR".to_string(),
            decimal_places: 0,
            thousands_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            symbol_position: SymbolPosition::After,
            show_plus_sign: false,
        };
        let fmt = AmountFormatter::new(&config);
        assert_eq!(fmt.format(Decimal::new(-1234, 0)), "1.234 EUR");
        assert_eq!(fmt.format(Decimal::new(999, 0)), "-999 EUR");
    }

    #[test]
    fn test_custom_decimal_separator() {
        let config = CurrencyConfig {
            decimal_separator: ",".to_string(),
            thousands_separator: " ".to_string(),
            ..CurrencyConfig::default()
        };
        let fmt = AmountFormatter::new(&config);
        assert_eq!(fmt.format(Decimal::new(-1234550, 3)), "+$1 234,55");
    }
}
