//! Currency catalog and amount formatting
//!
//! The currency is a display label only; nothing is ever converted.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::Settings;
use crate::types::{SymbolPosition, TransactionKind};
use pocketbook_utils::format_number;

/// Text shown instead of an amount when amounts are hidden
pub const HIDDEN_AMOUNT: &str = "****";

/// Symbol used when the settings carry an empty currency label
const DEFAULT_SYMBOL: &str = "$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub name_ar: &'static str,
    pub position: SymbolPosition,
}

const fn latin(code: &'static str, symbol: &'static str, name: &'static str, name_ar: &'static str) -> Currency {
    Currency {
        code,
        symbol,
        name,
        name_ar,
        position: SymbolPosition::Before,
    }
}

const fn arabic(code: &'static str, symbol: &'static str, name: &'static str, name_ar: &'static str) -> Currency {
    Currency {
        code,
        symbol,
        name,
        name_ar,
        position: SymbolPosition::After,
    }
}

pub const CURRENCIES: [Currency; 15] = [
    latin("USD", "$", "US Dollar", "دولار أمريكي"),
    latin("EUR", "€", "Euro", "يورو"),
    latin("GBP", "£", "British Pound", "جنيه إسترليني"),
    arabic("SAR", "ر.س", "Saudi Riyal", "ريال سعودي"),
    arabic("AED", "د.إ", "UAE Dirham", "درهم إماراتي"),
    arabic("EGP", "ج.م", "Egyptian Pound", "جنيه مصري"),
    arabic("JOD", "د.أ", "Jordanian Dinar", "دينار أردني"),
    arabic("KWD", "د.ك", "Kuwaiti Dinar", "دينار كويتي"),
    arabic("QAR", "ر.ق", "Qatari Riyal", "ريال قطري"),
    arabic("BHD", "د.ب", "Bahraini Dinar", "دينار بحريني"),
    arabic("OMR", "ر.ع", "Omani Rial", "ريال عماني"),
    arabic("LBP", "ل.ل", "Lebanese Pound", "ليرة لبنانية"),
    arabic("MAD", "د.م", "Moroccan Dirham", "درهم مغربي"),
    arabic("TND", "د.ت", "Tunisian Dinar", "دينار تونسي"),
    arabic("DZD", "د.ج", "Algerian Dinar", "دينار جزائري"),
];

/// Find a currency by code, ignoring case
pub fn find_currency(code: &str) -> Option<&'static Currency> {
    let code = code.trim();
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Symbol and placement for a label. Unknown labels are shown as-is after
/// the number; an empty label gets a dollar sign.
fn symbol_for(label: &str) -> (&str, SymbolPosition) {
    match find_currency(label) {
        Some(currency) => (currency.symbol, currency.position),
        None if label.trim().is_empty() => (DEFAULT_SYMBOL, SymbolPosition::Before),
        None => (label.trim(), SymbolPosition::After),
    }
}

/// Render an amount with two decimals, grouping and the currency symbol
pub fn format_amount(amount: Decimal, settings: &Settings) -> String {
    if settings.hide_amounts {
        return HIDDEN_AMOUNT.to_string();
    }

    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = format_number(rounded.abs());

    let (symbol, position) = symbol_for(&settings.currency_label);
    match position {
        SymbolPosition::Before => format!("{}{}{}", sign, symbol, digits),
        SymbolPosition::After => format!("{}{} {}", sign, digits, symbol),
    }
}

/// Like `format_amount`, prefixed with `+` for income and `-` for expenses
pub fn format_signed_amount(amount: Decimal, kind: TransactionKind, settings: &Settings) -> String {
    let body = format_amount(amount.abs(), settings);
    if settings.hide_amounts {
        return body;
    }
    match kind {
        TransactionKind::Income => format!("+{}", body),
        TransactionKind::Expense => format!("-{}", body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dec;

    fn settings(currency: &str) -> Settings {
        Settings {
            currency_label: currency.to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_catalog_codes_unique() {
        let mut codes: Vec<_> = CURRENCIES.iter().map(|c| c.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 15);
        assert_eq!(find_currency("sar").unwrap().symbol, "ر.س");
        assert!(find_currency("XYZ").is_none());
    }

    #[test]
    fn test_format_amount_symbol_before() {
        assert_eq!(format_amount(dec("1234.5"), &settings("USD")), "$1,234.50");
        assert_eq!(format_amount(dec("-30.5"), &settings("EUR")), "-€30.50");
        assert_eq!(format_amount(dec("0"), &settings("GBP")), "£0.00");
    }

    #[test]
    fn test_format_amount_symbol_after() {
        assert_eq!(format_amount(dec("5000"), &settings("SAR")), "5,000.00 ر.س");
    }

    #[test]
    fn test_format_amount_rounds_half_away_from_zero() {
        assert_eq!(format_amount(dec("2.345"), &settings("USD")), "$2.35");
        assert_eq!(format_amount(dec("-0.001"), &settings("USD")), "$0.00");
    }

    #[test]
    fn test_format_amount_unknown_label_falls_back() {
        assert_eq!(format_amount(dec("10"), &settings("XYZ")), "10.00 XYZ");
        assert_eq!(format_amount(dec("10"), &settings("")), "$10.00");
    }

    #[test]
    fn test_hidden_amounts() {
        let mut hidden = settings("USD");
        hidden.hide_amounts = true;
        assert_eq!(format_amount(dec("99"), &hidden), HIDDEN_AMOUNT);
        assert_eq!(
            format_signed_amount(dec("99"), TransactionKind::Expense, &hidden),
            HIDDEN_AMOUNT
        );
    }

    #[test]
    fn test_format_signed_amount() {
        let usd = settings("USD");
        assert_eq!(format_signed_amount(dec("5"), TransactionKind::Income, &usd), "+$5.00");
        assert_eq!(format_signed_amount(dec("5"), TransactionKind::Expense, &usd), "-$5.00");
    }
}
