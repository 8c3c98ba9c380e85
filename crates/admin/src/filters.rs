//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use luxe_core::types::price::persian_digits;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    use chrono::Datelike;
    Ok(persian_digits(&chrono::Utc::now().year().to_string()))
}

/// Writes any number with Persian digits.
///
/// Usage in templates: `{{ stats.total|persian }}`
#[askama::filter_fn]
pub fn persian(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(persian_digits(&value.to_string()))
}

/// Formats a price as "۱,۲۵۰,۰۰۰ تومان".
#[askama::filter_fn]
pub fn toman(price: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(persian_digits(&price.to_string()))
}

/// Short hash of the stylesheet, for cache busting.
#[askama::filter_fn]
pub fn asset_version(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(env!("CSS_HASH").to_owned())
}
