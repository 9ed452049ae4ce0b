//! Locale formatting collaborator
//!
//! `to_locale_string` hands each element to a [`LocaleFormatter`]. The
//! formatter is external code: it may do anything, including detaching the
//! view being formatted.

use crate::error::ViewResult;
use crate::value::Numeric;

/// Formats one element for a locale.
pub trait LocaleFormatter {
    fn to_localized_string(
        &self,
        value: Numeric,
        locales: Option<&str>,
        options: Option<&serde_json::Value>,
    ) -> ViewResult<String>;
}

/// Locale-independent formatter: the plain number-to-string rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl LocaleFormatter for PlainFormatter {
    fn to_localized_string(
        &self,
        value: Numeric,
        _locales: Option<&str>,
        _options: Option<&serde_json::Value>,
    ) -> ViewResult<String> {
        Ok(value.to_string())
    }
}

impl<F> LocaleFormatter for F
where
    F: Fn(Numeric, Option<&str>, Option<&serde_json::Value>) -> ViewResult<String>,
{
    fn to_localized_string(
        &self,
        value: Numeric,
        locales: Option<&str>,
        options: Option<&serde_json::Value>,
    ) -> ViewResult<String> {
        self(value, locales, options)
    }
}
