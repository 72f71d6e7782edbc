//! Validation Helpers
//!
//! Input checks shared by handlers and services: required text fields,
//! enum parsing and comma-separated query lists.

use crate::error::{ApiError, ApiResult};
use itagent_core::EnumParseError;
use std::str::FromStr;

/// Trait for validating non-empty strings.
///
/// # Example
/// ```ignore
/// use itagent_api::validation::ValidateNonEmpty;
///
/// let name = req.name.validate_non_empty("name")?;
/// ```
pub trait ValidateNonEmpty {
    /// Return the trimmed value, or `MissingField` when it is absent,
    /// empty or whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<String>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<String> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(trimmed.to_string())
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<String> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<String> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Whether an optional text field is absent or blank.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map(str::trim).map_or(true, str::is_empty)
}

/// Parse an optional enum field; blank counts as absent.
pub fn parse_optional<T>(value: Option<&str>) -> ApiResult<Option<T>>
where
    T: FromStr<Err = EnumParseError>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse::<T>().map(Some).map_err(ApiError::from),
        None => Ok(None),
    }
}

/// Parse a comma-separated list such as `status=pending,running`.
///
/// Blank items are skipped. `None` or an all-blank list yields `None`.
pub fn parse_csv_list<T>(value: Option<&str>) -> ApiResult<Option<Vec<T>>>
where
    T: FromStr<Err = EnumParseError>,
{
    let Some(raw) = value else {
        return Ok(None);
    };
    let items = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<T>().map_err(ApiError::from))
        .collect::<ApiResult<Vec<T>>>()?;
    Ok(if items.is_empty() { None } else { Some(items) })
}

/// Split a comma-separated free-text list, lowercasing each entry.
pub fn split_keywords(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split(',')
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
