//! Lenient parameter parsing.

use std::str::FromStr;

/// Parse `value`, falling back to the type's default (zero for integers)
/// when it is malformed or out of range.
///
/// Request dimensions and the PDF417 security level go through this on
/// purpose: a bad number degrades the request instead of rejecting it, and
/// whatever consumes the value decides whether the default is usable.
pub fn parse_int_or_default<T>(value: &str) -> T
where
    T: FromStr + Default,
{
    value.parse().unwrap_or_default()
}
