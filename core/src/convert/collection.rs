//! Collection conversion with numeric range expansion.

use tracing::debug;

use super::{ConvertError, ConverterRegistry};
use crate::settings::ParserSettings;
use crate::types::{CollectionShape, ValueKind};
use crate::value::Value;

/// Largest number of elements a single range may expand to.
pub const MAX_RANGE_LEN: u64 = 65_536;

/// Expands `"start-end"` into the inclusive sequence of numbers as text.
///
/// Both parts must be unsigned digit sequences.
///
/// # Errors
///
/// [`ConvertError::InvalidRange`] for anything other than two digit parts,
/// [`ConvertError::ReversedRange`] when `start > end`, and
/// [`ConvertError::RangeTooLarge`] past [`MAX_RANGE_LEN`] elements.
///
/// # Examples
///
/// ```
/// use switchbind_core::{ConvertError, make_int_range};
///
/// assert_eq!(make_int_range("3-5").unwrap(), vec!["3", "4", "5"]);
/// assert_eq!(make_int_range("7-7").unwrap(), vec!["7"]);
/// assert_eq!(
///     make_int_range("5-3"),
///     Err(ConvertError::ReversedRange { start: 5, end: 3 })
/// );
/// assert!(make_int_range("1-2-3").is_err());
/// ```
pub fn make_int_range(element: &str) -> Result<Vec<String>, ConvertError> {
    let parts: Vec<&str> = element.split('-').map(str::trim).collect();
    let [start, end] = parts.as_slice() else {
        return Err(ConvertError::InvalidRange(element.to_string()));
    };
    let start = parse_bound(start, element)?;
    let end = parse_bound(end, element)?;

    if start > end {
        return Err(ConvertError::ReversedRange { start, end });
    }
    if end - start >= MAX_RANGE_LEN {
        return Err(ConvertError::RangeTooLarge {
            start,
            end,
            limit: MAX_RANGE_LEN,
        });
    }

    Ok((start..=end).map(|n| n.to_string()).collect())
}

fn parse_bound(part: &str, element: &str) -> Result<u64, ConvertError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConvertError::InvalidRange(element.to_string()));
    }
    part.parse()
        .map_err(|_| ConvertError::InvalidRange(element.to_string()))
}

/// Returns `true` if `element` is exactly two digit runs joined by a dash.
fn is_digit_range(element: &str) -> bool {
    let digits = |part: &str| {
        let part = part.trim();
        !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
    };
    element
        .split_once('-')
        .is_some_and(|(start, end)| digits(start) && digits(end))
}

/// Returns `true` if `element` should be expanded as a range.
///
/// Digit ranges expand for every element kind, so `3-5` becomes `3`, `4`,
/// `5` before element conversion. Integer elements also treat any other
/// dashed text as a range, making malformed ranges an error; a leading `-`
/// followed by no other dash is a negative literal.
fn is_range(element: &str, kind: &ValueKind) -> bool {
    if is_digit_range(element) {
        return true;
    }
    if !kind.is_integer_like() {
        return false;
    }
    match element.strip_prefix('-') {
        Some(rest) => rest.contains('-'),
        None => element.contains('-'),
    }
}

pub(super) fn convert_collection(
    input: &str,
    shape: CollectionShape,
    element: &ValueKind,
    registry: &ConverterRegistry,
    settings: &ParserSettings,
) -> Result<Value, ConvertError> {
    let mut texts: Vec<String> = Vec::new();

    for raw in input.split(|c| settings.list_separators.contains(&c)) {
        let item = raw.trim();
        if item.is_empty() {
            continue;
        }
        if is_range(item, element) {
            let expanded = make_int_range(item)?;
            debug!(range = item, count = expanded.len(), "expanded range");
            texts.extend(expanded);
        } else {
            texts.push(item.to_string());
        }
    }

    let values = texts
        .iter()
        .map(|text| registry.convert(text, element, settings))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Value::from_elements(shape, values))
}
