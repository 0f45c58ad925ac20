//! Bool and scalar conversions.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::ConvertError;
use crate::secure::SecureText;
use crate::types::ValueKind;
use crate::value::Value;

/// Tokens converted to `true`, compared case-insensitively.
pub const TRUE_TOKENS: [&str; 5] = ["true", "t", "yes", "y", "1"];

/// Tokens converted to `false`, compared case-insensitively.
pub const FALSE_TOKENS: [&str; 5] = ["false", "f", "no", "n", "0"];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

pub(super) fn convert_bool(input: &str, presence_as_true: bool) -> Result<Value, ConvertError> {
    let token = input.trim().to_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        return Ok(Value::Bool(true));
    }
    if FALSE_TOKENS.contains(&token.as_str()) {
        return Ok(Value::Bool(false));
    }
    if presence_as_true {
        return Ok(Value::Bool(true));
    }
    Err(ConvertError::invalid(
        input,
        &ValueKind::Bool,
        "expected one of true/t/yes/y/1 or false/f/no/n/0",
    ))
}

/// Parses a single scalar with the standard library and chrono.
pub(super) fn convert_scalar(input: &str, kind: &ValueKind) -> Result<Value, ConvertError> {
    match kind {
        ValueKind::String => Ok(Value::String(input.to_string())),
        ValueKind::Secure => Ok(Value::Secure(SecureText::from_chars(input.chars()))),
        ValueKind::Bool => input
            .trim()
            .parse()
            .map(Value::Bool)
            .map_err(|e| ConvertError::invalid(input, kind, e)),
        ValueKind::Char => {
            let mut chars = input.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(ConvertError::invalid(
                    input,
                    kind,
                    "expected exactly one character",
                )),
            }
        }
        ValueKind::Integer => input
            .trim()
            .parse()
            .map(Value::Integer)
            .map_err(|e| ConvertError::invalid(input, kind, e)),
        ValueKind::Unsigned => input
            .trim()
            .parse()
            .map(Value::Unsigned)
            .map_err(|e| ConvertError::invalid(input, kind, e)),
        ValueKind::Float => input
            .trim()
            .parse()
            .map(Value::Float)
            .map_err(|e| ConvertError::invalid(input, kind, e)),
        ValueKind::DateTime => parse_datetime(input.trim())
            .map(Value::DateTime)
            .ok_or_else(|| ConvertError::invalid(input, kind, "unrecognised date format")),
        ValueKind::Path => {
            if input.trim().is_empty() {
                return Err(ConvertError::invalid(input, kind, "path is empty"));
            }
            Ok(Value::Path(PathBuf::from(input)))
        }
        ValueKind::Choice(names) => names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(input.trim()))
            .map(|name| Value::Choice(name.clone()))
            .ok_or_else(|| ConvertError::NotAChoice {
                input: input.to_string(),
                choices: names.clone(),
            }),
        ValueKind::Custom(_) | ValueKind::Collection { .. } => {
            Err(ConvertError::NoConverter(kind.to_string()))
        }
    }
}

fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_bool_tokens() {
        for token in ["t", "T", "1", "yes", "Y", "TRUE"] {
            assert_eq!(convert_bool(token, false), Ok(Value::Bool(true)), "{token}");
        }
        for token in ["f", "0", "No", "false"] {
            assert_eq!(convert_bool(token, false), Ok(Value::Bool(false)), "{token}");
        }
    }

    #[test]
    fn test_bool_presence_implies_true() {
        assert_eq!(convert_bool("maybe", true), Ok(Value::Bool(true)));
        assert_eq!(convert_bool("", true), Ok(Value::Bool(true)));
        assert!(convert_bool("maybe", false).is_err());
        assert!(convert_bool("", false).is_err());
    }

    #[test]
    fn test_numeric_scalars() {
        assert_eq!(
            convert_scalar("-42", &ValueKind::Integer),
            Ok(Value::Integer(-42))
        );
        assert_eq!(
            convert_scalar(" 7 ", &ValueKind::Unsigned),
            Ok(Value::Unsigned(7))
        );
        assert!(convert_scalar("-1", &ValueKind::Unsigned).is_err());
        assert_eq!(
            convert_scalar("2.5", &ValueKind::Float),
            Ok(Value::Float(2.5))
        );
        assert!(matches!(
            convert_scalar("abc", &ValueKind::Integer),
            Err(ConvertError::Invalid { .. })
        ));
    }

    #[test]
    fn test_char_requires_single_character() {
        assert_eq!(convert_scalar("x", &ValueKind::Char), Ok(Value::Char('x')));
        assert!(convert_scalar("xy", &ValueKind::Char).is_err());
        assert!(convert_scalar("", &ValueKind::Char).is_err());
    }

    #[test]
    fn test_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(12, 30, 0))
            .unwrap();
        for input in [
            "2024-03-01T12:30:00",
            "2024-03-01 12:30",
            "2024-03-01T12:30:00Z",
        ] {
            assert_eq!(
                convert_scalar(input, &ValueKind::DateTime),
                Ok(Value::DateTime(expected)),
                "{input}"
            );
        }

        let midnight = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        assert_eq!(
            convert_scalar("2024-03-01", &ValueKind::DateTime),
            Ok(Value::DateTime(midnight))
        );
        assert!(convert_scalar("yesterday", &ValueKind::DateTime).is_err());
    }

    #[test]
    fn test_choice_is_case_insensitive() {
        let kind = ValueKind::Choice(vec!["Red".into(), "Green".into()]);
        assert_eq!(
            convert_scalar("green", &kind),
            Ok(Value::Choice("Green".into()))
        );
        assert!(matches!(
            convert_scalar("blue", &kind),
            Err(ConvertError::NotAChoice { .. })
        ));
    }

    #[test]
    fn test_secure_scalar_is_wrapped() {
        let value = convert_scalar("s3cret", &ValueKind::Secure).unwrap();
        let text = value.as_secure().unwrap();
        assert_eq!(text.expose_secret(), "s3cret");
        assert!(value.as_str().is_none());
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(convert_scalar("", &ValueKind::Path).is_err());
        assert_eq!(
            convert_scalar("out/file.txt", &ValueKind::Path),
            Ok(Value::Path(PathBuf::from("out/file.txt")))
        );
    }
}
