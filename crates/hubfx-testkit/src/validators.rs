//! Sample sync validators

use hubfx_forms::{FormErrors, Validator};
use serde_json::Value;

fn flag(key: &str, set: bool) -> FormErrors {
    FormErrors::from([(key.to_string(), set)])
}

/// `required`: null, empty string, empty sequence or empty mapping.
pub fn required() -> Validator {
    Validator::new("required", |value| {
        let empty = match value {
            Value::Null => true,
            Value::String(text) => text.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(members) => members.is_empty(),
            _ => false,
        };
        flag("required", empty)
    })
}

/// `email`: a non-empty string that is not `local@domain.tld`.
///
/// Empty values pass; combine with [`required`].
pub fn email() -> Validator {
    Validator::new("email", |value| {
        let text = value.as_str().unwrap_or_default();
        let valid = text.is_empty()
            || text.split_once('@').is_some_and(|(local, domain)| {
                !local.is_empty()
                    && domain
                        .split_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
            });
        flag("email", !valid)
    })
}

/// `phoneNumber`: a non-empty string without exactly ten digits (spaces,
/// dashes, dots and parentheses ignored).
pub fn phone_number() -> Validator {
    Validator::new("phoneNumber", |value| {
        let text = value.as_str().unwrap_or_default();
        let mut digits = 0;
        let mut stray = false;
        for c in text.chars() {
            match c {
                '0'..='9' => digits += 1,
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => stray = true,
            }
        }
        flag("phoneNumber", !text.is_empty() && (stray || digits != 10))
    })
}

/// `firstNameNotSameAsLast`: a `{firstName, lastName}` mapping with equal
/// names.
pub fn first_name_not_same_as_last() -> Validator {
    Validator::new("firstNameNotSameAsLast", |value| {
        flag(
            "firstNameNotSameAsLast",
            value.get("firstName") == value.get("lastName"),
        )
    })
}
