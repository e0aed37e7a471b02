//! Tag-driven marshaling of records into form-encoded strings.
//!
//! # Design
//! A record opts in by implementing [`UrlParams`], which lists its fields in
//! declaration order as `(field, tag, value)` triples. The [`url_params!`]
//! macro writes that impl from a `field => "tag"` table; fields left out of the
//! table are untagged and never marshaled.
//!
//! [`marshal`] tries every field before giving up. Tag and conversion failures
//! are collected into one [`MarshalError`] and the partial output is dropped.
//! The encoded pairs are sorted by key so the output never depends on field
//! order.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

use crate::tag::{parse_tag, TagError};
use crate::value::{ParamValue, ValueError};

/// Everything except ASCII alphanumerics and `-_.~` is escaped.
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One field of a record as seen by the marshaler.
pub struct Field<'a> {
    pub name: &'a str,
    pub tag: &'a str,
    pub value: &'a dyn ParamValue,
}

impl<'a> Field<'a> {
    pub fn new(name: &'a str, tag: &'a str, value: &'a dyn ParamValue) -> Self {
        Self { name, tag, value }
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// A record whose fields can be marshaled into a query string or form body.
pub trait UrlParams {
    /// Type name used in error messages.
    fn record_name(&self) -> &'static str;

    /// Fields in declaration order. A blank tag marks the field as untagged.
    fn fields(&self) -> Vec<Field<'_>>;
}

impl<T: UrlParams + ?Sized> UrlParams for &T {
    fn record_name(&self) -> &'static str {
        (**self).record_name()
    }

    fn fields(&self) -> Vec<Field<'_>> {
        (**self).fields()
    }
}

impl<T: UrlParams + ?Sized> UrlParams for Box<T> {
    fn record_name(&self) -> &'static str {
        (**self).record_name()
    }

    fn fields(&self) -> Vec<Field<'_>> {
        (**self).fields()
    }
}

impl<T: UrlParams + ?Sized> UrlParams for Rc<T> {
    fn record_name(&self) -> &'static str {
        (**self).record_name()
    }

    fn fields(&self) -> Vec<Field<'_>> {
        (**self).fields()
    }
}

impl<T: UrlParams + ?Sized> UrlParams for Arc<T> {
    fn record_name(&self) -> &'static str {
        (**self).record_name()
    }

    fn fields(&self) -> Vec<Field<'_>> {
        (**self).fields()
    }
}

/// Implement [`UrlParams`] for one or more structs from a field/tag table.
///
/// ```
/// use formfetch_core::{marshal, url_params};
///
/// struct AddRecord {
///     name: String,
///     priority: String,
///     note: String,
/// }
///
/// url_params! {
///     AddRecord {
///         name => "name",
///         priority => "priority,omitempty",
///     }
/// }
///
/// let record = AddRecord {
///     name: "www".into(),
///     priority: String::new(),
///     note: "not sent".into(),
/// };
/// assert_eq!(marshal(&record).unwrap(), "name=www");
/// ```
#[macro_export]
macro_rules! url_params {
    ($($ty:ty { $($field:ident => $tag:literal),* $(,)? })+) => {
        $(
            impl $crate::UrlParams for $ty {
                fn record_name(&self) -> &'static str {
                    stringify!($ty)
                }

                fn fields(&self) -> ::std::vec::Vec<$crate::Field<'_>> {
                    ::std::vec![$($crate::Field::new(stringify!($field), $tag, &self.$field)),*]
                }
            }
        )+
    };
}

/// Why a single field could not be marshaled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldErrorKind {
    #[error(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    Value(#[from] ValueError),
}

/// A per-field marshaling failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {field}: {kind}")]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
}

/// Every field failure of one [`marshal`] call, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshalError {
    pub record: &'static str,
    pub errors: Vec<FieldError>,
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "urlparams: type {}, {error}", self.record)?;
        }
        Ok(())
    }
}

impl std::error::Error for MarshalError {}

/// Marshal a record into a form-encoded string.
pub fn marshal<P: UrlParams + ?Sized>(record: &P) -> Result<String, MarshalError> {
    let mut pairs = Vec::new();
    let mut errors = Vec::new();

    for field in record.fields() {
        let raw = field.tag.trim();
        if raw.is_empty() {
            continue;
        }

        let tag = match parse_tag(raw) {
            Ok(tag) => tag,
            Err(e) => {
                errors.push(FieldError { field: field.name.to_string(), kind: e.into() });
                continue;
            }
        };

        let value = match field.value.to_param() {
            Ok(value) => value,
            Err(e) => {
                errors.push(FieldError { field: field.name.to_string(), kind: e.into() });
                continue;
            }
        };

        if tag.omit_empty() && value.is_empty() {
            continue;
        }

        pairs.push((tag.name.to_string(), value));
    }

    if !errors.is_empty() {
        return Err(MarshalError {
            record: record.record_name(),
            errors,
        });
    }

    Ok(encode_pairs(pairs))
}

/// Form-encode `(key, value)` pairs, sorted by key.
///
/// The sort is stable, so repeated keys keep their relative order.
pub fn encode_pairs(mut pairs: Vec<(String, String)>) -> String {
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::new();
    for (key, value) in &pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&form_escape(key));
        out.push('=');
        out.push_str(&form_escape(value));
    }
    out
}

/// Percent-encode one component, with space written as `+`.
pub fn form_escape(s: &str) -> String {
    utf8_percent_encode(s, FORM_ENCODE_SET)
        .to_string()
        .replace("%20", "+")
}

/// Input accepted by the builder's query and payload setters: either an
/// already-encoded string, used verbatim, or a record to marshal.
pub trait Params {
    fn encode(&self) -> Result<String, MarshalError>;
}

impl Params for str {
    fn encode(&self) -> Result<String, MarshalError> {
        Ok(self.to_string())
    }
}

impl Params for String {
    fn encode(&self) -> Result<String, MarshalError> {
        Ok(self.clone())
    }
}

impl<T: UrlParams + ?Sized> Params for T {
    fn encode(&self) -> Result<String, MarshalError> {
        marshal(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Complex;

    struct Single {
        test_field: String,
    }

    url_params! {
        Single { test_field => "test" }
    }

    struct WithOptional {
        some: String,
        optional: String,
    }

    url_params! {
        WithOptional {
            some => "some",
            optional => "optional,omitempty",
        }
    }

    #[test]
    fn single_field() {
        let record = Single { test_field: "test".into() };
        assert_eq!(marshal(&record).unwrap(), "test=test");
    }

    #[test]
    fn keys_are_sorted() {
        let record = WithOptional {
            some: "somevalue".into(),
            optional: "optional".into(),
        };
        assert_eq!(marshal(&record).unwrap(), "optional=optional&some=somevalue");
    }

    #[test]
    fn omitempty_drops_empty_value() {
        let record = WithOptional {
            some: "somevalue".into(),
            optional: String::new(),
        };
        assert_eq!(marshal(&record).unwrap(), "some=somevalue");
    }

    #[test]
    fn empty_value_without_omitempty_is_kept() {
        let record = WithOptional {
            some: String::new(),
            optional: "x".into(),
        };
        assert_eq!(marshal(&record).unwrap(), "optional=x&some=");
    }

    struct Untagged {
        f1: String,
        ignored: String,
        f2: String,
        blank: String,
    }

    url_params! {
        Untagged {
            f1 => "f1",
            f2 => "f2",
            blank => "  ",
        }
    }

    #[test]
    fn untagged_fields_are_skipped() {
        let record = Untagged {
            f1: "singlevalue1".into(),
            ignored: "never sent".into(),
            f2: "singlevalue2".into(),
            blank: "also never sent".into(),
        };
        assert_eq!(marshal(&record).unwrap(), "f1=singlevalue1&f2=singlevalue2");
        assert_eq!(record.ignored, "never sent");
    }

    #[test]
    fn values_are_form_encoded() {
        let record = Single {
            test_field: "value that need to be encoded &*^#@@$8".into(),
        };
        assert_eq!(
            marshal(&record).unwrap(),
            "test=value+that+need+to+be+encoded+%26%2A%5E%23%40%40%248"
        );
    }

    #[test]
    fn spaces_and_punctuation() {
        let record = Single { test_field: "a b&c".into() };
        assert_eq!(marshal(&record).unwrap(), "test=a+b%26c");
    }

    #[test]
    fn unreserved_characters_are_kept() {
        let record = Single { test_field: "A-z_0.9~".into() };
        assert_eq!(marshal(&record).unwrap(), "test=A-z_0.9~");
    }

    struct Mixed {
        string: String,
        int: i64,
        uint: u32,
        flag: bool,
        float: f64,
        complex: Complex<f64>,
    }

    url_params! {
        Mixed {
            string => "string",
            int => "int",
            uint => "uint",
            flag => "bool",
            float => "float",
            complex => "complex",
        }
    }

    #[test]
    fn mixed_value_kinds() {
        let record = Mixed {
            string: "value".into(),
            int: -146541,
            uint: 231,
            flag: true,
            float: 1.984e2,
            complex: Complex::new(10.0, 11.0),
        };
        assert_eq!(
            marshal(&record).unwrap(),
            "bool=true&complex=%2810.000000%2B11.000000i%29&float=198.400000&int=-146541&string=value&uint=231"
        );
    }

    #[test]
    fn indirection_marshals_identically() {
        let record = Single { test_field: "value".into() };
        let direct = marshal(&record).unwrap();
        assert_eq!(marshal(&&record).unwrap(), direct);
        assert_eq!(marshal(&Box::new(Single { test_field: "value".into() })).unwrap(), direct);
        assert_eq!(marshal(&Arc::new(Single { test_field: "value".into() })).unwrap(), direct);
    }

    struct Pointers {
        boxed: Box<u8>,
        maybe: Option<String>,
    }

    url_params! {
        Pointers {
            boxed => "boxed",
            maybe => "maybe,omitempty",
        }
    }

    #[test]
    fn field_indirection_is_dereferenced() {
        let record = Pointers { boxed: Box::new(5), maybe: None };
        assert_eq!(marshal(&record).unwrap(), "boxed=5");

        let record = Pointers { boxed: Box::new(5), maybe: Some("yes".into()) };
        assert_eq!(marshal(&record).unwrap(), "boxed=5&maybe=yes");
    }

    struct BadTags {
        good: String,
        unknown: String,
        nameless: String,
        list: Vec<u8>,
    }

    url_params! {
        BadTags {
            good => "good",
            unknown => "unknown,required",
            nameless => ",omitempty",
            list => "list",
        }
    }

    #[test]
    fn every_field_error_is_collected() {
        let record = BadTags {
            good: "fine".into(),
            unknown: "x".into(),
            nameless: "y".into(),
            list: vec![1],
        };
        let err = marshal(&record).unwrap_err();
        assert_eq!(err.record, "BadTags");
        assert_eq!(err.errors.len(), 3);
        assert_eq!(err.errors[0].field, "unknown");
        assert!(matches!(err.errors[0].kind, FieldErrorKind::Tag(TagError::UnknownFlag(_))));
        assert_eq!(err.errors[1].field, "nameless");
        assert!(matches!(err.errors[1].kind, FieldErrorKind::Tag(TagError::Empty)));
        assert_eq!(err.errors[2].field, "list");
        assert!(matches!(err.errors[2].kind, FieldErrorKind::Value(ValueError::Unsupported { .. })));
    }

    #[test]
    fn error_display_lists_each_field() {
        let record = BadTags {
            good: String::new(),
            unknown: String::new(),
            nameless: String::new(),
            list: Vec::new(),
        };
        let message = marshal(&record).unwrap_err().to_string();
        let lines: Vec<&str> = message.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("urlparams: type BadTags, field unknown: unknown flag"));
        assert!(lines[2].contains("unsupported type"));
    }

    struct Empty {}

    url_params! {
        Empty {}
    }

    #[test]
    fn record_without_fields_is_empty() {
        assert_eq!(marshal(&Empty {}).unwrap(), "");
    }

    #[test]
    fn encode_pairs_keeps_duplicate_key_order() {
        let pairs = vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "first".to_string()),
            ("a".to_string(), "second".to_string()),
        ];
        assert_eq!(encode_pairs(pairs), "a=first&a=second&b=2");
    }

    #[test]
    fn keys_are_escaped_too() {
        assert_eq!(
            encode_pairs(vec![("a key".to_string(), "v".to_string())]),
            "a+key=v"
        );
    }

    #[test]
    fn strings_are_used_verbatim() {
        assert_eq!("sid=1&x=a b".encode().unwrap(), "sid=1&x=a b");
        assert_eq!(String::from("raw").encode().unwrap(), "raw");
        let record = Single { test_field: "t".into() };
        assert_eq!(record.encode().unwrap(), "test=t");
    }
}
