//! Field tag parsing.
//!
//! A tag is the annotation a record attaches to each marshaled field, e.g.
//! `"priority,omitempty"`. The first comma-separated segment is the
//! serialized name; every following segment must be a known flag keyword.

use thiserror::Error;

/// Errors produced while parsing a single field tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// The tag (or its name segment) is blank.
    #[error("empty tag")]
    Empty,

    /// A flag segment did not match any recognized keyword.
    #[error("unknown flag {0:?}")]
    UnknownFlag(String),
}

/// Set of flags attached to a tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagFlags(u8);

impl TagFlags {
    pub const EMPTY: TagFlags = TagFlags(0);

    /// Drop the field from the output when its converted value is empty.
    pub const OMIT_EMPTY: TagFlags = TagFlags(1);

    pub fn contains(self, other: TagFlags) -> bool {
        self.0 & other.0 == other.0
    }

    fn insert(&mut self, other: TagFlags) {
        self.0 |= other.0;
    }
}

/// A parsed tag: the serialized name and its flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTag<'a> {
    pub name: &'a str,
    pub flags: TagFlags,
}

impl FieldTag<'_> {
    pub fn omit_empty(&self) -> bool {
        self.flags.contains(TagFlags::OMIT_EMPTY)
    }
}

/// Parse a raw tag string.
///
/// Flag keywords are matched case-insensitively after trimming. Any
/// unrecognized flag fails the whole tag; no partially-parsed tag is ever
/// returned.
pub fn parse_tag(raw: &str) -> Result<FieldTag<'_>, TagError> {
    let mut segments = raw.split(',');

    let name = segments.next().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(TagError::Empty);
    }

    let mut flags = TagFlags::EMPTY;
    for segment in segments {
        let flag = segment.trim();
        match flag.to_ascii_lowercase().as_str() {
            "omitempty" => flags.insert(TagFlags::OMIT_EMPTY),
            _ => return Err(TagError::UnknownFlag(flag.to_string())),
        }
    }

    Ok(FieldTag { name, flags })
}
