//! Nested OU naming: `"<Name> (<ou-id>)"` disambiguates same-named OUs at different
//! positions of the tree. Anything else is a plain name.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// `<Name> (<ou-id>)`; the name is everything before the single separating space
static NESTED_OU_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?P<name>.+) \((?P<id>ou-[0-9a-z]{4,32}-[0-9a-z]{8,32})\)$")
        .expect("NESTED_OU_REGEX is a valid regex pattern")
});

static OU_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ou-[0-9a-z]{4,32}-[0-9a-z]{8,32}$").expect("OU_ID_REGEX is a valid regex pattern")
});

/// How a caller referred to an OU
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OuReference {
    Nested { name: String, id: String },
    Plain(String),
}

impl OuReference {
    pub fn parse(reference: &str) -> Self {
        match parse_nested(reference) {
            Some((name, id)) => Self::Nested {
                name: name.to_string(),
                id: id.to_string(),
            },
            None => Self::Plain(reference.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Nested { name, .. } | Self::Plain(name) => name,
        }
    }
}

impl fmt::Display for OuReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nested { name, id } => f.write_str(&format_nested(name, id)),
            Self::Plain(name) => f.write_str(name),
        }
    }
}

/// Split a nested reference into `(name, id)`; `None` for plain names
pub fn parse_nested(reference: &str) -> Option<(&str, &str)> {
    let captures = NESTED_OU_REGEX.captures(reference)?;
    let name = captures.name("name")?.as_str();
    let id = captures.name("id")?.as_str();
    Some((name, id))
}

pub fn format_nested(name: &str, id: &str) -> String {
    format!("{name} ({id})")
}

pub fn is_ou_id(candidate: &str) -> bool {
    OU_ID_REGEX.is_match(candidate)
}
