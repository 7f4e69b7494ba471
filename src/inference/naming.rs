//! Reference naming policy for document fields.
//!
//! Document stores declare no foreign keys, so references are guessed from
//! field names. Every convention lives in [`REFERENCE_RULES`], evaluated in
//! order; the first matching rule wins.

use std::sync::LazyLock;

use regex::Regex;

/// One naming convention for reference fields.
#[derive(Debug)]
pub struct ReferenceRule {
    /// Rule identifier
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Whether a match alone marks the field as a reference. Rules that
    /// don't only name the target of a field already known to be one
    /// (because it holds object ids).
    pub marks_reference: bool,
    /// Pattern with the referenced name in group 1
    pattern: Regex,
}

impl ReferenceRule {
    fn new(name: &'static str, description: &'static str, marks_reference: bool, pattern: &str) -> Self {
        Self {
            name,
            description,
            marks_reference,
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    /// The base name this rule extracts from `field`, if it matches.
    pub fn strip<'a>(&self, field: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(field)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// The reference suffix conventions, in evaluation order.
pub static REFERENCE_RULES: LazyLock<Vec<ReferenceRule>> = LazyLock::new(|| {
    vec![
        ReferenceRule::new(
            "snake_id",
            "snake_case _id suffix (author_id -> author)",
            true,
            r"(?i)^(.+)_id$",
        ),
        ReferenceRule::new(
            "camel_id",
            "camelCase Id suffix (profileId -> profile)",
            true,
            r"^(.*[a-z0-9])I[dD]$",
        ),
        ReferenceRule::new(
            "joined_id",
            "bare id suffix (userid -> user)",
            false,
            r"(?i)^(.+)id$",
        ),
    ]
});

fn matching_rule(field: &str) -> Option<(&'static ReferenceRule, &str)> {
    REFERENCE_RULES
        .iter()
        .find_map(|rule| rule.strip(field).map(|base| (rule, base)))
}

/// Whether the field name alone marks `field` as a reference.
pub fn has_reference_suffix(field: &str) -> bool {
    matching_rule(field).is_some_and(|(rule, _)| rule.marks_reference)
}

/// Guess the collection `field` refers to.
///
/// Strips the first matching suffix and lower-cases the rest. A field that
/// matches no rule yields its own lower-cased name.
pub fn guess_referenced_collection(field: &str) -> String {
    match matching_rule(field) {
        Some((_, base)) => base.to_lowercase(),
        None => field.to_lowercase(),
    }
}
