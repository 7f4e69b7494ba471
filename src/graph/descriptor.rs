//! Column descriptors and type tags.
//!
//! A [`ColumnDescriptor`] is structured in memory but crosses the boundary
//! as display text, the format the visualization frontend renders:
//!
//! ```text
//! order_id (PK) [INT]                 relational primary key
//! customer_id (FK:customers) [INT]    relational foreign key
//! tenant_id (PK) (FK:tenants) [INT]   both roles
//! _id (PK)                            document identifier
//! author_id (FK:author)               guessed document reference
//! rating (float|int)                  document field seen with several types
//! title                               single-typed document field
//! `total (gross)`                     name that would parse as annotated
//! ``                                  empty document field name
//! ```
//!
//! Names that are empty, start with a backtick, end in whitespace, `)` or
//! `]` render between backticks, with inner backticks doubled.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical classification of a sampled document value.
///
/// Ordering follows the rendered name so that sets of tags sort the same
/// way they print.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    ObjectId,
    Boolean,
    Integer,
    Float,
    Object,
    Array,
    Null,
    String,
    /// Any other driver type, carried by name (`datetime`, `binary`, ...).
    Other(String),
}

impl TypeTag {
    /// Rendered name of the tag.
    pub fn name(&self) -> &str {
        match self {
            TypeTag::ObjectId => "ObjectId",
            TypeTag::Boolean => "bool",
            TypeTag::Integer => "int",
            TypeTag::Float => "float",
            TypeTag::Object => "object",
            TypeTag::Array => "array",
            TypeTag::Null => "null",
            TypeTag::String => "string",
            TypeTag::Other(name) => name,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TypeTag {
    /// Inverse of [`TypeTag::name`]; unknown names become `Other`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ObjectId" => TypeTag::ObjectId,
            "bool" => TypeTag::Boolean,
            "int" => TypeTag::Integer,
            "float" => TypeTag::Float,
            "object" => TypeTag::Object,
            "array" => TypeTag::Array,
            "null" => TypeTag::Null,
            "string" => TypeTag::String,
            other => TypeTag::Other(other.to_string()),
        }
    }
}

impl FromStr for TypeTag {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TypeTag::from_name(s))
    }
}

impl PartialOrd for TypeTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name())
    }
}

/// Key roles a column plays. Both flags may be set at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnRole {
    pub primary_key: bool,
    pub foreign_key: bool,
}

impl ColumnRole {
    /// Neither primary nor foreign key.
    pub fn is_plain(&self) -> bool {
        !self.primary_key && !self.foreign_key
    }
}

/// Type annotation attached to a column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeInfo {
    #[default]
    None,
    /// Catalog-declared type, carried verbatim.
    Declared(String),
    /// Distinct tags observed across sampled documents, sorted.
    Observed(Vec<TypeTag>),
}

/// A display-ready column entry of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub role: ColumnRole,
    /// Node the column refers to, if it is a foreign key with a known target.
    pub referenced_node: Option<String>,
    pub type_info: TypeInfo,
}

impl ColumnDescriptor {
    /// A plain column with no annotation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: ColumnRole::default(),
            referenced_node: None,
            type_info: TypeInfo::None,
        }
    }

    /// Attach a catalog-declared type.
    pub fn with_declared_type(mut self, declared: impl Into<String>) -> Self {
        self.type_info = TypeInfo::Declared(declared.into());
        self
    }

    /// Attach observed document tags. Duplicates are removed and the rest sorted.
    pub fn with_observed_types(mut self, tags: impl IntoIterator<Item = TypeTag>) -> Self {
        let mut tags: Vec<TypeTag> = tags.into_iter().collect();
        tags.sort();
        tags.dedup();
        self.type_info = TypeInfo::Observed(tags);
        self
    }

    /// Mark as primary key.
    pub fn primary_key(mut self) -> Self {
        self.role.primary_key = true;
        self
    }

    /// Mark as foreign key referencing `target` (if known).
    pub fn foreign_key(mut self, target: Option<String>) -> Self {
        self.role.foreign_key = true;
        self.referenced_node = target;
        self
    }
}

const QUOTE: char = '`';

/// Whether `name` could be misread once annotations are peeled off.
fn needs_quoting(name: &str) -> bool {
    name.is_empty()
        || name.starts_with(QUOTE)
        || name.ends_with(|c: char| c == ')' || c == ']' || c.is_whitespace())
}

/// Strip the backtick quoting added by [`ColumnDescriptor`]'s `Display`.
fn unquote(rest: &str) -> Option<String> {
    let inner = rest.strip_prefix(QUOTE)?.strip_suffix(QUOTE)?;
    Some(inner.replace("``", "`"))
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if needs_quoting(&self.name) {
            write!(f, "`{}`", self.name.replace('`', "``"))?;
        } else {
            f.write_str(&self.name)?;
        }

        if self.role.primary_key {
            f.write_str(" (PK)")?;
        }
        if self.role.foreign_key {
            match &self.referenced_node {
                Some(target) => write!(f, " (FK:{})", target)?,
                None => f.write_str(" (FK)")?,
            }
        }

        match &self.type_info {
            TypeInfo::None => {}
            TypeInfo::Declared(declared) => write!(f, " [{}]", declared)?,
            // A single observed type prints as the bare name.
            TypeInfo::Observed(tags) if tags.len() > 1 && self.role.is_plain() => {
                let names: Vec<&str> = tags.iter().map(TypeTag::name).collect();
                write!(f, " ({})", names.join("|"))?;
            }
            TypeInfo::Observed(_) => {}
        }

        Ok(())
    }
}

/// Error parsing a rendered column descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid column descriptor: {0:?}")]
pub struct DescriptorParseError(pub String);

impl FromStr for ColumnDescriptor {
    type Err = DescriptorParseError;

    /// Parse rendered text back, peeling annotations off the right end.
    ///
    /// Empty input is an empty name, as written by older exports.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(ColumnDescriptor::new(""));
        }

        let mut rest = s.trim_end();
        let mut descriptor = ColumnDescriptor::new("");

        loop {
            if rest.ends_with(']') {
                if let Some(open) = rest.rfind(" [") {
                    let declared = &rest[open + 2..rest.len() - 1];
                    descriptor.type_info = TypeInfo::Declared(declared.to_string());
                    rest = rest[..open].trim_end();
                    continue;
                }
            }

            if rest.ends_with(')') {
                if let Some(open) = rest.rfind(" (") {
                    let annotation = &rest[open + 2..rest.len() - 1];
                    let recognized = match annotation {
                        "PK" => {
                            descriptor.role.primary_key = true;
                            true
                        }
                        "FK" => {
                            descriptor.role.foreign_key = true;
                            true
                        }
                        a if a.starts_with("FK:") => {
                            descriptor.role.foreign_key = true;
                            descriptor.referenced_node = Some(a[3..].to_string());
                            true
                        }
                        a if a.contains('|') => {
                            descriptor.type_info = TypeInfo::Observed(
                                a.split('|').map(TypeTag::from_name).collect(),
                            );
                            true
                        }
                        _ => false,
                    };
                    if recognized {
                        rest = rest[..open].trim_end();
                        continue;
                    }
                }
            }

            break;
        }

        if rest.is_empty() {
            return Err(DescriptorParseError(s.to_string()));
        }
        descriptor.name = match unquote(rest) {
            Some(name) if rest.len() >= 2 => name,
            _ => rest.to_string(),
        };
        Ok(descriptor)
    }
}

impl Serialize for ColumnDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColumnDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
