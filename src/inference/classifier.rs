//! Type classification of sampled document values.

use crate::graph::TypeTag;
use crate::metadata::Bson;

/// Classify one sampled value.
///
/// Checks run in priority order. Booleans are matched before integers and
/// never classify as [`TypeTag::Integer`]. Values outside the closed set
/// carry their BSON type name.
pub fn classify(value: &Bson) -> TypeTag {
    match value {
        Bson::ObjectId(_) => TypeTag::ObjectId,
        Bson::Boolean(_) => TypeTag::Boolean,
        Bson::Int32(_) | Bson::Int64(_) => TypeTag::Integer,
        Bson::Double(_) => TypeTag::Float,
        Bson::Document(_) => TypeTag::Object,
        Bson::Array(_) => TypeTag::Array,
        Bson::Null | Bson::Undefined => TypeTag::Null,
        Bson::String(_) | Bson::Symbol(_) => TypeTag::String,
        other => TypeTag::Other(other_type_name(other).to_string()),
    }
}

fn other_type_name(value: &Bson) -> &'static str {
    match value {
        Bson::DateTime(_) => "datetime",
        Bson::Binary(_) => "binary",
        Bson::Decimal128(_) => "decimal128",
        Bson::Timestamp(_) => "timestamp",
        Bson::RegularExpression(_) => "regex",
        Bson::JavaScriptCode(_) | Bson::JavaScriptCodeWithScope(_) => "code",
        Bson::DbPointer(_) => "dbpointer",
        Bson::MaxKey => "maxkey",
        Bson::MinKey => "minkey",
        _ => "unknown",
    }
}
