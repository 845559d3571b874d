//! Attribute value model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A global or variable attribute value.
///
/// NetCDF-style attributes are strings, scalars, or small numeric vectors.
/// Equality is structural: strings by content, scalars and vectors by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Integer scalar (counts, flags, versions)
    Int(i64),
    /// Floating point scalar (scale factors, offsets, valid ranges)
    Float(f64),
    /// Numeric vector (e.g. `valid_range`, `geospatial_bounds`)
    FloatList(Vec<f64>),
    /// Free text (timestamps, provenance, institution names)
    Text(String),
}

impl AttrValue {
    /// The text content, if this is a text attribute.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::FloatList(vs) => {
                write!(f, "[")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}
