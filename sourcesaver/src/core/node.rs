//! The decoded JSON tree.
//!
//! Batched-RPC responses are walked heuristically, so the tree is kept as an
//! explicit tagged union instead of typed structs. Mappings keep their source
//! key order to make every traversal deterministic.

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// A recursively-typed JSON value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonNode {
    /// `null`.
    #[default]
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Any JSON number.
    Number(f64),
    /// A string leaf. May itself contain an embedded JSON document.
    String(String),
    /// An ordered sequence.
    Array(Vec<JsonNode>),
    /// A mapping in source key order.
    Object(Vec<(String, JsonNode)>),
}

impl JsonNode {
    /// Parses a complete JSON document.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Returns the string value, if this is a string leaf.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the number, if this is a number.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True for the literal number `1`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_one(&self) -> bool {
        matches!(self, Self::Number(n) if *n == 1.0)
    }

    /// True for arrays and objects.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Iterates over direct children (array elements or object values).
    #[must_use]
    pub fn children(&self) -> Children<'_> {
        match self {
            Self::Array(items) => Children::Array(items.iter()),
            Self::Object(entries) => Children::Object(entries.iter()),
            _ => Children::Empty,
        }
    }

    /// Mutable counterpart of [`JsonNode::children`].
    pub fn children_mut(&mut self) -> ChildrenMut<'_> {
        match self {
            Self::Array(items) => ChildrenMut::Array(items.iter_mut()),
            Self::Object(entries) => ChildrenMut::Object(entries.iter_mut()),
            _ => ChildrenMut::Empty,
        }
    }
}

/// Iterator over the direct children of a [`JsonNode`].
#[derive(Debug)]
pub enum Children<'a> {
    /// Array elements.
    Array(std::slice::Iter<'a, JsonNode>),
    /// Object values.
    Object(std::slice::Iter<'a, (String, JsonNode)>),
    /// Leaves have no children.
    Empty,
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a JsonNode;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Array(it) => it.next(),
            Self::Object(it) => it.next().map(|(_, value)| value),
            Self::Empty => None,
        }
    }
}

/// Mutable iterator over the direct children of a [`JsonNode`].
#[derive(Debug)]
pub enum ChildrenMut<'a> {
    /// Array elements.
    Array(std::slice::IterMut<'a, JsonNode>),
    /// Object values.
    Object(std::slice::IterMut<'a, (String, JsonNode)>),
    /// Leaves have no children.
    Empty,
}

impl<'a> Iterator for ChildrenMut<'a> {
    type Item = &'a mut JsonNode;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Array(it) => it.next(),
            Self::Object(it) => it.next().map(|(_, value)| value),
            Self::Empty => None,
        }
    }
}

impl From<serde_json::Value> for JsonNode {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

struct JsonNodeVisitor;

impl<'de> Visitor<'de> for JsonNodeVisitor {
    type Value = JsonNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(JsonNode::Bool(v))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(JsonNode::Number(v as f64))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(JsonNode::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(JsonNode::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(JsonNode::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(JsonNode::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(JsonNode::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(JsonNode::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        JsonNode::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonNode::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, JsonNode>()? {
            entries.push((key, value));
        }
        Ok(JsonNode::Object(entries))
    }
}

impl<'de> Deserialize<'de> for JsonNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(JsonNodeVisitor)
    }
}

impl Serialize for JsonNode {
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => {
                // Integral values round-trip as integers.
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
