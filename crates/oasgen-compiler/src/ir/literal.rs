//! JSON literals carried into the IR (defaults, enum values, consts).

use ordered_float::OrderedFloat;

use crate::document::{Node, Value};

/// A JSON number as written in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Number {
    Int(i64),
    Float(OrderedFloat<f64>),
}

impl Number {
    pub fn from_json(n: &serde_json::Number) -> Self {
        match n.as_i64() {
            Some(i) => Number::Int(i),
            None => Number::Float(OrderedFloat(n.as_f64().unwrap_or(f64::NAN))),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f.0,
        }
    }

    pub fn is_integer(self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(f) => f.0.fract() == 0.0,
        }
    }

    /// Whether `self` is a multiple of `of`, computed in 64-bit float.
    pub fn is_multiple_of(self, of: Number) -> bool {
        let of = of.as_f64();
        of != 0.0 && (self.as_f64() % of) == 0.0
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x.0),
        }
    }
}

/// A JSON value with total ordering and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Literal>),
    Object(Vec<(String, Literal)>),
}

impl Literal {
    pub fn from_node(node: &Node) -> Self {
        match &node.value {
            Value::Null => Literal::Null,
            Value::Bool(b) => Literal::Bool(*b),
            Value::Number(n) => Literal::Number(Number::from_json(n)),
            Value::String(s) => Literal::String(s.clone()),
            Value::Array(items) => Literal::Array(items.iter().map(Literal::from_node).collect()),
            Value::Object(object) => Literal::Object(
                object
                    .iter()
                    .map(|(k, m)| (k.to_string(), Literal::from_node(&m.value)))
                    .collect(),
            ),
        }
    }

    pub fn json_type(&self) -> JsonType {
        match self {
            Literal::Null => JsonType::Null,
            Literal::Bool(_) => JsonType::Boolean,
            Literal::Number(n) if n.is_integer() => JsonType::Integer,
            Literal::Number(_) => JsonType::Number,
            Literal::String(_) => JsonType::String,
            Literal::Array(_) => JsonType::Array,
            Literal::Object(_) => JsonType::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text used to derive an identifier for an enum constant.
    pub fn ident_text(&self) -> String {
        match self {
            Literal::Null => "Null".to_string(),
            Literal::Bool(true) => "True".to_string(),
            Literal::Bool(false) => "False".to_string(),
            Literal::Number(Number::Int(i)) if *i < 0 => format!("Minus{}", i.unsigned_abs()),
            Literal::Number(n) => n.to_string().replace(['.', '-', '+'], "_"),
            Literal::String(s) if s.is_empty() => "Empty".to_string(),
            Literal::String(s) => s.clone(),
            Literal::Array(_) | Literal::Object(_) => "Value".to_string(),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Literal::Object(members) => {
                f.write_str("{")?;
                for (i, (k, v)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// JSON Schema instance types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsonType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    pub const ALL: [JsonType; 7] = [
        JsonType::Null,
        JsonType::Boolean,
        JsonType::Integer,
        JsonType::Number,
        JsonType::String,
        JsonType::Array,
        JsonType::Object,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "null" => JsonType::Null,
            "boolean" => JsonType::Boolean,
            "integer" => JsonType::Integer,
            "number" => JsonType::Number,
            "string" => JsonType::String,
            "array" => JsonType::Array,
            "object" => JsonType::Object,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }

    /// Whether a literal of type `value` is an instance of `self`.
    pub fn admits(self, value: JsonType) -> bool {
        self == value || (self == JsonType::Number && value == JsonType::Integer)
    }

    /// The type a decoder can observe on the wire; integers and numbers
    /// are indistinguishable there.
    pub fn wire(self) -> JsonType {
        match self {
            JsonType::Integer => JsonType::Number,
            other => other,
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
