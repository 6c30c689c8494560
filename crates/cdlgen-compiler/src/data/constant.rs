use std::rc::Rc;

use cdlgen_core::Scalar;

use super::Datalist;
use crate::symbols::SymbolId;

/// Payload of a literal constant.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    /// Reference to an enum constant symbol.
    Econst(SymbolId),
    /// Brace-delimited sublist; the payload of a compound or vlen instance.
    List(Rc<Datalist>),
    /// The `_` marker: substitute the type's fill value here.
    Fill,
}

/// A literal constant with the source line it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub value: Value,
    pub line: u32,
}

impl Constant {
    pub fn new(value: Value) -> Self {
        Self { value, line: 0 }
    }

    pub fn at(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn scalar(value: Scalar) -> Self {
        Self::new(Value::Scalar(value))
    }

    pub fn char(c: u8) -> Self {
        Self::scalar(Scalar::Char(c))
    }

    pub fn byte(v: i8) -> Self {
        Self::scalar(Scalar::Byte(v))
    }

    pub fn short(v: i16) -> Self {
        Self::scalar(Scalar::Short(v))
    }

    pub fn int(v: i32) -> Self {
        Self::scalar(Scalar::Int(v))
    }

    pub fn int64(v: i64) -> Self {
        Self::scalar(Scalar::Int64(v))
    }

    pub fn float(v: f32) -> Self {
        Self::scalar(Scalar::Float(v))
    }

    pub fn double(v: f64) -> Self {
        Self::scalar(Scalar::Double(v))
    }

    pub fn string(text: impl Into<Vec<u8>>) -> Self {
        Self::scalar(Scalar::String(text.into()))
    }

    /// Opaque constant from hex nibbles, with or without a `0x` prefix.
    pub fn opaque(hex: &str) -> Self {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        Self::scalar(Scalar::Opaque(hex.to_ascii_lowercase()))
    }

    pub fn econst(id: SymbolId) -> Self {
        Self::new(Value::Econst(id))
    }

    pub fn list(list: Datalist) -> Self {
        Self::new(Value::List(Rc::new(list)))
    }

    /// Sublist constant sharing an existing datalist node.
    pub fn shared(list: Rc<Datalist>) -> Self {
        Self::new(Value::List(list))
    }

    pub fn fill() -> Self {
        Self::new(Value::Fill)
    }

    pub fn is_fill(&self) -> bool {
        matches!(self.value, Value::Fill)
    }

    pub fn is_list(&self) -> bool {
        matches!(self.value, Value::List(_))
    }

    pub fn as_list(&self) -> Option<&Rc<Datalist>> {
        match &self.value {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Scalar> for Constant {
    fn from(value: Scalar) -> Self {
        Self::scalar(value)
    }
}
