//! Loosely typed call arguments.
//!
//! Mirrors what a scripting host hands over: a value may be absent, null, of
//! the wrong kind, a function or a panel object. The validator turns these
//! into typed values or a parameter error.

use crate::events::Listener;
use crate::panel::Panel;
use serde_json::{Map, Value};

static UNDEFINED: Arg = Arg::Undefined;

#[derive(Clone, Debug)]
pub enum Arg {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map<String, Value>),
    Function(Listener),
    Panel(Panel),
}

impl Arg {
    pub fn type_name(&self) -> &'static str {
        match self {
            Arg::Undefined => "undefined",
            Arg::Null => "null",
            Arg::Bool(_) => "boolean",
            Arg::Number(_) => "number",
            Arg::String(_) => "string",
            Arg::Array(_) => "array",
            Arg::Object(_) => "object",
            Arg::Function(_) => "function",
            Arg::Panel(_) => "panel",
        }
    }

    /// True for both `undefined` and `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Arg::Undefined | Arg::Null)
    }
}

/// Argument at `index`, or `Undefined` when the caller passed fewer.
pub fn nth(args: &[Arg], index: usize) -> &Arg {
    args.get(index).unwrap_or(&UNDEFINED)
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Arg::Null,
            Value::Bool(b) => Arg::Bool(b),
            Value::Number(n) => Arg::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Arg::String(s),
            Value::Array(a) => Arg::Array(a),
            Value::Object(o) => Arg::Object(o),
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::String(value.to_string())
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Arg::Number(value.into())
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Number(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<Listener> for Arg {
    fn from(value: Listener) -> Self {
        Arg::Function(value)
    }
}

impl From<Panel> for Arg {
    fn from(value: Panel) -> Self {
        Arg::Panel(value)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Undefined, Into::into)
    }
}
