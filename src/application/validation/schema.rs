use std::collections::HashMap;

use super::ValidationErrors;

/// Form fields as they arrive from the client, keyed by field name.
pub type RawPayload = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Free text. Surrounding whitespace is trimmed before checks.
    Text { min_len: usize, max_len: usize },
    /// Text taken verbatim (passwords).
    Secret { min_len: usize, max_len: usize },
    Integer { min: i64, max: Option<i64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub rule: FieldRule,
}

impl FieldSpec {
    pub const fn text(name: &'static str, label: &'static str, max_len: usize) -> Self {
        Self {
            name,
            label,
            required: true,
            rule: FieldRule::Text { min_len: 1, max_len },
        }
    }

    pub const fn integer(name: &'static str, label: &'static str, min: i64, max: Option<i64>) -> Self {
        Self {
            name,
            label,
            required: true,
            rule: FieldRule::Integer { min, max },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
}

/// The typed values a payload produced after passing its schema.
#[derive(Debug, Default)]
pub struct Accepted {
    values: HashMap<&'static str, Value>,
}

impl Accepted {
    pub fn take_text(&mut self, name: &str) -> Option<String> {
        match self.values.remove(name) {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(Value::Integer(n)) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub fn validate(&self, raw: &RawPayload) -> Result<Accepted, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let mut accepted = Accepted::default();

        for spec in self.fields {
            let input = raw.get(spec.name).map(String::as_str);
            match check_field(spec, input) {
                Ok(Some(value)) => {
                    accepted.values.insert(spec.name, value);
                }
                Ok(None) => {}
                Err(message) => errors.push(spec.name, message),
            }
        }

        errors.into_result(accepted)
    }
}

fn check_field(spec: &FieldSpec, input: Option<&str>) -> Result<Option<Value>, String> {
    let label = spec.label;
    let present = match spec.rule {
        FieldRule::Secret { .. } => input.filter(|s| !s.is_empty()),
        _ => input.map(str::trim).filter(|s| !s.is_empty()),
    };
    let Some(text) = present else {
        return if spec.required {
            Err(format!("\"{label}\" is required"))
        } else {
            Ok(None)
        };
    };

    match spec.rule {
        FieldRule::Text { min_len, max_len } | FieldRule::Secret { min_len, max_len } => {
            let len = text.chars().count();
            if len < min_len {
                return Err(format!("\"{label}\" must be at least {min_len} characters"));
            }
            if len > max_len {
                return Err(format!("\"{label}\" must be at most {max_len} characters"));
            }
            Ok(Some(Value::Text(text.to_string())))
        }
        FieldRule::Integer { min, max } => {
            let n: i64 = text
                .parse()
                .map_err(|_| format!("\"{label}\" must be a number"))?;
            if n < min {
                return Err(format!(
                    "\"{label}\" must be greater than or equal to {min}"
                ));
            }
            if let Some(max) = max {
                if n > max {
                    return Err(format!("\"{label}\" must be less than or equal to {max}"));
                }
            }
            Ok(Some(Value::Integer(n)))
        }
    }
}
