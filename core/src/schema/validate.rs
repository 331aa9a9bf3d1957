// stepflow/src/schema/validate.rs

//! Checks a `serde_json::Value` against a [`Schema`] and returns the normalized value.

use super::definition::{ObjectSchema, Schema};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a value was rejected, with a `$.a.b[2]`-style path to the offending part.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: expected {expected}, found {actual}")]
pub struct ValidationError {
  pub path: String,
  pub expected: String,
  pub actual: String,
}

impl ValidationError {
  fn new(path: &str, expected: impl Into<String>, actual: impl Into<String>) -> Self {
    Self {
      path: path.to_string(),
      expected: expected.into(),
      actual: actual.into(),
    }
  }
}

/// Validates `value` against `schema`.
///
/// On success the returned value has object defaults applied and undeclared object
/// fields removed. Never panics.
pub fn validate(schema: &Schema, value: &Value) -> Result<Value, ValidationError> {
  check(schema, value, "$")
}

fn check(schema: &Schema, value: &Value, path: &str) -> Result<Value, ValidationError> {
  match schema {
    Schema::Any => Ok(value.clone()),
    Schema::String => match value {
      Value::String(_) => Ok(value.clone()),
      other => Err(ValidationError::new(path, schema.describe(), describe_value(other))),
    },
    Schema::Number => match value {
      Value::Number(_) => Ok(value.clone()),
      other => Err(ValidationError::new(path, schema.describe(), describe_value(other))),
    },
    Schema::Integer { max } => check_integer(*max, schema, value, path),
    Schema::Boolean => match value {
      Value::Bool(_) => Ok(value.clone()),
      other => Err(ValidationError::new(path, schema.describe(), describe_value(other))),
    },
    Schema::Null => match value {
      Value::Null => Ok(Value::Null),
      other => Err(ValidationError::new(path, schema.describe(), describe_value(other))),
    },
    Schema::Literal(expected) => {
      if value == expected {
        Ok(value.clone())
      } else {
        Err(ValidationError::new(path, schema.describe(), compact(value)))
      }
    }
    Schema::Enum(variants) => match value {
      Value::String(s) if variants.iter().any(|v| v == s) => Ok(value.clone()),
      other => Err(ValidationError::new(path, schema.describe(), compact(other))),
    },
    Schema::Array(items) => match value {
      Value::Array(elements) => elements
        .iter()
        .enumerate()
        .map(|(idx, element)| check(items, element, &format!("{}[{}]", path, idx)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array),
      other => Err(ValidationError::new(path, schema.describe(), describe_value(other))),
    },
    Schema::Object(object) => check_object(object, schema, value, path),
    Schema::Union(alternatives) => check_union(alternatives, schema, value, path),
    Schema::Nullable(inner) => match value {
      Value::Null => Ok(Value::Null),
      other => check(inner, other, path),
    },
  }
}

fn check_integer(max: Option<i64>, schema: &Schema, value: &Value, path: &str) -> Result<Value, ValidationError> {
  let number = match value {
    Value::Number(n) => n,
    other => return Err(ValidationError::new(path, schema.describe(), describe_value(other))),
  };
  let whole = number.is_i64()
    || number.is_u64()
    || number.as_f64().map_or(false, |f| f.is_finite() && f.fract() == 0.0);
  if !whole {
    return Err(ValidationError::new(path, schema.describe(), format!("number {}", number)));
  }
  if let Some(max) = max {
    let too_large = match (number.as_i64(), number.as_u64()) {
      (Some(i), _) => i > max,
      (None, Some(_)) => true, // larger than i64::MAX
      (None, None) => number.as_f64().map_or(true, |f| f > max as f64),
    };
    if too_large {
      return Err(ValidationError::new(path, schema.describe(), format!("number {}", number)));
    }
  }
  Ok(value.clone())
}

fn check_object(object: &ObjectSchema, schema: &Schema, value: &Value, path: &str) -> Result<Value, ValidationError> {
  let map = match value {
    Value::Object(map) => map,
    other => return Err(ValidationError::new(path, schema.describe(), describe_value(other))),
  };

  let mut normalized = Map::with_capacity(object.fields.len());
  for field in &object.fields {
    let field_path = format!("{}.{}", path, field.name);
    // An explicit null on a non-required field reads as "absent" unless the field
    // itself accepts null; serde renders `Option::None` this way.
    let present = match map.get(&field.name) {
      Some(Value::Null) if !field.required && !field.schema.accepts_null() => None,
      other => other,
    };
    match present {
      Some(field_value) => {
        normalized.insert(field.name.clone(), check(&field.schema, field_value, &field_path)?);
      }
      None => match (&field.default, field.required) {
        (Some(default), _) => {
          normalized.insert(field.name.clone(), check(&field.schema, default, &field_path)?);
        }
        (None, true) => {
          return Err(ValidationError::new(&field_path, field.schema.describe(), "missing"));
        }
        (None, false) => {}
      },
    }
  }
  Ok(Value::Object(normalized))
}

fn check_union(alternatives: &[Schema], schema: &Schema, value: &Value, path: &str) -> Result<Value, ValidationError> {
  if let Some((key, chosen)) = discriminate(alternatives, value) {
    return match chosen {
      Some(alternative) => check(alternative, value, path),
      None => {
        let expected: Vec<String> = alternatives
          .iter()
          .filter_map(|alt| literal_field(alt, key))
          .map(|literal| literal.to_string())
          .collect();
        Err(ValidationError::new(
          &format!("{}.{}", path, key),
          format!("one of [{}]", expected.join(", ")),
          compact(&value[key]),
        ))
      }
    };
  }

  let mut failures = Vec::with_capacity(alternatives.len());
  for alternative in alternatives {
    match check(alternative, value, path) {
      Ok(normalized) => return Ok(normalized),
      Err(err) => failures.push((contradicts_literals(alternative, value), err)),
    }
  }

  // Report the last alternative whose literal fields the value does not contradict,
  // so an `{ok: false, message}` fallback does not hide the real offending field.
  let closest = failures
    .iter()
    .rev()
    .find(|(contradicted, _)| !contradicted)
    .or_else(|| failures.last())
    .map(|(_, err)| err);
  match closest {
    Some(inner) if inner.path != path => Err(ValidationError::new(
      &inner.path,
      format!("{} in {}", inner.expected, schema.describe()),
      inner.actual.clone(),
    )),
    _ => Err(ValidationError::new(path, schema.describe(), describe_value(value))),
  }
}

/// True when `schema` is an object pinning a literal field that `value` lacks or
/// carries with another value.
fn contradicts_literals(schema: &Schema, value: &Value) -> bool {
  match schema {
    Schema::Object(object) => object.fields.iter().any(|field| match &field.schema {
      Schema::Literal(literal) => value.get(&field.name) != Some(literal),
      _ => false,
    }),
    _ => false,
  }
}

/// Finds a field name that every alternative pins to a literal (e.g. `ok`, `status`)
/// and that `value` carries. Returns that name and the alternative whose literal
/// matches, if any.
fn discriminate<'a, 'k>(alternatives: &'a [Schema], value: &'k Value) -> Option<(&'k str, Option<&'a Schema>)> {
  let map = value.as_object()?;
  let first = match alternatives.first()? {
    Schema::Object(object) => object,
    _ => return None,
  };
  let candidates = first
    .fields
    .iter()
    .filter(|field| matches!(field.schema, Schema::Literal(_)))
    .map(|field| field.name.as_str());

  for candidate in candidates {
    let shared = alternatives.iter().all(|alt| literal_field(alt, candidate).is_some());
    if !shared {
      continue;
    }
    let (key, actual) = match map.get_key_value(candidate) {
      Some((key, actual)) => (key.as_str(), actual),
      None => continue,
    };
    let chosen = alternatives.iter().find(|alt| literal_field(alt, candidate) == Some(actual));
    return Some((key, chosen));
  }
  None
}

fn literal_field<'a>(schema: &'a Schema, name: &str) -> Option<&'a Value> {
  match schema {
    Schema::Object(object) => match object.get(name).map(|f| &f.schema) {
      Some(Schema::Literal(literal)) => Some(literal),
      _ => None,
    },
    _ => None,
  }
}

fn describe_value(value: &Value) -> String {
  match value {
    Value::Null => "null".to_string(),
    Value::Bool(_) => "boolean".to_string(),
    Value::Number(n) => format!("number {}", n),
    Value::String(_) => "string".to_string(),
    Value::Array(_) => "array".to_string(),
    Value::Object(_) => "object".to_string(),
  }
}

fn compact(value: &Value) -> String {
  const LIMIT: usize = 60;
  let rendered = value.to_string();
  if rendered.chars().count() <= LIMIT {
    rendered
  } else {
    let truncated: String = rendered.chars().take(LIMIT).collect();
    format!("{}...", truncated)
  }
}
