// stepflow/src/schema/definition.rs

//! The `Schema` description type and its fluent constructors.

use serde_json::{json, Map, Value};

/// Description of an acceptable value shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
  /// Accepts anything, including `null`.
  Any,
  String,
  /// Any JSON number.
  Number,
  /// A JSON number without a fractional part, optionally bounded above (inclusive).
  Integer { max: Option<i64> },
  Boolean,
  Null,
  /// Exactly this value.
  Literal(Value),
  /// One of the listed strings.
  Enum(Vec<String>),
  /// Homogeneous array.
  Array(Box<Schema>),
  Object(ObjectSchema),
  /// First alternative that matches wins; see `validate` for discriminated unions.
  Union(Vec<Schema>),
  /// The inner shape or `null`.
  Nullable(Box<Schema>),
}

/// A named field of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
  pub name: String,
  pub schema: Schema,
  pub required: bool,
  /// Substituted when the field is absent. Only meaningful for non-required fields.
  pub default: Option<Value>,
  pub description: Option<String>,
}

/// Ordered list of fields; undeclared fields are dropped during validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
  pub fields: Vec<Field>,
}

impl Schema {
  pub fn any() -> Self {
    Schema::Any
  }

  pub fn string() -> Self {
    Schema::String
  }

  pub fn number() -> Self {
    Schema::Number
  }

  pub fn integer() -> Self {
    Schema::Integer { max: None }
  }

  pub fn boolean() -> Self {
    Schema::Boolean
  }

  pub fn null() -> Self {
    Schema::Null
  }

  pub fn literal(value: impl Into<Value>) -> Self {
    Schema::Literal(value.into())
  }

  pub fn enumeration<I, S>(variants: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Schema::Enum(variants.into_iter().map(Into::into).collect())
  }

  pub fn array(items: Schema) -> Self {
    Schema::Array(Box::new(items))
  }

  /// Starts an object schema; finish it with `.into()` or [`ObjectSchema::build`].
  pub fn object() -> ObjectSchema {
    ObjectSchema::default()
  }

  pub fn union<I>(alternatives: I) -> Self
  where
    I: IntoIterator<Item = Schema>,
  {
    Schema::Union(alternatives.into_iter().collect())
  }

  pub fn nullable(self) -> Self {
    match self {
      Schema::Nullable(_) | Schema::Any | Schema::Null => self,
      other => Schema::Nullable(Box::new(other)),
    }
  }

  /// Inclusive upper bound. Has no effect on anything but `Integer`.
  pub fn max(self, max: i64) -> Self {
    match self {
      Schema::Integer { .. } => Schema::Integer { max: Some(max) },
      other => other,
    }
  }

  /// Whether an explicit `null` satisfies this schema.
  pub fn accepts_null(&self) -> bool {
    matches!(self, Schema::Any | Schema::Null | Schema::Nullable(_)) || matches!(self, Schema::Literal(Value::Null))
  }

  /// Short human-readable description used in validation errors.
  pub fn describe(&self) -> String {
    match self {
      Schema::Any => "any value".to_string(),
      Schema::String => "string".to_string(),
      Schema::Number => "number".to_string(),
      Schema::Integer { max: None } => "integer".to_string(),
      Schema::Integer { max: Some(max) } => format!("integer <= {}", max),
      Schema::Boolean => "boolean".to_string(),
      Schema::Null => "null".to_string(),
      Schema::Literal(value) => format!("literal {}", value),
      Schema::Enum(variants) => format!("one of [{}]", variants.join(", ")),
      Schema::Array(items) => format!("array<{}>", items.describe()),
      Schema::Object(object) => {
        let names: Vec<&str> = object.fields.iter().map(|f| f.name.as_str()).collect();
        format!("object {{{}}}", names.join(", "))
      }
      Schema::Union(alternatives) => {
        let parts: Vec<String> = alternatives.iter().map(Schema::describe).collect();
        parts.join(" | ")
      }
      Schema::Nullable(inner) => format!("{} or null", inner.describe()),
    }
  }

  /// Renders this schema as a JSON Schema document, the shape agent hosts expect
  /// for tool parameters.
  pub fn to_json_schema(&self) -> Value {
    match self {
      Schema::Any => json!({}),
      Schema::String => json!({ "type": "string" }),
      Schema::Number => json!({ "type": "number" }),
      Schema::Integer { max: None } => json!({ "type": "integer" }),
      Schema::Integer { max: Some(max) } => json!({ "type": "integer", "maximum": max }),
      Schema::Boolean => json!({ "type": "boolean" }),
      Schema::Null => json!({ "type": "null" }),
      Schema::Literal(value) => json!({ "const": value }),
      Schema::Enum(variants) => json!({ "type": "string", "enum": variants }),
      Schema::Array(items) => json!({ "type": "array", "items": items.to_json_schema() }),
      Schema::Object(object) => object.to_json_schema(),
      Schema::Union(alternatives) => {
        let any_of: Vec<Value> = alternatives.iter().map(Schema::to_json_schema).collect();
        json!({ "anyOf": any_of })
      }
      Schema::Nullable(inner) => json!({ "anyOf": [inner.to_json_schema(), { "type": "null" }] }),
    }
  }
}

impl ObjectSchema {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a required field.
  pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Self {
    self.fields.push(Field {
      name: name.into(),
      schema,
      required: true,
      default: None,
      description: None,
    });
    self
  }

  /// Adds a field that may be absent.
  pub fn optional(mut self, name: impl Into<String>, schema: Schema) -> Self {
    self.fields.push(Field {
      name: name.into(),
      schema,
      required: false,
      default: None,
      description: None,
    });
    self
  }

  /// Adds a field that takes `default` when absent.
  pub fn with_default(mut self, name: impl Into<String>, schema: Schema, default: impl Into<Value>) -> Self {
    self.fields.push(Field {
      name: name.into(),
      schema,
      required: false,
      default: Some(default.into()),
      description: None,
    });
    self
  }

  /// Attaches a description to the most recently added field.
  pub fn describe(mut self, description: impl Into<String>) -> Self {
    if let Some(last) = self.fields.last_mut() {
      last.description = Some(description.into());
    }
    self
  }

  /// Appends every field of `other` that this schema does not already declare.
  pub fn extend(mut self, other: &ObjectSchema) -> Self {
    for field in &other.fields {
      if self.get(&field.name).is_none() {
        self.fields.push(field.clone());
      }
    }
    self
  }

  pub fn get(&self, name: &str) -> Option<&Field> {
    self.fields.iter().find(|f| f.name == name)
  }

  pub fn build(self) -> Schema {
    Schema::Object(self)
  }

  fn to_json_schema(&self) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in &self.fields {
      let mut property = field.schema.to_json_schema();
      if let Value::Object(map) = &mut property {
        if let Some(description) = &field.description {
          map.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(default) = &field.default {
          map.insert("default".to_string(), default.clone());
        }
      }
      properties.insert(field.name.clone(), property);
      if field.required {
        required.push(Value::String(field.name.clone()));
      }
    }
    json!({
      "type": "object",
      "properties": properties,
      "required": required,
    })
  }
}

impl From<ObjectSchema> for Schema {
  fn from(object: ObjectSchema) -> Self {
    Schema::Object(object)
  }
}
