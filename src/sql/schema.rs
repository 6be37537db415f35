//! Model descriptors and field resolution.

use std::fmt;
use std::str::FromStr;

use crate::dsl::ParameterName;

/// Value domain of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    String,
}

impl ScalarType {
    pub fn label(self) -> &'static str {
        match self {
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::Decimal => "decimal",
            ScalarType::Boolean => "boolean",
            ScalarType::Date => "date",
            ScalarType::DateTime => "datetime",
            ScalarType::String => "string",
        }
    }
}

impl FromStr for ScalarType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "bigint" | "smallint" => Ok(ScalarType::Integer),
            "float" | "double" | "real" => Ok(ScalarType::Float),
            "decimal" | "numeric" => Ok(ScalarType::Decimal),
            "boolean" | "bool" => Ok(ScalarType::Boolean),
            "date" => Ok(ScalarType::Date),
            "datetime" | "timestamp" => Ok(ScalarType::DateTime),
            "string" | "text" | "varchar" => Ok(ScalarType::String),
            _ => Err(format!("invalid column type: {value}")),
        }
    }
}

/// Column type: a scalar or an array of scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Scalar(ScalarType),
    Array(ScalarType),
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().strip_suffix("[]") {
            Some(element) => Ok(FieldType::Array(element.parse()?)),
            None => Ok(FieldType::Scalar(value.parse()?)),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(t) => write!(f, "{}", t.label()),
            FieldType::Array(t) => write!(f, "{}[]", t.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub field_type: FieldType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        ColumnDescriptor {
            name: name.into(),
            field_type,
        }
    }
}

/// A table, optionally under an alias, and its columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub table: String,
    pub alias: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
}

impl ModelDescriptor {
    pub fn new(table: impl Into<String>) -> Self {
        ModelDescriptor {
            table: table.into(),
            alias: None,
            columns: Vec::new(),
        }
    }

    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn column(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.columns.push(ColumnDescriptor::new(name, field_type));
        self
    }

    /// The name SQL refers to this model by: the alias if any, else the table.
    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A resolved, typed column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub qualifier: String,
    pub name: String,
    pub field_type: FieldType,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.qualifier, self.name)
    }
}

/// Maps a parameter reference onto a field of one model.
pub trait FieldResolver {
    fn resolve_field(&self, model: &ModelDescriptor, parameter: &ParameterName) -> Option<Field>;
}

impl<F> FieldResolver for F
where
    F: Fn(&ModelDescriptor, &ParameterName) -> Option<Field>,
{
    fn resolve_field(&self, model: &ModelDescriptor, parameter: &ParameterName) -> Option<Field> {
        self(model, parameter)
    }
}

/// Resolves against the descriptors' own column lists.
///
/// A qualified parameter must name the model: its alias when aliased,
/// otherwise its table (case-insensitive). Unqualified parameters match any
/// model with the column.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaResolver;

impl FieldResolver for SchemaResolver {
    fn resolve_field(&self, model: &ModelDescriptor, parameter: &ParameterName) -> Option<Field> {
        if let Some(base) = parameter.base() {
            if !model.label().eq_ignore_ascii_case(base) {
                return None;
            }
        }

        let column = model.find_column(parameter.name())?;
        Some(Field {
            qualifier: model.label().to_string(),
            name: column.name.clone(),
            field_type: column.field_type,
        })
    }
}
