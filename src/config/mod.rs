use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::dsl::Parser;
use crate::sql::{FieldType, ModelDescriptor};

/// Models a filter is lowered against, as written in a YAML schema file.
#[derive(Debug, Deserialize)]
pub struct SchemaConfig {
    pub models: Vec<ModelConfig>,
}

impl SchemaConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()
            .with_context(|| format!("Config: Failed to read schema {}", path.display()))?;
        Ok(settings.try_deserialize()?)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from_str(text, ::config::FileFormat::Yaml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Typed descriptors, in file order.
    pub fn descriptors(&self) -> anyhow::Result<Vec<ModelDescriptor>> {
        self.models.iter().map(ModelConfig::descriptor).collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    pub table: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

impl ModelConfig {
    fn descriptor(&self) -> anyhow::Result<ModelDescriptor> {
        let mut model = ModelDescriptor::new(&self.table);
        if let Some(alias) = &self.alias {
            model = model.aliased(alias);
        }

        for column in &self.columns {
            let field_type = FieldType::from_str(&column.col_type)
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Config: model {} column {}", self.table, column.name))?;
            model = model.column(&column.name, field_type);
        }
        Ok(model)
    }
}

#[derive(Debug, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: String,
}

/// Named grammar configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Flavor {
    /// Conditions, between conditions and bare words
    #[default]
    Standard,
    /// Between conditions and conditions only
    Sql,
}

impl Flavor {
    pub fn parser(self) -> Parser {
        match self {
            Flavor::Standard => Parser::standard(),
            Flavor::Sql => Parser::sql(),
        }
    }
}
