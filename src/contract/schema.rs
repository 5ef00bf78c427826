use crate::error::ContractError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Declared type of a contract field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TypeTag {
    #[strum(to_string = "string", serialize = "str", serialize = "text")]
    String,
    #[strum(to_string = "integer", serialize = "int")]
    Integer,
    #[strum(to_string = "number", serialize = "float")]
    Number,
    #[strum(to_string = "boolean", serialize = "bool")]
    Boolean,
    #[strum(to_string = "array", serialize = "list")]
    Array,
    #[strum(to_string = "map", serialize = "hash", serialize = "object")]
    Map,
    Any,
}

/// Field identifier → declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct TypeSchema {
    fields: BTreeMap<String, TypeTag>,
}

impl TypeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, tag: TypeTag) -> Result<Self, ContractError> {
        validate_identifier(name)?;
        self.fields.insert(name.to_string(), tag);
        Ok(self)
    }

    /// Build a schema from `field → type name` pairs, e.g. `{"count": "integer"}`.
    pub fn from_declaration<I, K, V>(decl: I) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut fields = BTreeMap::new();
        for (name, type_name) in decl {
            let name = name.as_ref();
            validate_identifier(name)?;
            let tag = TypeTag::from_str(type_name.as_ref().trim()).map_err(|_| {
                ContractError::InvalidSchema(format!(
                    "field '{name}' has unsupported type '{}'",
                    type_name.as_ref()
                ))
            })?;
            fields.insert(name.to_string(), tag);
        }
        Ok(Self { fields })
    }

    pub fn get(&self, name: &str) -> Option<TypeTag> {
        self.fields.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TypeTag)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for TypeSchema {
    type Error = ContractError;

    fn try_from(value: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        Self::from_declaration(value)
    }
}

impl From<TypeSchema> for BTreeMap<String, String> {
    fn from(value: TypeSchema) -> Self {
        value
            .fields
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect()
    }
}

/// Field identifiers follow `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_identifier(name: &str) -> Result<(), ContractError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ContractError::InvalidSchema(format!(
            "field name '{name}' is not a valid identifier"
        )))
    }
}
