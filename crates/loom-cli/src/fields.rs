//! Parses `--field NAME=VALUE` CLI arguments into a typed field map, using
//! the issue type's field schema (when loaded) to pick the right
//! [`FieldValue`] variant instead of always falling back to `Text`.

use std::collections::BTreeMap;

use loom_core::field_value::FieldValue;
use loom_core::template::{FieldType, TypeTemplate};

use crate::error::{CliError, CliResult};

pub fn parse_fields(raw: &[String], template: Option<&TypeTemplate>) -> CliResult<BTreeMap<String, FieldValue>> {
    let mut fields = BTreeMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once('=')
            .ok_or_else(|| CliError::invalid_input(format!("invalid --field {entry:?}, expected NAME=VALUE")))?;
        let field_type = template
            .and_then(|t| t.fields_schema.iter().find(|f| f.name == name))
            .map(|f| f.field_type);
        fields.insert(name.to_string(), parse_one(value, field_type)?);
    }
    Ok(fields)
}

fn parse_one(value: &str, field_type: Option<FieldType>) -> CliResult<FieldValue> {
    match field_type {
        Some(FieldType::Int) => value
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|_| CliError::invalid_input(format!("{value:?} is not a valid integer"))),
        Some(FieldType::Bool) => value
            .parse::<bool>()
            .map(FieldValue::Bool)
            .map_err(|_| CliError::invalid_input(format!("{value:?} is not a valid bool"))),
        Some(FieldType::List) => Ok(FieldValue::List(
            value.split(',').map(str::trim).map(String::from).collect(),
        )),
        Some(FieldType::Date) => Ok(FieldValue::Date(value.to_string())),
        Some(FieldType::Enum) => Ok(FieldValue::Enum(value.to_string())),
        Some(FieldType::Text) | None => Ok(FieldValue::Text(value.to_string())),
    }
}
