use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(fields)) = data {
                if let Some(obj) = response.as_object_mut() {
                    obj.extend(fields);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a collection: JSON as `{ <name>: [...] }`, text as one line per row
pub fn output_rows<T: Serialize>(
    output_format: &OutputFormat,
    collection_name: &str,
    rows: &[T],
    empty_message: &str,
    render: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: rows }))?);
        }
        OutputFormat::Text if rows.is_empty() => {
            println!("{}", empty_message);
        }
        OutputFormat::Text => {
            for row in rows {
                println!("{}", render(row));
            }
        }
    }
    Ok(())
}

/// Output one value: pretty JSON, or `key: value` lines for text
pub fn output_value<T: Serialize>(output_format: &OutputFormat, value: &T) -> anyhow::Result<()> {
    let value = serde_json::to_value(value)?;
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Text => match &value {
            Value::Object(fields) => {
                for (key, field) in fields {
                    match field {
                        Value::String(s) => println!("{}: {}", key, s),
                        other => println!("{}: {}", key, other),
                    }
                }
            }
            other => println!("{}", other),
        },
    }
    Ok(())
}
