//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, PlagioArgs};
use crate::dataset::SentencePair;
use crate::error::Result;

/// Result structure for file comparison.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub file1: String,
    pub file2: String,
    pub preprocessed: bool,
    /// Percentage of `file1` words found in `file2`.
    pub similarity: f64,
}

/// Result structure for the training command.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub model_dir: String,
    pub total_features: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub train_accuracy: f64,
    pub train_f1_score: f64,
    pub accuracy: f64,
    pub f1_score: f64,
    pub status: String,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &PlagioArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output dataset records, one per line in human format.
pub fn output_records(records: &[SentencePair], args: &PlagioArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(&records, args),
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{} records", records.len());
                println!();
            }
            for record in records {
                println!(
                    "[{}] {} | {}",
                    record.label, record.sentence1, record.sentence2
                );
            }
            Ok(())
        }
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &PlagioArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in &obj {
                let formatted_val = format_value(val);
                println!("{key}: {formatted_val}");
            }
        }
        other => println!("{}", format_value(&other)),
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &PlagioArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() => format!("{f:.4}"),
            _ => n.to_string(),
        },
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(obj) => {
            let formatted_values = obj
                .iter()
                .map(|(k, v)| format!("{k}={}", format_value(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{formatted_values}}}")
        }
        serde_json::Value::Null => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("test")), "test");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!(0.5)), "0.5000");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!(null)), "n/a");
        assert_eq!(format_value(&json!(["a", 1])), "[a, 1]");
        assert_eq!(format_value(&json!({"cat": 0.25})), "{cat=0.2500}");
    }
}
