//! Result export to JSON and CSV files.

use crate::config::ExportFormat;
use crate::error::{CliError, Result};
use crate::output::render_cell;
use glean_domain::{ExtractionOutcome, Filter};
use std::fs;
use std::path::{Path, PathBuf};

/// Default export file stem in the current directory.
pub const DEFAULT_EXPORT_STEM: &str = "extraction_results";

/// Resolve the export path: explicit `--output`, or the default name.
pub fn resolve_path(output: Option<&Path>, format: ExportFormat) -> Result<PathBuf> {
    let extension = format
        .extension()
        .ok_or_else(|| CliError::InvalidInput("No export format selected".to_string()))?;

    match output {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(PathBuf::from(format!("{}.{}", DEFAULT_EXPORT_STEM, extension))),
    }
}

/// Write the outcome's records to `path` in the given format.
pub fn export_outcome(
    outcome: &ExtractionOutcome,
    filter: &Filter,
    format: ExportFormat,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match format {
        ExportFormat::Json => export_json(outcome, path),
        ExportFormat::Csv => export_csv(outcome, filter, path),
        ExportFormat::None => Ok(()),
    }
}

fn export_json(outcome: &ExtractionOutcome, path: &Path) -> Result<()> {
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &outcome.records)?;
    Ok(())
}

/// CSV columns: `input` first, then field names in filter order.
fn export_csv(outcome: &ExtractionOutcome, filter: &Filter, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["input"];
    header.extend(filter.field_names());
    writer.write_record(&header)?;

    for record in &outcome.records {
        let mut row = vec![record.input.clone()];
        for name in filter.field_names() {
            row.push(render_cell(record.get(name)));
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glean_domain::{FieldSpec, FieldType, Record, Scalar};
    use serde_json::{json, Map};
    use tempfile::TempDir;

    fn sample_filter() -> Filter {
        Filter::new(vec![
            FieldSpec::required("name", FieldType::Scalar(Scalar::Str)),
            FieldSpec::optional("scores", FieldType::List(Scalar::Int)),
        ])
        .unwrap()
    }

    fn sample_outcome() -> ExtractionOutcome {
        let mut outcome = ExtractionOutcome::empty("llama3");

        let mut fields = Map::new();
        fields.insert("name".to_string(), json!("Alice"));
        fields.insert("scores".to_string(), json!([90, 85]));
        outcome.records.push(Record::new("input one", fields));

        let mut fields = Map::new();
        fields.insert("name".to_string(), json!("Bob"));
        fields.insert("scores".to_string(), json!(null));
        outcome.records.push(Record::new("input two", fields));

        outcome
    }

    #[test]
    fn test_resolve_default_path() {
        let path = resolve_path(None, ExportFormat::Json).unwrap();
        assert_eq!(path, PathBuf::from("extraction_results.json"));

        let path = resolve_path(None, ExportFormat::Csv).unwrap();
        assert_eq!(path, PathBuf::from("extraction_results.csv"));
    }

    #[test]
    fn test_resolve_explicit_path() {
        let path = resolve_path(Some(Path::new("out/results.csv")), ExportFormat::Csv).unwrap();
        assert_eq!(path, PathBuf::from("out/results.csv"));
    }

    #[test]
    fn test_resolve_path_without_format() {
        assert!(resolve_path(None, ExportFormat::None).is_err());
    }

    #[test]
    fn test_export_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");

        export_outcome(&sample_outcome(), &sample_filter(), ExportFormat::Json, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["input"], "input one");
        assert_eq!(parsed[0]["fields"]["name"], "Alice");
    }

    #[test]
    fn test_export_csv_columns_in_filter_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");

        export_outcome(&sample_outcome(), &sample_filter(), ExportFormat::Csv, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), "input,name,scores");
        assert_eq!(lines.next().unwrap(), r#"input one,Alice,"[90,85]""#);
        // Null optional field becomes an empty cell
        assert_eq!(lines.next().unwrap(), "input two,Bob,");
    }

    #[test]
    fn test_export_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deep/results.json");

        export_outcome(&sample_outcome(), &sample_filter(), ExportFormat::Json, &path).unwrap();
        assert!(path.exists());
    }
}
