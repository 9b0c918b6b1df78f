//! Filter definition: interactive prompts and filter files.

use crate::error::{CliError, Result};
use crate::output::Formatter;
use glean_domain::{FieldSpec, FieldType, Filter};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::path::Path;

/// Load a filter from a JSON file.
///
/// The file must contain an array of field specs:
/// `[{"name": "title", "type": "str", "optional": false}, ...]`
pub fn load_filter(path: &Path) -> Result<Filter> {
    let contents = fs::read_to_string(path)?;
    Filter::from_json(&contents).map_err(CliError::InvalidInput)
}

/// Define a filter interactively on the terminal.
///
/// Asks for field names until the user submits an empty name; at least one
/// field must be defined. Ctrl-C or Ctrl-D cancels.
pub fn define_filter_interactive(formatter: &Formatter) -> Result<Filter> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Config(format!("Failed to initialize editor: {}", e)))?;

    let mut fields: Vec<FieldSpec> = Vec::new();

    loop {
        let name = read_line(&mut editor, "Field name (press Enter to finish): ")?;
        let name = name.trim();

        if name.is_empty() {
            if fields.is_empty() {
                eprintln!("{}", formatter.warning("At least one field must be defined"));
                continue;
            }
            break;
        }

        if fields.iter().any(|f| f.name == name) {
            eprintln!(
                "{}",
                formatter.warning(&format!("Field '{}' is already defined", name))
            );
            continue;
        }

        let field_type = read_type(&mut editor, formatter)?;
        let optional = read_optional(&mut editor, formatter)?;

        fields.push(FieldSpec {
            name: name.to_string(),
            field_type,
            optional,
        });
    }

    Filter::new(fields).map_err(|e| CliError::InvalidInput(e.to_string()))
}

fn read_type(editor: &mut DefaultEditor, formatter: &Formatter) -> Result<FieldType> {
    println!("Available types:");
    for (idx, t) in FieldType::ALL.iter().enumerate() {
        println!("  {}. {}", idx + 1, t);
    }

    loop {
        let choice = read_line(editor, "Field type (enter number): ")?;
        match choice.trim().parse::<usize>() {
            Ok(n) if (1..=FieldType::ALL.len()).contains(&n) => {
                return Ok(FieldType::ALL[n - 1]);
            }
            _ => {
                eprintln!(
                    "{}",
                    formatter.warning(&format!(
                        "Enter a number between 1 and {}",
                        FieldType::ALL.len()
                    ))
                );
            }
        }
    }
}

fn read_optional(editor: &mut DefaultEditor, formatter: &Formatter) -> Result<bool> {
    loop {
        let answer = read_line(editor, "Is this field optional? (y/n): ")?;
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {
                eprintln!("{}", formatter.warning("Enter 'y' for yes or 'n' for no"));
            }
        }
    }
}

fn read_line(editor: &mut DefaultEditor, prompt: &str) -> Result<String> {
    match editor.readline(prompt) {
        Ok(line) => Ok(line),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Err(CliError::Cancelled),
        Err(e) => Err(CliError::Config(format!("Readline error: {}", e))),
    }
}
