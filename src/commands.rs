use std::io::Write;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::{Database, Row, Schema, Store, StoreError};

/// Separator between values in `insert`/`update` input and in printed rows.
pub const VALUE_SEPARATOR: char = '|';

pub fn execute_command<W: Write>(store: &Store, database: &str, command: &str, out: &mut W) -> Result<()> {
    let command = command.trim();
    let (keyword, rest) = next_word(command);
    debug!(database, keyword, "executing command");

    match keyword.to_lowercase().as_str() {
        ".databases" => handle_databases(store, out),
        ".tables" => handle_tables(&store.open_or_create(database)?, out),
        ".schema" => handle_schema(&store.open_or_create(database)?, out),
        "select" => handle_select(&store.open_or_create(database)?, rest, out),
        "diff" => handle_diff(&store.open_or_create(database)?, rest, out),
        "create" | "drop" | "insert" | "update" | "delete" => {
            let mut db = store.open_or_create(database)?;
            handle_mutation(&mut db, keyword, rest, out)?;
            store.save(&db)?;
            Ok(())
        }
        "" => bail!("Missing <command>"),
        _ => bail!("Unsupported command: {}", command),
    }
}

fn handle_databases<W: Write>(store: &Store, out: &mut W) -> Result<()> {
    for name in store.list()? {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

fn handle_tables<W: Write>(db: &Database, out: &mut W) -> Result<()> {
    for name in db.table_names() {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

fn handle_schema<W: Write>(db: &Database, out: &mut W) -> Result<()> {
    for table in db.tables() {
        writeln!(out, "{}: {} ({} rows)", table.name(), table.schema(), table.len())?;
    }
    Ok(())
}

fn handle_select<W: Write>(db: &Database, rest: &str, out: &mut W) -> Result<()> {
    let (table_name, _) = next_word(rest);
    if table_name.is_empty() {
        bail!("Missing table name in select");
    }

    let table = db.table(table_name)?;
    display_rows(table.schema(), table.view_rows(), out)
}

fn handle_diff<W: Write>(db: &Database, rest: &str, out: &mut W) -> Result<()> {
    let (left, rest) = next_word(rest);
    let (right, _) = next_word(rest);
    if left.is_empty() || right.is_empty() {
        bail!("Both table names must be provided: diff <left> <right>");
    }

    let rows = db.difference(left, right)?;
    display_rows(db.table(left)?.schema(), &rows, out)
}

fn handle_mutation<W: Write>(db: &mut Database, keyword: &str, rest: &str, out: &mut W) -> Result<()> {
    let (table_name, rest) = next_word(rest);
    if table_name.is_empty() {
        bail!("Missing table name in {}", keyword);
    }

    match keyword.to_lowercase().as_str() {
        "create" => {
            let schema = Schema::parse(rest)?;
            db.create_table(table_name, schema)?;
            writeln!(out, "Table '{}' created", table_name)?;
        }
        "drop" => {
            db.drop_table(table_name)?;
            writeln!(out, "Table '{}' dropped", table_name)?;
        }
        "insert" => {
            let table = db.table_mut(table_name)?;
            let row = parse_row(table.schema(), rest)?;
            table.add_row(row)?;
            writeln!(out, "Row {} added", table.len() - 1)?;
        }
        "update" => {
            let (index, values) = next_word(rest);
            let index = parse_index(index)?;
            let table = db.table_mut(table_name)?;
            let row = parse_row(table.schema(), values)?;
            let previous = table.edit_row(index, row)?;
            writeln!(out, "Row {} edited, previous: {}", index, format_row(&previous))?;
        }
        "delete" => {
            let (index, _) = next_word(rest);
            let index = parse_index(index)?;
            db.table_mut(table_name)?.delete_row(index)?;
            writeln!(out, "Row {} deleted", index)?;
        }
        other => bail!("Unsupported command: {}", other),
    }

    Ok(())
}

/// Converts `v1 | v2 | ...` into a row using the schema's field types.
///
/// Whitespace around each value is dropped. Wrap a value in double quotes
/// to keep it verbatim, e.g. `" "` for a single-space char.
pub fn parse_row(schema: &Schema, input: &str) -> crate::Result<Row> {
    let input = input.trim();
    let parts: Vec<&str> = if input.is_empty() {
        Vec::new()
    } else {
        input.split(VALUE_SEPARATOR).map(unquote).collect()
    };

    if parts.len() != schema.len() {
        return Err(StoreError::RowShapeMismatch {
            expected: schema.len(),
            actual: parts.len(),
        });
    }

    schema
        .fields()
        .iter()
        .zip(parts)
        .map(|(field, part)| field.field_type.parse_value(part))
        .collect()
}

fn unquote(part: &str) -> &str {
    let trimmed = part.trim();
    match trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner,
        None => trimmed,
    }
}

fn parse_index(word: &str) -> Result<usize> {
    word.parse()
        .with_context(|| format!("Invalid row index: {:?}", word))
}

fn format_row(row: &Row) -> String {
    row.iter()
        .map(|val| val.to_display_string())
        .collect::<Vec<_>>()
        .join("|")
}

/// Display rows under a header line
fn display_rows<W: Write>(schema: &Schema, rows: &[Row], out: &mut W) -> Result<()> {
    let headers = schema.field_names();
    writeln!(out, "{}", headers.join("|"))?;

    let separator = headers
        .iter()
        .map(|h| "-".repeat(h.len().max(10)))
        .collect::<Vec<_>>()
        .join("|");
    writeln!(out, "{}", separator)?;

    for row in rows {
        writeln!(out, "{}", format_row(row))?;
    }
    Ok(())
}

/// Splits off the first whitespace-delimited word.
fn next_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(pos) => (&s[..pos], s[pos..].trim_start()),
        None => (s, ""),
    }
}
