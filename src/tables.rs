use crate::client::CodaClient;
use crate::error::Result;
use serde_json::Value;
use std::io::Write;
use unicode_width::UnicodeWidthStr;

const COLUMN_GAP: &str = "  ";

/// Print up to `max_tables + 1` tables of a doc to `out`, returning how many were printed.
///
/// A table is skipped only once more than `max_tables` have been printed, so
/// the cap admits one extra table.
pub async fn print_tables<W: Write>(
    client: &CodaClient,
    doc_id: &str,
    max_tables: usize,
    out: &mut W,
) -> Result<usize> {
    let tables = client.list_tables(doc_id).await?;
    tracing::debug!(doc_id, tables = tables.len(), max_tables, "printing tables");

    let mut printed = 0;
    for table in &tables {
        if printed > max_tables {
            break;
        }

        let rows = client.list_rows(doc_id, &table.id).await?;
        let columns = client.list_columns(doc_id, &table.id).await?;
        writeln!(out, "{}", render_table(&table.name, &columns, &rows))?;
        printed += 1;
    }

    Ok(printed)
}

/// Render rows under named columns with a leading row index, dataframe style
pub fn render_table(name: &str, columns: &[String], rows: &[Vec<Value>]) -> String {
    let width = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(columns.len()))
        .max()
        .unwrap_or(0);

    let mut header: Vec<String> = columns.to_vec();
    header.resize(width, String::new());

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_text).collect();
            cells.resize(width, String::new());
            cells
        })
        .collect();

    let index_width = rows.len().saturating_sub(1).to_string().len();
    let widths: Vec<usize> = (0..width)
        .map(|i| {
            cells
                .iter()
                .map(|row| row[i].width())
                .chain(std::iter::once(header[i].width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = vec![format!("== {name} ==")];
    lines.push(render_line(&" ".repeat(index_width), &header, &widths));

    if cells.is_empty() {
        lines.push("(no rows)".to_string());
    }
    for (index, row) in cells.iter().enumerate() {
        let index = format!("{index:>index_width$}");
        lines.push(render_line(&index, row, &widths));
    }

    lines.join("\n")
}

fn render_line(index: &str, cells: &[String], widths: &[usize]) -> String {
    let mut line = index.to_string();
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str(COLUMN_GAP);
        line.push_str(cell);
        line.push_str(&" ".repeat(width - cell.width()));
    }
    line.trim_end().to_string()
}

fn cell_text(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace(['\n', '\r'], " ")
}
