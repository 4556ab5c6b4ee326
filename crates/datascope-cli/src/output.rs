use anyhow::Result;
use datascope_types::QueryPage;
use owo_colors::OwoColorize;
use std::io::Write;

/// Render a JSON value as a single table cell. Strings drop their
/// quotes; everything else keeps its JSON form.
pub fn value_to_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Column names for a page: the declared fields when the backend sent
/// them, otherwise the keys of the first row.
pub fn page_columns(page: &QueryPage) -> Vec<String> {
    if !page.fields.is_empty() {
        return page.fields.iter().map(|f| f.name.clone()).collect();
    }
    page.rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

/// Print an aligned plain-text table of the page's rows.
pub fn print_rows_plain(page: &QueryPage) {
    let columns = page_columns(page);
    if columns.is_empty() {
        println!("(no rows)");
        return;
    }

    let cells: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| value_to_cell(row.get(c).unwrap_or(&serde_json::Value::Null)))
                .collect()
        })
        .collect();

    let widths = column_widths(&columns, &cells);

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("{:<width$}", name, width = *w))
        .collect();
    println!("{}", header.join("  ").bold());

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect();
        println!("{}", line.join("  "));
    }
}

pub fn print_page_footer(page: &QueryPage, page_number: usize) {
    let total = match page.total_count {
        Some(total) => format!("{} total", total),
        None => "total unknown".to_string(),
    };
    println!(
        "{}",
        format!(
            "page {} · {} rows · {} · {} ms",
            page_number, page.returned_count, total, page.execution_ms
        )
        .dimmed()
    );
}

/// Write the page's rows as CSV.
pub fn write_rows_csv<W: Write>(page: &QueryPage, out: W) -> Result<()> {
    let columns = page_columns(page);
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&columns)?;
    for row in &page.rows {
        let record: Vec<String> = columns
            .iter()
            .map(|c| value_to_cell(row.get(c).unwrap_or(&serde_json::Value::Null)))
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn column_widths(columns: &[String], cells: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;
    use datascope_types::{FieldDef, FieldType};

    fn page() -> QueryPage {
        let row1: serde_json::Map<String, serde_json::Value> = [
            ("id".to_string(), serde_json::json!(1)),
            ("name".to_string(), serde_json::json!("ada")),
        ]
        .into_iter()
        .collect();
        let row2: serde_json::Map<String, serde_json::Value> = [
            ("id".to_string(), serde_json::json!(2)),
            ("name".to_string(), serde_json::json!("grace,hopper")),
        ]
        .into_iter()
        .collect();

        QueryPage {
            fields: vec![
                FieldDef {
                    name: "id".to_string(),
                    field_type: FieldType::Int64,
                    nullable: false,
                },
                FieldDef {
                    name: "name".to_string(),
                    field_type: FieldType::String,
                    nullable: true,
                },
            ],
            rows: vec![row1, row2],
            total_count: Some(2),
            returned_count: 2,
            execution_ms: 3,
        }
    }

    #[test]
    fn test_value_to_cell_strips_string_quotes() {
        assert_eq!(value_to_cell(&serde_json::json!("ada")), "ada");
        assert_eq!(value_to_cell(&serde_json::json!(42)), "42");
        assert_eq!(value_to_cell(&serde_json::Value::Null), "");
        assert_eq!(value_to_cell(&serde_json::json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_page_columns_prefer_declared_fields() {
        assert_eq!(page_columns(&page()), vec!["id", "name"]);

        let mut no_fields = page();
        no_fields.fields.clear();
        assert_eq!(page_columns(&no_fields), vec!["id", "name"]);
    }

    #[test]
    fn test_csv_output_quotes_embedded_commas() {
        let mut buffer = Vec::new();
        write_rows_csv(&page(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "id,name\n1,ada\n2,\"grace,hopper\"\n");
    }
}
