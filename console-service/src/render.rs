//! HTML rendering of the status page.
//!
//! Every piece of data (table names, column names, cell values, cache keys
//! and values, error messages) is escaped before it is written.

use common::models::forms::TABLE_FIELD;
use common::models::{CacheEntry, CellValue, SourceStatus, StatusModel, TableSnapshot};

const STYLESHEET: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0-alpha1/dist/css/bootstrap.min.css";

/// Renders the whole status page.
pub fn render_status_page(model: &StatusModel) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Database Status</title>
  <link href="{STYLESHEET}" rel="stylesheet">
</head>
<body>
<div class="container my-4">
  <h1 class="text-center">Connection Status</h1>
"#
    ));

    html.push_str(&status_line("Database status", &model.database));
    if let Some(cache) = &model.cache {
        html.push_str(&status_line("Cache status", cache));
    }

    html.push_str("  <hr>\n  <h2 class=\"text-center\">Tables and data</h2>\n");
    for table in &model.tables {
        html.push_str(&render_table(table));
    }

    if let Some(SourceStatus::Ok) = &model.cache {
        html.push_str(&render_cache(&model.cache_entries));
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn status_line(label: &str, status: &SourceStatus) -> String {
    let class = if status.is_ok() { "text-success" } else { "text-danger" };
    format!(
        "  <p class=\"text-center {}\">{}: {}</p>\n",
        class,
        escape(label),
        escape(&status.to_string())
    )
}

fn render_table(table: &TableSnapshot) -> String {
    let name = escape(table.name.as_str());
    let mut html = format!("  <h3>{}</h3>\n", name);

    if let SourceStatus::Error(reason) = &table.status {
        html.push_str(&format!(
            "  <p class=\"text-danger\">Could not read {}: {}</p>\n",
            name,
            escape(reason)
        ));
        return html;
    }

    if table.is_empty() {
        html.push_str(&format!("  <p>No data available in {}.</p>\n", name));
        return html;
    }

    let columns = table.columns();

    html.push_str("  <table class=\"table table-striped table-bordered\">\n    <thead class=\"thead-dark\"><tr>");
    for column in &columns {
        html.push_str(&format!("<th>{}</th>", escape(column)));
    }
    html.push_str("<th>Actions</th></tr></thead>\n    <tbody>\n");

    for row in &table.rows {
        html.push_str("      <tr>");
        for value in row.values() {
            html.push_str(&format!("<td>{}</td>", render_cell(value)));
        }
        html.push_str("<td>");
        // A NULL id cannot be cast back into the key column.
        if let Some(id) = row.id().filter(|id| !id.is_null()) {
            html.push_str(&format!(
                "<form action=\"/delete\" method=\"POST\" style=\"display: inline;\">\
<input type=\"hidden\" name=\"id\" value=\"{}\">\
<input type=\"hidden\" name=\"{}\" value=\"{}\">\
<button type=\"submit\" class=\"btn btn-danger btn-sm\">Delete</button></form>",
                escape(&id.to_string()),
                TABLE_FIELD,
                name
            ));
        }
        html.push_str("</td></tr>\n");
    }
    html.push_str("    </tbody>\n  </table>\n");

    html.push_str(&format!(
        "  <h4>Add new row to {name}</h4>\n  <form action=\"/add\" method=\"POST\">\n    <input type=\"hidden\" name=\"{TABLE_FIELD}\" value=\"{name}\">\n"
    ));
    for column in &columns {
        let column = escape(column);
        html.push_str(&format!(
            "    <input type=\"text\" name=\"{column}\" placeholder=\"{column}\" required>\n"
        ));
    }
    html.push_str("    <button type=\"submit\" class=\"btn btn-primary\">Add</button>\n  </form>\n  <hr>\n");
    html
}

fn render_cell(value: &CellValue) -> String {
    match value {
        CellValue::Null => "<span class=\"text-muted\">null</span>".to_string(),
        other => escape(&other.to_string()),
    }
}

fn render_cache(entries: &[CacheEntry]) -> String {
    if entries.is_empty() {
        return "  <h2 class=\"text-center\">No keys in cache</h2>\n".to_string();
    }

    let mut html = String::from(
        "  <h2 class=\"text-center\">Cache data</h2>\n  <table class=\"table table-striped table-bordered\">\n    <thead class=\"thead-dark\"><tr><th>Key</th><th>Value</th></tr></thead>\n    <tbody>\n",
    );
    for entry in entries {
        html.push_str(&format!(
            "      <tr><td>{}</td><td>{}</td></tr>\n",
            escape(&entry.key),
            escape(&entry.value.to_string())
        ));
    }
    html.push_str("    </tbody>\n  </table>\n");
    html
}

/// Escapes text for use in element content and double-quoted attributes.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::{CacheValue, Row, TableName};

    fn model(tables: Vec<TableSnapshot>, cache: Option<SourceStatus>, entries: Vec<CacheEntry>) -> StatusModel {
        StatusModel {
            database: SourceStatus::Ok,
            cache,
            tables,
            cache_entries: entries,
        }
    }

    #[test]
    fn test_empty_table_renders_no_data() {
        let html = render_status_page(&model(
            vec![TableSnapshot::ok(TableName::new("users"), vec![])],
            None,
            vec![],
        ));
        assert!(html.contains("No data available in users."));
        assert!(!html.contains("Add new row to users"));
    }

    #[test]
    fn test_table_with_rows_renders_grid_and_forms() {
        let rows = vec![
            Row::new().with("id", 1_i64).with("item", "pen"),
            Row::new().with("id", 2_i64).with("item", "ink"),
        ];
        let html = render_status_page(&model(
            vec![TableSnapshot::ok(TableName::new("orders"), rows)],
            None,
            vec![],
        ));
        assert!(html.contains("<th>id</th><th>item</th><th>Actions</th>"));
        assert!(html.contains("<td>pen</td>"));
        assert_eq!(html.matches("action=\"/delete\"").count(), 2);
        assert!(html.contains("Add new row to orders"));
        assert!(html.contains("name=\"item\" placeholder=\"item\" required"));
    }

    #[test]
    fn test_rows_without_id_get_no_delete_button() {
        let rows = vec![Row::new().with("entry", "boot")];
        let html = render_status_page(&model(
            vec![TableSnapshot::ok(TableName::new("audit_log"), rows)],
            None,
            vec![],
        ));
        assert!(!html.contains("action=\"/delete\""));
    }

    #[test]
    fn test_null_id_gets_no_delete_button() {
        let rows = vec![
            Row::new().with("id", CellValue::Null).with("item", "draft"),
            Row::new().with("id", 4_i64).with("item", "pen"),
        ];
        let html = render_status_page(&model(
            vec![TableSnapshot::ok(TableName::new("orders"), rows)],
            None,
            vec![],
        ));
        assert_eq!(html.matches("action=\"/delete\"").count(), 1);
        assert!(!html.contains("name=\"id\" value=\"null\""));
    }

    #[test]
    fn test_cache_section_hidden_when_disabled() {
        let html = render_status_page(&model(vec![], None, vec![]));
        assert!(!html.contains("Cache status"));
        assert!(!html.contains("Cache data"));
        assert!(!html.contains("No keys in cache"));
    }

    #[test]
    fn test_cache_entries_and_errors() {
        let entries = vec![
            CacheEntry::new("a", CacheValue::Value("1".into())),
            CacheEntry::new("gone", CacheValue::Vanished),
        ];
        let html = render_status_page(&model(vec![], Some(SourceStatus::Ok), entries));
        assert!(html.contains("<tr><td>a</td><td>1</td></tr>"));
        assert!(html.contains("<td>(no value)</td>"));

        let html = render_status_page(&model(
            vec![],
            Some(SourceStatus::error("connection refused")),
            vec![],
        ));
        assert!(html.contains("Cache status: Error: connection refused"));
        assert!(!html.contains("No keys in cache"));
    }

    #[test]
    fn test_values_are_escaped() {
        let rows = vec![Row::new().with("id", 1_i64).with("note", "<script>alert('x')</script>")];
        let html = render_status_page(&model(
            vec![TableSnapshot::ok(TableName::new("notes"), rows)],
            None,
            vec![],
        ));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }
}
