use clap::ValueEnum;
use comfy_table::{modifiers, presets, Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

#[derive(Debug, Clone, Copy)]
enum Status {
    Success,
    Info,
    Warning,
}

impl Status {
    fn kind(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Info => "info",
            Status::Warning => "warning",
        }
    }
}

/// User-facing output: colored lines for people, one JSON value per line for scripts
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.status(Status::Success, msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.status(Status::Info, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.status(Status::Warning, msg.as_ref());
    }

    pub fn json(&self, data: &Value) {
        if !self.quiet {
            println!("{}", render_json(self.format, data));
        }
    }

    pub fn table(&self, table: &Table) {
        if !self.quiet {
            println!("{}", table);
        }
    }

    fn status(&self, status: Status, msg: &str) {
        if self.quiet {
            return;
        }
        if !self.is_human() {
            println!("{}", render_json(self.format, &json!({ "type": status.kind(), "message": msg })));
            return;
        }
        match status {
            Status::Success => println!("{} {}", "✓".green(), msg),
            Status::Info => println!("{}", msg),
            Status::Warning => println!("{} {}", "⚠".yellow(), msg),
        }
    }
}

fn render_json(format: OutputFormat, data: &Value) -> String {
    match format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(data).unwrap_or_default(),
        OutputFormat::Json | OutputFormat::Human => data.to_string(),
    }
}

/// Rounded UTF-8 table with a bold header row
pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

/// Two-column key/value table
pub fn detail_table(title: &str, rows: &[(&str, String)]) -> Table {
    let mut table = new_table(&[title, ""]);
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_compact_and_pretty() {
        let data = json!({ "id": "42" });
        assert_eq!(render_json(OutputFormat::Json, &data), r#"{"id":"42"}"#);
        assert!(render_json(OutputFormat::JsonPretty, &data).contains('\n'));
    }

    #[test]
    fn test_detail_table_has_one_row_per_pair() {
        let table = detail_table("Dune", &[("Year", "2021".to_string()), ("Type", "Movie".to_string())]);
        assert_eq!(table.row_iter().count(), 2);
    }
}
