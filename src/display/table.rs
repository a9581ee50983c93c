use crate::api::models::Row;
use crate::core::entity::EntityType;
use crate::utils::text::{truncate_text_unicode, value_text};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use crossterm::terminal;

/// Widest a single cell may render before truncation.
const MAX_CELL_WIDTH: usize = 60;
const FIELD_LIST_COLUMNS: usize = 3;

/// Formatter for console tables
pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TableDisplay {
    /// Colors only when stdout is a terminal
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _rows)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn new_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        let width = self.max_width.unwrap_or(80);
        table.set_width(width.saturating_sub(6).max(40) as u16);
        table
    }

    fn header_cell(&self, text: &str) -> Cell {
        if self.use_colors {
            Cell::new(text).add_attribute(Attribute::Bold).fg(Color::Cyan)
        } else {
            Cell::new(text)
        }
    }

    /// Rows as a table; columns come from the first row.
    pub fn render_rows(&self, rows: &[Row]) -> String {
        let Some(first) = rows.first() else {
            return "No records found.".to_string();
        };

        let mut table = self.new_table();
        let columns: Vec<&String> = first.keys().collect();
        table.set_header(columns.iter().map(|c| self.header_cell(c)));

        for row in rows {
            table.add_row(columns.iter().map(|column| {
                let text = row.get(*column).map(value_text).unwrap_or_default();
                Cell::new(truncate_text_unicode(&text, MAX_CELL_WIDTH))
            }));
        }

        format!("{}\n{} record(s)", table, rows.len())
    }

    /// Default fields, wildcard options and the known field catalogue.
    pub fn render_field_list(&self, entity: EntityType) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Default fields for {}S: {}\n",
            entity.as_str().to_uppercase(),
            entity.default_fields().join("/")
        ));

        let mut wildcards = self.new_table();
        wildcards.set_header(vec![self.header_cell("--fields"), self.header_cell("Selects")]);
        wildcards.add_row(vec!["fld1/fld2/etc", "the named fields, in order"]);
        wildcards.add_row(vec!["*", "all fields"]);
        wildcards.add_row(vec!["nourls", "all fields except *url"]);
        wildcards.add_row(vec!["urls", "only *url fields"]);
        out.push_str(&wildcards.to_string());
        out.push('\n');

        let known = entity.known_fields();
        let per_column = known.len().div_ceil(FIELD_LIST_COLUMNS);
        let mut catalogue = self.new_table();
        catalogue.set_header(vec![self.header_cell("Available fields")]);
        for index in 0..per_column {
            let cells: Vec<&str> = (0..FIELD_LIST_COLUMNS)
                .map(|column| known.get(column * per_column + index).copied().unwrap_or(""))
                .collect();
            catalogue.add_row(cells);
        }
        out.push_str(&catalogue.to_string());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn display() -> TableDisplay {
        TableDisplay::new().with_max_width(120).with_colors(false)
    }

    #[test]
    fn test_render_rows() {
        let mut row = Row::new();
        row.insert("login".to_string(), json!("octocat"));
        row.insert("id".to_string(), json!(583231));
        row.insert("org".to_string(), Value::Null);

        let output = display().render_rows(&[row]);
        assert!(output.contains("login"));
        assert!(output.contains("octocat"));
        assert!(output.contains("583231"));
        assert!(output.ends_with("1 record(s)"));
    }

    #[test]
    fn test_render_rows_truncates_long_values() {
        let mut row = Row::new();
        row.insert("description".to_string(), json!("x".repeat(200)));

        let output = display().render_rows(&[row]);
        assert!(!output.contains(&"x".repeat(61)));
        assert!(output.contains("..."));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(display().render_rows(&[]), "No records found.");
    }

    #[test]
    fn test_render_field_list() {
        let output = display().render_field_list(EntityType::Team);
        assert!(output.starts_with("Default fields for TEAMS: name/id/privacy/permission"));
        assert!(output.contains("nourls"));
        assert!(output.contains("repositories_url"));
        assert!(output.contains("slug"));
    }
}
