//! Text formatting shared by the views

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

/// `$150.25`
pub fn money(value: f64) -> String {
    format!("${value:.2}")
}

/// `+10.00%`, or `n/a` when there is no change to show
pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+.2}%"),
        None => "n/a".to_string(),
    }
}

/// Table with the dashboard's preset and the given header row
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h)));
    table
}

/// Right-aligned cell for numbers
pub fn numeric(text: impl ToString) -> Cell {
    Cell::new(text.to_string()).set_alignment(CellAlignment::Right)
}

/// Page heading with an underline
pub fn heading(title: &str) -> String {
    format!("{title}\n{}", "=".repeat(title.chars().count()))
}

pub fn format_error(error: &str) -> String {
    format!("Error: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_and_percent() {
        assert_eq!(money(150.25), "$150.25");
        assert_eq!(money(3.0), "$3.00");
        assert_eq!(percent(Some(10.0)), "+10.00%");
        assert_eq!(percent(Some(-2.5)), "-2.50%");
        assert_eq!(percent(None), "n/a");
    }

    #[test]
    fn test_table_contains_rows() {
        let mut table = table(&["Ticker", "Price"]);
        table.add_row(vec![Cell::new("AAPL"), numeric(money(210.12))]);
        let text = table.to_string();
        assert!(text.contains("Ticker"));
        assert!(text.contains("$210.12"));
    }

    #[test]
    fn test_heading_underline() {
        assert_eq!(heading("AAPL"), "AAPL\n====");
    }
}
