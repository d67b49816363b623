//! Table formatting: render detected table grids into deterministic text.
//!
//! The output shape matters more than its table semantics: every data row is
//! `| cell | cell | … |` followed by a `|---|---|…|` separator row, and each
//! table is prefixed with a 1-based `Table #N` label. Downstream the block is
//! spliced into the linearized text at a byte-exact trigger sentence, so this
//! renderer must produce the same bytes for the same input every time.

use crate::model::DocumentTable;

/// Render all tables, concatenated in document order.
///
/// Never fails: the grid starts out all-empty and provided cells overlay it,
/// so sparse or even out-of-range cell lists render cleanly.
pub fn format_tables(tables: &[DocumentTable]) -> String {
    let mut out = String::new();
    for (idx, table) in tables.iter().enumerate() {
        out.push_str(&format!("\nTable #{}\n", idx + 1));
        out.push_str(&format_grid(table));
    }
    out
}

fn format_grid(table: &DocumentTable) -> String {
    let mut grid = vec![vec![String::new(); table.column_count]; table.row_count];
    for cell in &table.cells {
        if cell.row_index < table.row_count && cell.column_index < table.column_count {
            grid[cell.row_index][cell.column_index] = cell.content.trim().to_string();
        }
    }

    let mut out = String::new();
    let separator = format!("{}|\n", "|---".repeat(table.column_count));
    for row in &grid {
        out.push_str("| ");
        out.push_str(&row.join(" | "));
        out.push_str(" |\n");
        out.push_str(&separator);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableCell;

    fn cell(row: usize, col: usize, content: &str) -> TableCell {
        TableCell {
            row_index: row,
            column_index: col,
            content: content.to_string(),
        }
    }

    fn table(rows: usize, cols: usize, cells: Vec<TableCell>) -> DocumentTable {
        DocumentTable {
            row_count: rows,
            column_count: cols,
            cells,
        }
    }

    #[test]
    fn grid_shape_rows_and_separators() {
        // R data rows, each followed by a separator row.
        let t = table(3, 2, vec![cell(0, 0, "Country"), cell(0, 1, "Increase")]);
        let text = format_tables(&[t]);
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        // "Table #1" + 3 data rows + 3 separators
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Table #1");
        for chunk in lines[1..].chunks(2) {
            assert!(chunk[0].starts_with("| "), "data row: {:?}", chunk[0]);
            assert_eq!(chunk[1], "|---|---|");
        }
    }

    #[test]
    fn data_rows_have_exactly_column_count_fields() {
        let t = table(2, 3, vec![cell(0, 1, "mid"), cell(1, 2, "end")]);
        let text = format_tables(&[t]);
        for line in text.lines().filter(|l| l.starts_with("| ")) {
            // "| a | b | c |" splits into 5 pieces: "", a, b, c, ""
            let fields = line.split('|').count() - 2;
            assert_eq!(fields, 3, "line: {line:?}");
        }
    }

    #[test]
    fn sparse_cells_render_empty() {
        let t = table(1, 2, vec![cell(0, 0, "only")]);
        let text = format_tables(&[t]);
        assert!(text.contains("| only |  |"), "got: {text}");
    }

    #[test]
    fn out_of_range_cells_are_ignored() {
        let t = table(1, 1, vec![cell(5, 5, "lost")]);
        let text = format_tables(&[t]);
        assert!(!text.contains("lost"));
        assert!(text.contains("|  |"));
    }

    #[test]
    fn cell_content_is_trimmed() {
        let t = table(1, 1, vec![cell(0, 0, "  USA \n")]);
        assert!(format_tables(&[t]).contains("| USA |"));
    }

    #[test]
    fn multiple_tables_get_ordinal_labels() {
        let a = table(1, 1, vec![cell(0, 0, "a")]);
        let b = table(1, 1, vec![cell(0, 0, "b")]);
        let text = format_tables(&[a, b]);
        let first = text.find("Table #1").unwrap();
        let second = text.find("Table #2").unwrap();
        assert!(first < second);
    }

    #[test]
    fn no_tables_renders_nothing() {
        assert_eq!(format_tables(&[]), "");
    }

    #[test]
    fn formatting_is_deterministic() {
        let t = || table(2, 2, vec![cell(1, 0, "x"), cell(0, 1, "y")]);
        assert_eq!(format_tables(&[t()]), format_tables(&[t()]));
    }
}
