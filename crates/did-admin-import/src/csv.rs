//! Minimal RFC 4180-style CSV reading and writing.
//!
//! The delimiter is always a comma. Quoted cells may contain commas,
//! newlines and doubled quotes. Both `\n` and `\r\n` (and a lone `\r`)
//! end a row outside quotes.

/// Parse raw text into rows of cells.
///
/// Rows whose cells are all blank after trimming are dropped. Cells are
/// returned untrimmed.
///
/// # Examples
///
/// ```
/// use did_admin_import::csv::parse_rows;
///
/// let rows = parse_rows("a,\"b,c\",d\r\n\r\n\"He said \"\"hi\"\"\"\n");
/// assert_eq!(rows, vec![
///     vec!["a".to_string(), "b,c".to_string(), "d".to_string()],
///     vec!["He said \"hi\"".to_string()],
/// ]);
/// ```
#[must_use]
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => row.push(std::mem::take(&mut cell)),
            '\r' | '\n' if !in_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut cell));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            _ => cell.push(c),
        }
    }

    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        push_row(&mut rows, row);
    }

    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    if row.iter().any(|cell| !cell.trim().is_empty()) {
        rows.push(row);
    }
}

/// Quote a cell only if it needs it.
#[must_use]
pub fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        quote(cell)
    } else {
        cell.to_string()
    }
}

/// Always quote a cell, doubling embedded quotes.
#[must_use]
pub fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Join cells into one CSV line, quoting where needed.
#[must_use]
pub fn write_row<S: AsRef<str>>(cells: &[S]) -> String {
    cells
        .iter()
        .map(|c| escape(c.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Join cells into one CSV line with every cell quoted.
#[must_use]
pub fn write_quoted_row<S: AsRef<str>>(cells: &[S]) -> String {
    cells
        .iter()
        .map(|c| quote(c.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn embedded_commas_in_quotes() {
        assert_eq!(parse_rows("a,\"b,c\",d"), vec![row(&["a", "b,c", "d"])]);
    }

    #[test]
    fn escaped_quotes() {
        assert_eq!(
            parse_rows("\"He said \"\"hi\"\"\""),
            vec![row(&["He said \"hi\""])]
        );
    }

    #[test]
    fn embedded_newlines_in_quotes() {
        assert_eq!(
            parse_rows("\"line one\nline two\",x\ny,z"),
            vec![row(&["line one\nline two", "x"]), row(&["y", "z"])]
        );
    }

    #[test]
    fn crlf_and_lf_line_endings() {
        assert_eq!(
            parse_rows("a,b\r\nc,d\ne,f\r\n"),
            vec![row(&["a", "b"]), row(&["c", "d"]), row(&["e", "f"])]
        );
    }

    #[test]
    fn blank_rows_are_dropped() {
        assert_eq!(
            parse_rows("a,b\n\n , \n,,\nc,d"),
            vec![row(&["a", "b"]), row(&["c", "d"])]
        );
    }

    #[test]
    fn trailing_empty_cell_is_kept() {
        assert_eq!(parse_rows("a,b,\n"), vec![row(&["a", "b", ""])]);
    }

    #[test]
    fn empty_input() {
        assert!(parse_rows("").is_empty());
        assert!(parse_rows("\n\r\n").is_empty());
    }

    #[test]
    fn writing_quotes_only_when_needed() {
        assert_eq!(write_row(&["plain", "a,b", "say \"x\""]), "plain,\"a,b\",\"say \"\"x\"\"\"");
        assert_eq!(write_quoted_row(&["a", "b"]), "\"a\",\"b\"");
    }

    #[test]
    fn written_rows_parse_back() {
        let cells = row(&["Acme, Inc.", "line\nbreak", "\"quoted\"", "plain"]);
        assert_eq!(parse_rows(&write_row(&cells)), vec![cells]);
    }
}
