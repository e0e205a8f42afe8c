//! Column-aligned listings. Headers never contain whitespace so the output can be
//! split with awk; cells may.

use std::fmt::{self, Write};

use unicode_width::UnicodeWidthStr;

pub(crate) struct Row {
    cells: Vec<String>,
}

impl Row {
    fn is_awk_safe(&self) -> bool {
        !self
            .cells
            .iter()
            .any(|cell| cell.contains(char::is_whitespace))
    }
}

impl From<Vec<String>> for Row {
    fn from(value: Vec<String>) -> Self {
        Row { cells: value }
    }
}

impl From<Vec<&str>> for Row {
    fn from(value: Vec<&str>) -> Self {
        Row {
            cells: value.into_iter().map(str::to_owned).collect(),
        }
    }
}

pub(crate) struct Table {
    body: Vec<Row>,
    header: Option<Row>,
    print_header: bool,
}

impl Table {
    pub(crate) fn new() -> Table {
        Table {
            body: Vec::new(),
            header: None,
            print_header: true,
        }
    }

    pub(crate) fn print_header(&mut self, print_header: bool) {
        self.print_header = print_header;
    }

    pub(crate) fn add_row<R: Into<Row>>(&mut self, row: R) {
        let row = row.into();

        debug_assert!(
            self.header
                .as_ref()
                .map_or(true, |h| h.cells.len() == row.cells.len()),
            "row width does not match the header"
        );

        self.body.push(row);
    }

    pub(crate) fn set_header<R: Into<Row>>(&mut self, header: R) {
        let header = header.into();

        debug_assert!(header.is_awk_safe(), "table header contains whitespace");

        self.header = Some(header);
    }

    fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        let header = self.header.iter().filter(|_| self.print_header);

        header.chain(self.body.iter())
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();

        for row in self.visible_rows() {
            for (i, cell) in row.cells.iter().enumerate() {
                let w = cell.width();

                match widths.get_mut(i) {
                    Some(max) => *max = (*max).max(w),
                    None => widths.push(w),
                }
            }
        }

        widths
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();

        for row in self.visible_rows() {
            let last = row.cells.len().saturating_sub(1);

            for (i, cell) in row.cells.iter().enumerate() {
                f.write_str(cell)?;

                if i != last {
                    let pad = widths[i].saturating_sub(cell.width()) + 2;

                    f.write_str(&" ".repeat(pad))?;
                }
            }

            f.write_char('\n')?;
        }

        Ok(())
    }
}

pub(crate) trait IntoTable: Into<Table> + Sized {
    fn into_table(self) -> Table {
        self.into()
    }
}

impl<T> IntoTable for T where T: Into<Table> + Sized {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        let mut tab = Table::new();

        tab.set_header(vec!["NAME", "LABEL"]);
        tab.add_row(vec!["red-flag", "Red Flag"]);
        tab.add_row(vec!["ex", "Ex"]);

        assert_eq!(
            tab.to_string(),
            "NAME      LABEL\nred-flag  Red Flag\nex        Ex\n"
        );
    }

    #[test]
    fn test_headerless() {
        let mut tab = Table::new();

        tab.set_header(vec!["LONG_HEADER", "X"]);
        tab.add_row(vec!["a", "b"]);
        tab.print_header(false);

        assert_eq!(tab.to_string(), "a  b\n");
    }
}
