use calamine::{Data, Range};

/// An untyped sheet with absolute coordinates: row 0 / column 0 is cell A1,
/// and every row has the same width (short rows are padded with `Data::Empty`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Data>>,
    width: usize,
}

impl Grid {
    pub fn from_rows(rows: Vec<Vec<Data>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Data::Empty);
                row
            })
            .collect();

        Self { rows, width }
    }

    /// calamine trims leading empty rows and columns from a range; put them back
    /// so column positions match the sheet.
    pub fn from_range(range: &Range<Data>) -> Self {
        let Some((first_row, first_col)) = range.start() else {
            return Self::default();
        };

        let mut rows: Vec<Vec<Data>> = vec![Vec::new(); first_row as usize];
        for row in range.rows() {
            let mut cells = vec![Data::Empty; first_col as usize];
            cells.extend(row.iter().cloned());
            rows.push(cells);
        }

        Self::from_rows(rows)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Data]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row(&self, index: usize) -> Option<&[Data]> {
        self.rows.get(index).map(Vec::as_slice)
    }
}

/// String form of a cell, or `None` for an absent value.
///
/// Blank strings count as absent, matching how spreadsheet readers
/// usually surface cleared cells.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        other => Some(other.to_string()),
    }
}
