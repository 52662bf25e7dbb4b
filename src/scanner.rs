use crate::error::{ResidencyStatsError, Result};
use crate::grid::{cell_text, Grid};

/// Returns the index of the row following the first row that has a cell
/// containing `marker` (case-sensitive). Data starts there.
pub fn find_anchor_row(grid: &Grid, marker: &str) -> Result<usize> {
    grid.rows()
        .position(|row| {
            row.iter()
                .filter_map(cell_text)
                .any(|text| text.contains(marker))
        })
        .map(|idx| idx + 1)
        .ok_or_else(|| ResidencyStatsError::AnchorNotFound(marker.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn test_anchor_offset_is_row_after_marker() {
        let grid = Grid::from_rows(vec![
            vec![text("Cizinci podle státního občanství")],
            vec![],
            vec![Data::Empty, Data::Float(2021.0)],
            vec![Data::Empty, Data::Empty, text("STP_celkem")],
            vec![text("Polsko"), text("trvalý"), Data::Int(1)],
        ]);

        assert_eq!(find_anchor_row(&grid, "STP").unwrap(), 4);
    }

    #[test]
    fn test_first_marker_wins() {
        let grid = Grid::from_rows(vec![vec![text("STP")], vec![text("STP")]]);
        assert_eq!(find_anchor_row(&grid, "STP").unwrap(), 1);
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        let grid = Grid::from_rows(vec![vec![text("stp"), Data::Empty], vec![text("Stp")]]);
        assert!(matches!(
            find_anchor_row(&grid, "STP"),
            Err(ResidencyStatsError::AnchorNotFound(_))
        ));
    }

    #[test]
    fn test_empty_grid_has_no_anchor() {
        assert!(find_anchor_row(&Grid::default(), "STP").is_err());
    }
}
