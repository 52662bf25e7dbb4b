use crate::error::{ResidencyStatsError, Result};
use crate::grid::Grid;
use calamine::{open_workbook_auto, Reader};
use std::fs;
use std::path::{Path, PathBuf};

const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext))
}

/// Spreadsheet files directly inside `dir`, sorted by file name.
pub fn list_spreadsheets(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_spreadsheet(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Loads the first worksheet as a grid. No header row is assumed.
pub fn read_first_sheet(path: &Path) -> Result<Grid> {
    let mut workbook = open_workbook_auto(path)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ResidencyStatsError::EmptyWorkbook(path.display().to_string()))??;

    Ok(Grid::from_range(&range))
}
