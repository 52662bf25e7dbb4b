use crate::error::Result;
use crate::schema::{ParsedDataset, ParserConfig};
use log::info;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Compact JSON formatter that writes every non-ASCII character as a `\uXXXX`
/// escape (surrogate pairs outside the BMP).
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiEscapedFormatter;

impl Formatter for AsciiEscapedFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub formatted: PathBuf,
    pub raw: PathBuf,
}

fn write_with<W: Write, F: Formatter>(
    writer: W,
    formatter: F,
    dataset: &ParsedDataset,
) -> Result<()> {
    let mut serializer = Serializer::with_formatter(writer, formatter);
    dataset.serialize(&mut serializer)?;
    Ok(())
}

/// Indented with four spaces, non-ASCII text kept as-is.
pub fn write_formatted<W: Write>(writer: W, dataset: &ParsedDataset) -> Result<()> {
    write_with(writer, PrettyFormatter::with_indent(b"    "), dataset)
}

/// Single line, non-ASCII text escaped.
pub fn write_raw<W: Write>(writer: W, dataset: &ParsedDataset) -> Result<()> {
    write_with(writer, AsciiEscapedFormatter, dataset)
}

pub fn to_formatted_json(dataset: &ParsedDataset) -> Result<String> {
    let mut buf = Vec::new();
    write_formatted(&mut buf, dataset)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn to_raw_json(dataset: &ParsedDataset) -> Result<String> {
    let mut buf = Vec::new();
    write_raw(&mut buf, dataset)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_file(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> Result<()>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes both output variants into the configured output directory,
/// creating it if needed. Periods are already chronological per country
/// because the dataset keys them by [`crate::Period`].
pub fn write_outputs(dataset: &ParsedDataset, config: &ParserConfig) -> Result<OutputPaths> {
    fs::create_dir_all(&config.output_dir)?;

    let paths = OutputPaths {
        formatted: config.output_dir.join(&config.formatted_file_name),
        raw: config.output_dir.join(&config.raw_file_name),
    };

    write_file(&paths.formatted, |w| write_formatted(w, dataset))?;
    write_file(&paths.raw, |w| write_raw(w, dataset))?;

    info!(
        "Wrote {} and {}",
        paths.formatted.display(),
        paths.raw.display()
    );

    Ok(paths)
}
