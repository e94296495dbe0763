//! Tabular export — one line per generation, one column per cell.
//!
//! Format:
//!   Cell 0,Cell 1,...,Cell W-1
//!   0,0,2,...
//!
//! Values are literal state integers. Reading validates the header,
//! the column count of every line and every value, so an export read
//! back reproduces the history exactly.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use mobility_kernel::{KernelError, Row, State};

use crate::error::{Result, RuntimeError};

/// Write `history` to `writer`. Every row must have the first row's width.
pub fn write_history<W: Write>(history: &[Row], mut writer: W) -> Result<()> {
    let width = match history.first() {
        Some(row) if !row.is_empty() => row.len(),
        _ => {
            return Err(KernelError::InvalidInput("cannot export an empty history".into()).into())
        }
    };

    let header: Vec<String> = (0..width).map(|i| format!("Cell {}", i)).collect();
    writeln!(writer, "{}", header.join(","))?;

    for (generation, row) in history.iter().enumerate() {
        if row.len() != width {
            return Err(KernelError::InvalidInput(format!(
                "generation {} has {} cells, expected {}",
                generation,
                row.len(),
                width
            ))
            .into());
        }
        let line: Vec<String> = row.iter().map(|s| s.to_string()).collect();
        writeln!(writer, "{}", line.join(","))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a history written by [`write_history`].
pub fn read_history<R: BufRead>(reader: R) -> Result<Vec<Row>> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(format_error(1, "missing header")),
    };
    let width = parse_header(header.trim_end_matches('\r'))?;

    let mut history = Vec::new();
    for (offset, line) in lines.enumerate() {
        let line_no = offset + 2;
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let row = line
            .split(',')
            .map(|field| parse_state(field, line_no))
            .collect::<Result<Row>>()?;
        if row.len() != width {
            return Err(format_error(
                line_no,
                format!("{} columns, header declares {}", row.len(), width),
            ));
        }
        history.push(row);
    }
    if history.is_empty() {
        return Err(format_error(2, "no generations"));
    }
    Ok(history)
}

/// Export to a file, creating parent directories if needed.
pub fn export_to_file(history: &[Row], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_history(history, BufWriter::new(&file))?;
    file.sync_all()?;
    debug!(path = %path.display(), rows = history.len(), "history exported");
    Ok(())
}

pub fn import_from_file(path: &Path) -> Result<Vec<Row>> {
    let file = File::open(path)?;
    read_history(BufReader::new(file))
}

fn parse_header(header: &str) -> Result<usize> {
    let mut width = 0;
    for (i, column) in header.split(',').enumerate() {
        let expected = format!("Cell {}", i);
        if column.trim() != expected {
            return Err(format_error(
                1,
                format!("column {} is {:?}, expected {:?}", i, column, expected),
            ));
        }
        width += 1;
    }
    Ok(width)
}

/// Exactly one of the digits `0`, `1`, `2`; no sign, no padding.
fn parse_state(field: &str, line_no: usize) -> Result<State> {
    match field {
        "0" => Ok(State::Struggling),
        "1" => Ok(State::Stable),
        "2" => Ok(State::Thriving),
        _ => Err(format_error(
            line_no,
            format!("{:?} is not a state value", field),
        )),
    }
}

fn format_error(line: usize, message: impl Into<String>) -> RuntimeError {
    RuntimeError::Format {
        line,
        message: message.into(),
    }
}
