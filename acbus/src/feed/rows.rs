//! Row decoding for URA response bodies.
//!
//! Each line of a body is one bracketed, comma-separated record such as
//! `[1,"Aachen Bushof","33","Vaals Grenze",1449240066000]`. String cells are
//! double-quoted and may contain commas.

/// Error decoding a single row. Rows that fail are dropped, not fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    /// Row is not wrapped in `[` ... `]`.
    #[error("row is not bracketed")]
    NotBracketed,

    /// Row is shorter than the field layout requires.
    #[error("row has {found} columns, expected {expected}")]
    TooShort { found: usize, expected: usize },

    /// A numeric column held something else.
    #[error("column {column} is not a number: {value:?}")]
    NotANumber { column: usize, value: String },

    /// The cells could not be split.
    #[error("undecodable row: {0}")]
    Undecodable(String),
}

/// Split a body into its non-blank lines, accepting `\n` and `\r\n`.
pub fn lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// A decoded row: unquoted cells addressed by column index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    /// Decode one line.
    pub fn decode(line: &str) -> Result<Self, RowError> {
        let inner = line
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or(RowError::NotBracketed)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(inner.as_bytes());

        let record = reader
            .records()
            .next()
            .transpose()
            .map_err(|e| RowError::Undecodable(e.to_string()))?
            .unwrap_or_default();

        Ok(Self {
            cells: record.iter().map(|cell| cell.trim().to_string()).collect(),
        })
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Fail unless the row has at least `width` cells.
    pub fn require_width(&self, width: usize) -> Result<(), RowError> {
        if self.cells.len() < width {
            return Err(RowError::TooShort {
                found: self.cells.len(),
                expected: width,
            });
        }
        Ok(())
    }

    /// Text of a cell, quotes already removed.
    pub fn text(&self, column: usize) -> Result<&str, RowError> {
        self.cells
            .get(column)
            .map(String::as_str)
            .ok_or(RowError::TooShort {
                found: self.cells.len(),
                expected: column + 1,
            })
    }

    pub fn float(&self, column: usize) -> Result<f64, RowError> {
        let value = self.text(column)?;
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| RowError::NotANumber {
                column,
                value: value.to_string(),
            })
    }

    pub fn integer(&self, column: usize) -> Result<i64, RowError> {
        let value = self.text(column)?;
        value.parse::<i64>().map_err(|_| RowError::NotANumber {
            column,
            value: value.to_string(),
        })
    }
}
