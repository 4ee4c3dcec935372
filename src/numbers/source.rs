//! Lazy number source over a line-oriented reader

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A normalized number submitted for lookup
pub type NumberQuery = String;

/// Errors raised while reading the number list
///
/// These are fatal to a run, unlike per-number lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The input file does not exist
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The input file exists but could not be opened
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Reading failed part way through the input
    #[error("Failed to read number list: {0}")]
    Read(#[source] io::Error),
}

/// Strip space and hyphen separators from a raw input line
///
/// Every other character is kept in its original order, so blank lines
/// normalize to an empty string.
pub fn normalize(line: &str) -> NumberQuery {
    line.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

/// Yields one [`NumberQuery`] per input line
///
/// Blank lines are not skipped. A read error is yielded once as
/// [`InputError::Read`], after which the source is exhausted.
#[derive(Debug)]
pub struct NumberSource<R> {
    reader: R,
    buf: String,
    done: bool,
}

impl NumberSource<BufReader<File>> {
    /// Open a number list file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                InputError::NotFound(path.to_path_buf())
            } else {
                InputError::Open {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> NumberSource<R> {
    /// Wrap an already opened reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for NumberSource<R> {
    type Item = Result<NumberQuery, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buf.clear();
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                let line = self.buf.strip_suffix('\n').unwrap_or(&self.buf);
                let line = line.strip_suffix('\r').unwrap_or(line);
                Some(Ok(normalize(line)))
            }
            Err(e) => {
                self.done = true;
                Some(Err(InputError::Read(e)))
            }
        }
    }
}
