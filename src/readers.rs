//! Line source: turns an input into numbered, trimmed lines

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::decompression::{maybe_decompress, Compression};
use crate::error::{PipelineError, Result};

/// Path that selects standard input instead of a file.
pub const STDIN_PATH: &str = "-";

/// One input line and its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// 0-based, assigned in reading order with no gaps.
    pub seq: u64,
    pub text: String,
}

impl LineRecord {
    pub fn new(seq: u64, text: impl Into<String>) -> Self {
        Self {
            seq,
            text: text.into(),
        }
    }
}

/// Lazy sequence of `LineRecord`s in strictly increasing `seq` order.
///
/// Surrounding whitespace is trimmed from every line, but blank lines are
/// still yielded: dropping lines is the predicate's job. The first read
/// error is yielded once and then the source is exhausted.
pub struct LineSource {
    reader: Box<dyn BufRead + Send>,
    next_seq: u64,
    buffer: String,
    finished: bool,
}

impl LineSource {
    /// Open `path` (or stdin for `-`), decompressing gzip/zstd transparently.
    ///
    /// Fails before any line is read if the input cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.as_os_str() == STDIN_PATH {
            let (reader, compression) = maybe_decompress(io::stdin()).map_err(|source| {
                PipelineError::Open {
                    path: PathBuf::from(STDIN_PATH),
                    source,
                }
            })?;
            tracing::debug!(?compression, "reading from stdin");
            return Ok(Self::from_reader(BufReader::new(reader)));
        }

        if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
        {
            return Err(PipelineError::Open {
                path: path.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::Unsupported,
                    "ZIP archives are not supported, only gzip and zstd; extract the file first",
                ),
            });
        }

        let open_err = |source| PipelineError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        let (reader, compression) = maybe_decompress(file).map_err(open_err)?;
        if compression != Compression::None {
            tracing::debug!(path = %path.display(), ?compression, "decompressing input");
        }

        Ok(Self::from_reader(BufReader::new(reader)))
    }

    /// Wrap an already-open reader. No decompression is applied.
    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self {
            reader: Box::new(reader),
            next_seq: 0,
            buffer: String::new(),
            finished: false,
        }
    }
}

impl Iterator for LineSource {
    type Item = Result<LineRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        self.buffer.clear();
        match self.reader.read_line(&mut self.buffer) {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(_) => {
                let record = LineRecord::new(self.next_seq, self.buffer.trim());
                self.next_seq += 1;
                Some(Ok(record))
            }
            Err(source) => {
                self.finished = true;
                Some(Err(PipelineError::Read {
                    line: self.next_seq + 1,
                    source,
                }))
            }
        }
    }
}

impl std::fmt::Debug for LineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSource")
            .field("next_seq", &self.next_seq)
            .field("finished", &self.finished)
            .finish()
    }
}
