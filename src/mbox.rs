//! Splitting an MBOX archive into individual messages
//!
//! A message starts at every line beginning with `From `. Lines in message
//! bodies that would look like a separator are expected to be escaped as
//! `>From ` by whoever wrote the archive.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

const SEPARATOR: &[u8] = b"From ";
const ESCAPED_SEPARATOR: &[u8] = b">From ";

#[derive(Debug, Error)]
pub enum MboxError {
    #[error("Failed to open archive '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read message {index} from archive: {source}")]
    Read {
        index: usize,
        #[source]
        source: io::Error,
    },
}

/// One message exactly as it appears in the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Zero-based position in the archive
    pub index: usize,
    /// Verbatim bytes, separator line and trailing blank line included
    pub bytes: Vec<u8>,
}

impl RawMessage {
    /// The `From ` separator line, without its line ending
    pub fn separator(&self) -> &[u8] {
        let line = match self.bytes.iter().position(|&b| b == b'\n') {
            Some(end) => &self.bytes[..end],
            None => &self.bytes[..],
        };
        line.strip_suffix(b"\r").unwrap_or(line)
    }

    /// The RFC 5322 message following the separator line
    pub fn content(&self) -> &[u8] {
        match self.bytes.iter().position(|&b| b == b'\n') {
            Some(end) => &self.bytes[end + 1..],
            None => &[],
        }
    }

    /// The content with one level of `>From ` quoting removed
    pub fn unescaped_content(&self) -> Cow<'_, [u8]> {
        let content = self.content();
        if !content
            .windows(ESCAPED_SEPARATOR.len())
            .any(|w| w == ESCAPED_SEPARATOR)
        {
            return Cow::Borrowed(content);
        }

        let mut out = Vec::with_capacity(content.len());
        for line in content.split_inclusive(|&b| b == b'\n') {
            let quoted = line.iter().take_while(|&&b| b == b'>').count();
            if quoted > 0 && line[quoted..].starts_with(SEPARATOR) {
                out.extend_from_slice(&line[1..]);
            } else {
                out.extend_from_slice(line);
            }
        }
        Cow::Owned(out)
    }

    /// The sender address recorded on the separator line
    pub fn envelope_sender(&self) -> String {
        let line = String::from_utf8_lossy(self.separator());
        line.split_whitespace().nth(1).unwrap_or_default().to_string()
    }
}

/// Iterator over the messages of an archive
pub struct MboxReader<R> {
    reader: R,
    /// Separator line already consumed while reading the previous message
    pending: Option<Vec<u8>>,
    next_index: usize,
    skipped_preamble: usize,
    done: bool,
}

/// Open an archive on disk
pub fn open(path: &Path) -> Result<MboxReader<BufReader<File>>, MboxError> {
    let file = File::open(path).map_err(|source| MboxError::Open {
        path: path.display().to_string(),
        source,
    })?;
    Ok(MboxReader::new(BufReader::new(file)))
}

impl<R: BufRead> MboxReader<R> {
    pub fn new(reader: R) -> Self {
        MboxReader {
            reader,
            pending: None,
            next_index: 0,
            skipped_preamble: 0,
            done: false,
        }
    }

    /// Number of bytes found before the first separator line
    pub fn skipped_preamble(&self) -> usize {
        self.skipped_preamble
    }

    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn read_message(&mut self) -> io::Result<Option<RawMessage>> {
        let mut bytes = match self.pending.take() {
            Some(separator) => separator,
            None => loop {
                let Some(line) = self.read_line()? else {
                    return Ok(None);
                };
                if line.starts_with(SEPARATOR) {
                    break line;
                }
                self.skipped_preamble += line.len();
            },
        };

        while let Some(line) = self.read_line()? {
            if line.starts_with(SEPARATOR) {
                self.pending = Some(line);
                break;
            }
            bytes.extend_from_slice(&line);
        }

        let index = self.next_index;
        self.next_index += 1;
        Ok(Some(RawMessage { index, bytes }))
    }
}

impl<R: BufRead> Iterator for MboxReader<R> {
    type Item = Result<RawMessage, MboxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_message() {
            Ok(Some(message)) => Some(Ok(message)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(source) => {
                self.done = true;
                Some(Err(MboxError::Read {
                    index: self.next_index,
                    source,
                }))
            }
        }
    }
}
