//! Streaming driver over a MeSH descriptor file
//!
//! Pull-parses the document and builds one record per `<DescriptorRecord>`
//! as soon as its end tag is reached. Only the current record's subtree is
//! held in memory.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ParseError;
use crate::parser::{descriptor_from_attributes, new_reader, parse_descriptor, unexpected_eof};
use crate::record::DescriptorRecord;

const READ_BUFFER: usize = 64 * 1024;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Stream over a file opened by [`parse_mesh`].
pub type FileStream = DescriptorStream<Box<dyn BufRead>>;

/// Lazy, single-pass iterator of descriptor records.
///
/// Yields records in document order. After the first error the stream is
/// exhausted. Dropping it closes the underlying reader.
pub struct DescriptorStream<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// Names of open elements enclosing the current position
    open: Vec<Vec<u8>>,
    root_seen: bool,
    records_read: usize,
    finished: bool,
}

impl<R: BufRead> std::fmt::Debug for DescriptorStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorStream")
            .field("records_read", &self.records_read)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// Open a MeSH descriptor file and stream its records.
///
/// Gzip input is detected from the magic bytes and decompressed on the fly.
///
/// ```ignore
/// for rec in meshline_desc::parse_mesh("data/desc2025.xml")? {
///     let rec = rec?;
///     println!("{} {}", rec.ui, rec.name);
/// }
/// ```
pub fn parse_mesh<P: AsRef<Path>>(path: P) -> Result<FileStream, ParseError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut raw = BufReader::with_capacity(READ_BUFFER, file);

    let inner: Box<dyn BufRead> = if raw.fill_buf()?.starts_with(&GZIP_MAGIC) {
        log::debug!("{}: gzip input", path.display());
        Box::new(BufReader::with_capacity(
            READ_BUFFER,
            MultiGzDecoder::new(raw),
        ))
    } else {
        Box::new(raw)
    };

    log::debug!("Streaming descriptors from {}", path.display());
    Ok(DescriptorStream::from_reader(inner))
}

/// Parse every descriptor of an in-memory document.
pub fn parse_mesh_str(xml: &str) -> Result<Vec<DescriptorRecord>, ParseError> {
    DescriptorStream::from_reader(xml.as_bytes()).collect()
}

impl<R: BufRead> DescriptorStream<R> {
    pub fn from_reader(inner: R) -> Self {
        Self {
            reader: new_reader(inner),
            buf: Vec::new(),
            open: Vec::new(),
            root_seen: false,
            records_read: 0,
            finished: false,
        }
    }

    /// Advance to the next `<DescriptorRecord>` and build it.
    ///
    /// Returns `Ok(None)` once the root element has been closed. Input that
    /// ends inside an open element, or holds no element at all, is an error.
    pub fn next_record(&mut self) -> Result<Option<DescriptorRecord>, ParseError> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) if e.name().as_ref() == b"DescriptorRecord" => {
                    self.root_seen = true;
                    let rec = parse_descriptor(&mut self.reader, &e)?;
                    self.records_read += 1;
                    return Ok(Some(rec));
                }
                Event::Empty(e) if e.name().as_ref() == b"DescriptorRecord" => {
                    self.root_seen = true;
                    self.records_read += 1;
                    return Ok(Some(descriptor_from_attributes(&e)));
                }
                Event::Start(e) => {
                    self.root_seen = true;
                    self.open.push(e.name().as_ref().to_vec());
                }
                Event::Empty(_) => self.root_seen = true,
                Event::End(_) => {
                    self.open.pop();
                }
                Event::Eof => {
                    if let Some(element) = self.open.last() {
                        return Err(unexpected_eof(element));
                    }
                    if !self.root_seen {
                        return Err(ParseError::NoRootElement);
                    }
                    log::debug!("End of document after {} descriptors", self.records_read);
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    /// Number of records yielded so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Bytes consumed from the (decompressed) input.
    pub fn buffer_position(&self) -> u64 {
        self.reader.buffer_position()
    }
}

impl<R: BufRead> Iterator for DescriptorStream<R> {
    type Item = Result<DescriptorRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(rec)) => Some(Ok(rec)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                log::debug!(
                    "Stopped after {} descriptors at byte {}: {}",
                    self.records_read,
                    self.buffer_position(),
                    e
                );
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for DescriptorStream<R> {}
