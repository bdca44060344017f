// src/readers/textreader.rs

//! Implements a [`TextReader`], the bounded window of decoded lines a
//! [`GrammarEngine`] scans.
//!
//! The `TextReader` reads a file front to back in blocks of
//! [`TextReader::BLOCKSZ`] bytes, splits the bytes on newline bytes, and
//! decodes each line with a [`TextDecoder`]. At most
//! [`TextReader::LINE_WINDOW_COUNT`] lines are held at once.
//!
//! Every byte read from the file is eventually _consumed_ (part of a grammar
//! match), _skipped_ (part of a line that matched nothing), or _abandoned_
//! (still buffered when processing stopped early). The counts always add up to
//! the bytes read, see [`SummaryTextReader`].
//!
//! Line splitting is on byte `0x0A` so the file encoding must be a superset
//! of ASCII, e.g. UTF-8, Latin-1, Windows-1252, Shift_JIS.
//!
//! [`GrammarEngine`]: crate::readers::textparser::GrammarEngine
//! [`TextDecoder`]: crate::readers::decoder::TextDecoder

#![allow(non_snake_case)]

use crate::common::{Bytes, Count, FileObject, FileOffset, ResultS3, NLu8};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn, str_to_String_noraw};
use crate::readers::decoder::{DecodeWarnings, OffsetMap, TextDecoder};

use std::collections::VecDeque;
use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use ::memchr::memchr;
use ::more_asserts::debug_assert_le;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// One decoded line held in the window of a [`TextReader`].
#[derive(Clone, Debug)]
struct WindowLine {
    /// length of the decoded text in the window
    text_len: usize,
    /// absolute file offset of the first source byte
    fileoffset: FileOffset,
    /// count of source bytes
    source_len: usize,
    map: OffsetMap,
}

/// Byte accounting of a [`TextReader`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SummaryTextReader {
    /// bytes read from the file
    pub TextReader_bytes_read: Count,
    /// bytes part of a grammar match
    pub TextReader_bytes_consumed: Count,
    /// bytes of lines discarded because they matched nothing
    pub TextReader_bytes_skipped: Count,
    /// bytes read but never processed, because processing stopped early
    pub TextReader_bytes_abandoned: Count,
    /// lines read from the file
    pub TextReader_lines_read: Count,
    /// undecodable bytes substituted
    pub TextReader_decode_errors: Count,
}

impl SummaryTextReader {
    /// Is every byte read accounted for?
    pub const fn is_conserved(&self) -> bool {
        self.TextReader_bytes_consumed + self.TextReader_bytes_skipped + self.TextReader_bytes_abandoned
            == self.TextReader_bytes_read
    }
}

impl fmt::Display for SummaryTextReader {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(
            f,
            "bytes read {}, consumed {}, skipped {}, abandoned {}, lines read {}, decode errors {}",
            self.TextReader_bytes_read,
            self.TextReader_bytes_consumed,
            self.TextReader_bytes_skipped,
            self.TextReader_bytes_abandoned,
            self.TextReader_lines_read,
            self.TextReader_decode_errors,
        )
    }
}

/// A bounded window of decoded lines over a [`FileObject`].
pub struct TextReader<'f> {
    file: &'f mut dyn FileObject,
    decoder: TextDecoder,
    /// most recent block read from the file
    block: Bytes,
    /// index of the next unprocessed byte of `block`
    block_at: usize,
    /// no more bytes in the file
    eof: bool,
    /// absolute file offset of the next line to be read from `block`
    fileoffset_next: FileOffset,
    /// decoded text of `lines`, concatenated
    window: String,
    lines: VecDeque<WindowLine>,
    /// absolute file offset of the first byte of `window`
    window_fileoffset: FileOffset,
    /// lines fully removed from the window
    lines_done: Count,
    line_sz_max: usize,
    decode_warnings: DecodeWarnings,
    summary: SummaryTextReader,
}

impl fmt::Debug for TextReader<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("TextReader")
            .field("encoding", &self.decoder.name())
            .field("window_fileoffset", &self.window_fileoffset)
            .field("lines", &self.lines.len())
            .field("eof", &self.eof)
            .field("window", &str_to_String_noraw(&self.window))
            .finish()
    }
}

impl<'f> TextReader<'f> {
    /// Size of a block read from the file.
    pub const BLOCKSZ: usize = 0x4000;
    /// Maximum count of lines held in the window.
    pub const LINE_WINDOW_COUNT: usize = 16;
    /// A line longer than this is split into lines of this length.
    ///
    /// Each piece is then a line of its own: a text log line longer than
    /// this becomes two or more lines, each failing or matching on its own,
    /// and the line numbers of later warnings count the pieces. Pass
    /// `usize::MAX` to [`TextReader::with_line_sz_max`] to never split.
    pub const LINE_SZ_MAX: usize = 0x10_0000;

    /// Create a `TextReader` reading `file` from offset zero.
    pub fn new(
        file: &'f mut dyn FileObject,
        decoder: TextDecoder,
    ) -> std::io::Result<TextReader<'f>> {
        Self::with_line_sz_max(file, decoder, Self::LINE_SZ_MAX)
    }

    /// Create a `TextReader` reading `file` from offset zero, with a line
    /// length limit of `line_sz_max` bytes.
    pub fn with_line_sz_max(
        file: &'f mut dyn FileObject,
        decoder: TextDecoder,
        line_sz_max: usize,
    ) -> std::io::Result<TextReader<'f>> {
        defñ!("({}, {})", decoder.name(), line_sz_max);
        file.seek(SeekFrom::Start(0))?;

        Ok(TextReader {
            file,
            decoder,
            block: Bytes::with_capacity(Self::BLOCKSZ),
            block_at: 0,
            eof: false,
            fileoffset_next: 0,
            window: String::with_capacity(Self::BLOCKSZ),
            lines: VecDeque::with_capacity(Self::LINE_WINDOW_COUNT),
            window_fileoffset: 0,
            lines_done: 0,
            line_sz_max: line_sz_max.max(1),
            decode_warnings: DecodeWarnings::new(),
            summary: SummaryTextReader::default(),
        })
    }

    /// Read the next block of the file into `self.block`.
    /// Returns `false` at end of file.
    fn read_block(&mut self) -> std::io::Result<bool> {
        if self.eof {
            return Ok(false);
        }
        self.block.clear();
        self.block_at = 0;
        let mut reader = (&mut *self.file).take(Self::BLOCKSZ as u64);
        let read: usize = loop {
            match reader.read_to_end(&mut self.block) {
                Ok(val) => break val,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    de_err!("read_to_end failed at offset {}: {}", self.fileoffset_next, err);
                    return Err(err);
                }
            }
        };
        defo!("read {} bytes", read);
        if read == 0 {
            self.eof = true;
            return Ok(false);
        }
        self.summary.TextReader_bytes_read += read as Count;

        Ok(true)
    }

    /// Read the next line of raw bytes, including the newline.
    ///
    /// Returns the absolute file offset of the line and the bytes.
    pub fn read_line(&mut self) -> ResultS3<(FileOffset, Bytes), std::io::Error> {
        let fileoffset: FileOffset = self.fileoffset_next;
        let mut line: Bytes = Bytes::new();
        loop {
            if self.block_at >= self.block.len() {
                match self.read_block() {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(err) => return ResultS3::Err(err),
                }
            }
            let room: usize = self.line_sz_max - line.len();
            let end: usize = self.block.len().min(self.block_at.saturating_add(room));
            let avail: &[u8] = &self.block[self.block_at..end];
            match memchr(NLu8, avail) {
                Some(index) => {
                    line.extend_from_slice(&avail[..=index]);
                    self.block_at += index + 1;
                    break;
                }
                None => {
                    line.extend_from_slice(avail);
                    self.block_at = end;
                    if line.len() >= self.line_sz_max {
                        break;
                    }
                }
            }
        }
        if line.is_empty() {
            return ResultS3::Done;
        }
        self.fileoffset_next += line.len() as FileOffset;
        self.summary.TextReader_lines_read += 1;

        ResultS3::Found((fileoffset, line))
    }

    /// Fill the window up to [`TextReader::LINE_WINDOW_COUNT`] lines.
    pub fn read_lines(&mut self) -> std::io::Result<()> {
        while self.lines.len() < Self::LINE_WINDOW_COUNT {
            let (fileoffset, bytes) = match self.read_line() {
                ResultS3::Found(val) => val,
                ResultS3::Done => break,
                ResultS3::Err(err) => return Err(err),
            };
            let warnings_before: usize = self.decode_warnings.len();
            let decoded = self
                .decoder
                .decode(&bytes, fileoffset, &mut self.decode_warnings);
            self.summary.TextReader_decode_errors += (self.decode_warnings.len() - warnings_before) as Count;
            if self.lines.is_empty() {
                self.window_fileoffset = fileoffset;
            }
            self.window.push_str(&decoded.text);
            self.lines.push_back(WindowLine {
                text_len: decoded.text.len(),
                fileoffset,
                source_len: decoded.source_len,
                map: decoded.map,
            });
        }

        Ok(())
    }

    /// The decoded text of the window.
    pub fn window(&self) -> &str {
        &self.window
    }

    /// The window holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All bytes of the file were read.
    pub fn is_eof(&self) -> bool {
        self.eof && self.block_at >= self.block.len()
    }

    /// Absolute file offset of the start of the window.
    pub const fn window_fileoffset(&self) -> FileOffset {
        self.window_fileoffset
    }

    /// 1-based number of the first line in the window.
    pub const fn line_number(&self) -> Count {
        self.lines_done + 1
    }

    /// Decoded text of the first line in the window.
    pub fn first_line(&self) -> &str {
        match self.lines.front() {
            Some(line) => &self.window[..line.text_len],
            None => "",
        }
    }

    /// The encoding name of the decoder.
    pub fn encoding_name(&self) -> &'static str {
        self.decoder.name()
    }

    /// Absolute file offset of byte index `text_index` of the window.
    pub fn fileoffset_at(
        &self,
        text_index: usize,
    ) -> FileOffset {
        let mut text_begin: usize = 0;
        let mut fileoffset_end: FileOffset = self.window_fileoffset;
        for line in self.lines.iter() {
            if text_index < text_begin + line.text_len {
                return line.fileoffset + line.map.source_index(text_index - text_begin) as FileOffset;
            }
            text_begin += line.text_len;
            fileoffset_end = line.fileoffset + line.source_len as FileOffset;
        }

        fileoffset_end
    }

    /// Remove `text_len` bytes of text from the front of the window.
    /// Returns the count of file bytes removed.
    fn remove_front(
        &mut self,
        text_len: usize,
    ) -> Count {
        debug_assert_le!(text_len, self.window.len(), "remove beyond the window");
        let text_len: usize = text_len.min(self.window.len());
        let mut remaining: usize = text_len;
        let mut removed: Count = 0;
        while remaining > 0 {
            let line = match self.lines.front_mut() {
                Some(val) => val,
                None => break,
            };
            if remaining >= line.text_len {
                remaining -= line.text_len;
                removed += line.source_len as Count;
                self.lines.pop_front();
                self.lines_done += 1;
                continue;
            }
            let source: usize = line.map.source_index(remaining);
            line.map.split_off_front(remaining);
            line.text_len -= remaining;
            line.fileoffset += source as FileOffset;
            line.source_len -= source;
            removed += source as Count;
            remaining = 0;
        }
        self.window.drain(..text_len);
        self.window_fileoffset += removed;
        if let Some(line) = self.lines.front() {
            debug_assert_eq!(line.fileoffset, self.window_fileoffset, "window offset out of step");
        }

        removed
    }

    /// Consume `text_len` bytes of text, the extent of a grammar match.
    /// Returns the count of file bytes consumed.
    pub fn consume(
        &mut self,
        text_len: usize,
    ) -> Count {
        let removed: Count = self.remove_front(text_len);
        self.summary.TextReader_bytes_consumed += removed;

        removed
    }

    /// Discard the first line of the window.
    /// Returns the count of file bytes skipped.
    pub fn skip_first_line(&mut self) -> Count {
        let text_len: usize = match self.lines.front() {
            Some(line) => line.text_len,
            None => return 0,
        };
        let removed: Count = self.remove_front(text_len);
        self.summary.TextReader_bytes_skipped += removed;

        removed
    }

    /// Stop processing; every byte read but not yet processed is abandoned.
    /// Returns the count of file bytes abandoned.
    pub fn abandon(&mut self) -> Count {
        let in_window: Count = self
            .lines
            .iter()
            .map(|line| line.source_len as Count)
            .sum();
        let in_block: Count = self.block.len().saturating_sub(self.block_at) as Count;
        self.lines.clear();
        self.window.clear();
        self.block_at = self.block.len();
        let abandoned: Count = in_window + in_block;
        self.window_fileoffset += in_window;
        self.summary.TextReader_bytes_abandoned += abandoned;
        defñ!("abandoned {} bytes", abandoned);

        abandoned
    }

    /// Take the undecodable-byte warnings accumulated so far.
    pub fn drain_decode_warnings(&mut self) -> DecodeWarnings {
        std::mem::take(&mut self.decode_warnings)
    }

    pub const fn summary(&self) -> SummaryTextReader {
        self.summary
    }
}
