// src/readers/decoder.rs

//! Implements [`TextDecoder`], byte to text decoding that never fails.
//!
//! An undecodable byte is replaced by the escaped text `\xNN`, a
//! [`DecodeWarning`] with the absolute file offset of the byte is recorded,
//! and decoding resumes at the next byte.
//!
//! The decoded text is accompanied by an [`OffsetMap`] so any index into the
//! text maps back to the exact byte offset in the file. This is what keeps the
//! byte offsets of parsed records exact even when decoding changes the
//! length of the text, e.g. a Latin-1 `é` (one byte) becomes two UTF-8 bytes
//! and an escaped bad byte (one byte) becomes four characters.

use crate::common::{Count, FileOffset};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};

use std::fmt;

use ::encoding_rs::{DecoderResult, Encoding, UTF_8};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// An undecodable byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecodeWarning {
    /// absolute offset of the byte in the file
    pub fileoffset: FileOffset,
    pub byte: u8,
    pub encoding: &'static str,
}

impl fmt::Display for DecodeWarning {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(
            f,
            "unable to decode byte 0x{:02x} at offset {} with encoding {}",
            self.byte, self.fileoffset, self.encoding,
        )
    }
}

pub type DecodeWarnings = Vec<DecodeWarning>;

/// Maps byte indexes of decoded text to byte counts of the source bytes.
///
/// Stored as anchors `(text index, source index)`; between anchors the
/// text and source advance together one-to-one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OffsetMap {
    anchors: Vec<(usize, usize)>,
}

impl Default for OffsetMap {
    fn default() -> Self {
        OffsetMap {
            anchors: vec![(0, 0)],
        }
    }
}

impl OffsetMap {
    /// Record that text index `text_index` corresponds to source index
    /// `source_index`. Anchors that add nothing are not stored.
    fn anchor(
        &mut self,
        text_index: usize,
        source_index: usize,
    ) {
        if let Some((t, s)) = self.anchors.last() {
            if text_index - t == source_index - s {
                return;
            }
        }
        self.anchors
            .push((text_index, source_index));
    }

    /// Source byte count for text index `text_index`.
    ///
    /// An index inside a multi-byte substitution maps to the source index of
    /// the end of that substitution.
    pub fn source_index(
        &self,
        text_index: usize,
    ) -> usize {
        let at: usize = self
            .anchors
            .partition_point(|(t, _)| *t <= text_index);
        // `anchors[0]` is `(0, 0)` so `at >= 1`
        let (t, s) = self.anchors[at.saturating_sub(1)];
        let source: usize = s + (text_index - t);
        match self.anchors.get(at) {
            Some((_, s_next)) => source.min(*s_next),
            None => source,
        }
    }

    /// Drop the first `text_index` characters of text, which correspond to
    /// the first `self.source_index(text_index)` source bytes.
    pub fn split_off_front(
        &mut self,
        text_index: usize,
    ) {
        let source_at: usize = self.source_index(text_index);
        let mut anchors: Vec<(usize, usize)> = Vec::with_capacity(self.anchors.len());
        anchors.push((0, 0));
        for (t, s) in self.anchors.iter() {
            if *t > text_index {
                anchors.push((t - text_index, s - source_at));
            }
        }
        self.anchors = anchors;
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

/// Decoded text of a run of bytes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub map: OffsetMap,
    /// count of bytes decoded
    pub source_len: usize,
}

/// Decodes bytes of a single encoding, substituting undecodable bytes.
#[derive(Clone, Copy, Debug)]
pub struct TextDecoder {
    encoding: &'static Encoding,
}

impl Default for TextDecoder {
    fn default() -> Self {
        TextDecoder { encoding: UTF_8 }
    }
}

impl TextDecoder {
    pub fn new(encoding: &'static Encoding) -> TextDecoder {
        TextDecoder { encoding }
    }

    /// Decoder for an encoding label, e.g. `"utf-8"`, `"latin1"`,
    /// `"windows-1252"`. `None` for an unknown label.
    pub fn for_label(label: &str) -> Option<TextDecoder> {
        Encoding::for_label(label.trim().as_bytes()).map(TextDecoder::new)
    }

    /// Name of the encoding, e.g. `"UTF-8"`.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode `bytes` that are at absolute `fileoffset` of a file.
    /// Each undecodable byte is pushed onto `warnings`.
    pub fn decode(
        &self,
        bytes: &[u8],
        fileoffset: FileOffset,
        warnings: &mut DecodeWarnings,
    ) -> DecodedText {
        let mut decoded = DecodedText {
            text: String::with_capacity(bytes.len()),
            map: OffsetMap::default(),
            source_len: bytes.len(),
        };
        if self.encoding == UTF_8 {
            self.decode_utf8(bytes, fileoffset, &mut decoded, warnings);
        } else {
            self.decode_bytewise(bytes, fileoffset, &mut decoded, warnings);
        }

        decoded
    }

    /// Append the escaped form of the bad byte at `index`.
    fn substitute(
        &self,
        bytes: &[u8],
        index: usize,
        fileoffset: FileOffset,
        decoded: &mut DecodedText,
        warnings: &mut DecodeWarnings,
    ) {
        let byte: u8 = bytes[index];
        defo!("bad byte 0x{:02x} at {}", byte, fileoffset + index as FileOffset);
        decoded.map.anchor(decoded.text.len(), index);
        decoded.text.push_str(&format!("\\x{:02x}", byte));
        decoded.map.anchor(decoded.text.len(), index + 1);
        warnings.push(DecodeWarning {
            fileoffset: fileoffset + index as FileOffset,
            byte,
            encoding: self.encoding.name(),
        });
    }

    /// UTF-8 maps text to bytes one-to-one except at substitutions.
    fn decode_utf8(
        &self,
        bytes: &[u8],
        fileoffset: FileOffset,
        decoded: &mut DecodedText,
        warnings: &mut DecodeWarnings,
    ) {
        let mut at: usize = 0;
        while at < bytes.len() {
            match std::str::from_utf8(&bytes[at..]) {
                Ok(s) => {
                    decoded.map.anchor(decoded.text.len(), at);
                    decoded.text.push_str(s);
                    at = bytes.len();
                }
                Err(err) => {
                    let good: usize = err.valid_up_to();
                    decoded.map.anchor(decoded.text.len(), at);
                    // the prefix is valid so this borrows, never replaces
                    decoded
                        .text
                        .push_str(&String::from_utf8_lossy(&bytes[at..at + good]));
                    self.substitute(bytes, at + good, fileoffset, decoded, warnings);
                    at += good + 1;
                }
            }
        }
    }

    /// Other encodings are fed one byte at a time so every character boundary
    /// is known.
    fn decode_bytewise(
        &self,
        bytes: &[u8],
        fileoffset: FileOffset,
        decoded: &mut DecodedText,
        warnings: &mut DecodeWarnings,
    ) {
        let mut decoder = self.encoding.new_decoder_without_bom_handling();
        let mut at: usize = 0;
        // first byte of the character being decoded
        let mut char_start: usize = 0;
        while at < bytes.len() {
            let last: bool = at + 1 == bytes.len();
            let reserve: usize = decoder
                .max_utf8_buffer_length_without_replacement(1)
                .unwrap_or(16);
            decoded.text.reserve(reserve);
            let text_before: usize = decoded.text.len();
            let (result, read) =
                decoder.decode_to_string_without_replacement(&bytes[at..at + 1], &mut decoded.text, last);
            match result {
                DecoderResult::InputEmpty => {
                    at += read;
                    if decoded.text.len() > text_before {
                        decoded.map.anchor(text_before, char_start);
                        decoded.map.anchor(decoded.text.len(), at);
                        char_start = at;
                    }
                }
                DecoderResult::Malformed(malformed_len, after_len) => {
                    // the malformed sequence may have started in prior bytes
                    let consumed: usize = at + read;
                    let bad_start: usize = consumed
                        .saturating_sub(after_len as usize)
                        .saturating_sub(malformed_len as usize)
                        .max(char_start);
                    self.substitute(bytes, bad_start, fileoffset, decoded, warnings);
                    // resume after the one bad byte with a fresh decoder
                    at = bad_start + 1;
                    char_start = at;
                    decoder = self.encoding.new_decoder_without_bom_handling();
                }
                DecoderResult::OutputFull => {
                    decoded.text.reserve(reserve * 2);
                }
            }
        }
        // a sequence left incomplete when the input ran out
        for index in char_start..bytes.len() {
            self.substitute(bytes, index, fileoffset, decoded, warnings);
        }
    }
}

/// Total count of bad bytes in `warnings`.
pub fn count_decode_warnings(warnings: &[DecodeWarning]) -> Count {
    warnings.len() as Count
}
