// src/common.rs

//! Common type aliases, result enums, and constants shared by the `readers`
//! and `data` modules.

pub use std::fs::File;
use std::io::{Read, Seek};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file-handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `F`ile `Path` as passed by the user, e.g. `"/var/log/syslog"`
pub type FPath = String;

/// General purpose counting type.
pub type Count = u64;

/// Offset into a file in bytes
pub type FileOffset = u64;

/// Size of a file in bytes
pub type FileSz = u64;

/// Sequence of Bytes
pub type Bytes = Vec<u8>;

/// A seekable, readable byte stream. Every file handed to a parser is one of
/// these.
///
/// Blanket-implemented for anything `Read + Seek`, e.g. [`File`] or
/// [`std::io::Cursor`].
pub trait FileObject: Read + Seek {}

impl<T: Read + Seek> FileObject for T {}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// results
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of reading the next line: a line, the end of the file, or an
/// I/O error.
#[derive(Debug, PartialEq)]
pub enum ResultS3<T, E> {
    /// Contains the success data
    Found(T),
    /// File is empty, or other condition that means "Done", nothing to
    /// return, but no bad errors happened
    Done,
    /// Contains the error value, something bad happened
    Err(E),
}

impl<T, E> ResultS3<T, E> {
    /// Returns `true` if the result is [`Done`].
    ///
    /// [`Done`]: ResultS3::Done
    #[inline(always)]
    pub const fn is_done(&self) -> bool {
        matches!(*self, ResultS3::Done)
    }
}

/// Outcome of processing one file, passed from a file processing thread to
/// the main thread.
///
/// Only `FileErrNoParser` and `FileErrIo` are "could not process" outcomes;
/// everything that goes wrong below the file boundary became an extraction
/// warning.
#[derive(Debug)]
pub enum FileProcessingResult<E> {
    /// A parser was found and ran to completion (perhaps with warnings).
    FileOk,
    /// No candidate parser recognized the file.
    FileErrNoParser,
    /// The file processing was stopped by the abort flag.
    FileErrAborted,
    /// An I/O error occurred.
    FileErrIo(E),
}

impl<E> FileProcessingResult<E> {
    /// Is this a "could not process" outcome?
    pub const fn is_err(&self) -> bool {
        matches!(
            *self,
            FileProcessingResult::FileErrNoParser | FileProcessingResult::FileErrIo(_)
        )
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Lines
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Single-byte newLine char as u8
#[allow(non_upper_case_globals)]
pub const NLu8: u8 = 10;

/// Path separator used to display a parser chain, e.g. `"text/syslog"`.
pub const CHAIN_SEP: char = '/';
