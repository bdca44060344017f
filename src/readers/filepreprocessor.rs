// src/readers/filepreprocessor.rs

//! Functions to find the files to be processed.
//!
//! A path to a file is always a candidate; a path to a directory is walked
//! and every plain file within is a candidate. Which parser, if any, handles
//! a candidate is decided later by the [`Dispatcher`].
//!
//! [`Dispatcher`]: crate::readers::dispatcher::Dispatcher

use crate::common::{FPath, FileSz};
use crate::readers::helpers::{path_filesz, path_to_fpath};

use std::path::Path;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Initial path processing return type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProcessPathResult {
    /// File can be processed, with its size
    FileValid(FPath, FileSz),
    /// File has no content
    FileErrEmpty(FPath),
    /// Path exists and is not a file, e.g. a device or a named pipe
    FileErrNotAFile(FPath),
    /// Path does not exist
    FileErrNotExist(FPath),
}

impl ProcessPathResult {
    pub fn path(&self) -> &FPath {
        match self {
            ProcessPathResult::FileValid(path, _)
            | ProcessPathResult::FileErrEmpty(path)
            | ProcessPathResult::FileErrNotAFile(path)
            | ProcessPathResult::FileErrNotExist(path) => path,
        }
    }

    pub const fn is_valid(&self) -> bool {
        matches!(self, ProcessPathResult::FileValid(..))
    }
}

pub type ProcessPathResults = Vec<ProcessPathResult>;

/// Result for one plain file.
fn process_file(
    path: &Path,
    fpath: FPath,
) -> ProcessPathResult {
    match path_filesz(path) {
        Some(0) => ProcessPathResult::FileErrEmpty(fpath),
        Some(filesz) => ProcessPathResult::FileValid(fpath, filesz),
        None => ProcessPathResult::FileErrNotExist(fpath),
    }
}

/// Return the files at `path`.
///
/// A directory is walked recursively, following symbolic links, with
/// entries sorted by file name. Directories themselves are not returned.
pub fn process_path(path: &FPath) -> ProcessPathResults {
    defn!("({:?})", path);

    let std_path: &Path = Path::new(path);
    if std_path.is_file() {
        let result = process_file(std_path, path.clone());
        defx!("({:?}) {:?}", path, result);
        return vec![result];
    }
    if !std_path.exists() {
        defx!("({:?}) does not exist", path);
        return vec![ProcessPathResult::FileErrNotExist(path.clone())];
    }
    if !std_path.is_dir() {
        defx!("({:?}) not a file", path);
        return vec![ProcessPathResult::FileErrNotAFile(path.clone())];
    }

    let mut paths: ProcessPathResults = ProcessPathResults::new();

    defo!("WalkDir({:?})…", path);
    for entry in ::walkdir::WalkDir::new(path.as_str())
        .follow_links(true)
        .sort_by_file_name()
    {
        let path_entry = match entry {
            Ok(val) => val,
            Err(_err) => {
                defo!("Err({:?})", _err);
                continue;
            }
        };
        let std_path_entry: &Path = path_entry.path();
        let fpath_entry: FPath = path_to_fpath(std_path_entry);
        let file_type = path_entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            defo!("Path not a file {:?}", path_entry);
            paths.push(ProcessPathResult::FileErrNotAFile(fpath_entry));
            continue;
        }
        paths.push(process_file(std_path_entry, fpath_entry));
    }
    defx!("return {:?}", paths);

    paths
}
