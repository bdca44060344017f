// src/debug/helpers.rs

//! Miscellaneous helper functions for testing.

use crate::common::FPath;

use std::fs::File;
use std::io::ErrorKind;
use std::io::Write; // for `write_all`
use std::path::PathBuf;

#[allow(unused_imports)]
use ::si_trace_print::{defo, defñ};

#[doc(hidden)]
pub use ::tempfile::NamedTempFile;
#[doc(hidden)]
pub use ::tempfile::TempDir;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary file helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Temporary files are named with this prefix, making leftovers easy to
/// find.
pub const STR_TEMPFILE_PREFIX: &str = "tmp-ax-test-";

/// Copy the `NamedTempFile` path to a `FPath`.
pub fn ntf_fpath(ntf: &NamedTempFile) -> FPath {
    FPath::from(ntf.path().to_str().unwrap())
}

/// Write `data` to a new temporary file.
pub fn create_temp_file_bytes(data: &[u8]) -> NamedTempFile {
    let mut ntf = match ::tempfile::Builder::new()
        .prefix(STR_TEMPFILE_PREFIX)
        .tempfile()
    {
        Ok(val) => val,
        Err(err) => {
            panic!("tempfile::Builder::new()..tempfile() return Err {}", err);
        }
    };
    if let Err(err) = ntf.write_all(data) {
        panic!("NamedTempFile::write_all() return Err {}", err);
    }
    defo!("{:?}", ntf.path());

    ntf
}

/// Write `data` to a new temporary file.
pub fn create_temp_file(data: &str) -> NamedTempFile {
    create_temp_file_bytes(data.as_bytes())
}

/// Create a temporary directory
pub fn create_temp_dir() -> TempDir {
    defñ!();
    ::tempfile::tempdir().unwrap()
}

/// Testing helper function to write a `[u8]` to a file in a temporary
/// directory. Will create leading directories in paths, e.g. `name` value
/// `foo/bar` creates directory `foo` and file `bar`.
/// A `name` ending with `/` only creates the directories.
pub fn create_file_bytes_name_in_tmpdir(
    data: &[u8],
    name: &str,
    tempdir: &TempDir,
) -> Option<File> {
    let mut pathb: PathBuf = tempdir.path().to_path_buf();
    pathb.push(name);
    if name.ends_with('/') {
        defo!("create_dir_all({:?})", pathb);
        std::fs::create_dir_all(&pathb).unwrap();
        return None;
    }
    if let Some(parent) = pathb.parent() {
        match std::fs::create_dir_all(parent) {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => panic!("Error {:?}", err),
        }
    }
    defo!("File::create({:?})", pathb);
    let mut file: File = File::create(&pathb).unwrap();
    file.write_all(data).unwrap();

    Some(file)
}
