// src/tests/filepreprocessor_tests.rs

//! tests for `filepreprocessor.rs`

#![allow(non_snake_case)]

use crate::common::FPath;
use crate::debug::helpers::{create_file_bytes_name_in_tmpdir, create_temp_dir, create_temp_file, ntf_fpath};
use crate::readers::filepreprocessor::{process_path, ProcessPathResult};
use crate::readers::helpers::path_to_fpath;

use std::path::PathBuf;

fn tmpdir_fpath(
    tempdir: &::tempfile::TempDir,
    name: &str,
) -> FPath {
    let mut pathb: PathBuf = tempdir.path().to_path_buf();
    pathb.push(name);

    path_to_fpath(pathb.as_path())
}

#[test]
fn test_process_path_file() {
    let ntf = create_temp_file("Jan  1 00:00:00 host1 cron[100]: line 1\n");
    let fpath = ntf_fpath(&ntf);
    let results = process_path(&fpath);
    assert_eq!(results, vec![ProcessPathResult::FileValid(fpath.clone(), 40)]);
    assert!(results[0].is_valid());
    assert_eq!(results[0].path(), &fpath);
}

#[test]
fn test_process_path_file_empty() {
    let ntf = create_temp_file("");
    let fpath = ntf_fpath(&ntf);
    let results = process_path(&fpath);
    assert_eq!(results, vec![ProcessPathResult::FileErrEmpty(fpath)]);
    assert!(!results[0].is_valid());
}

#[test]
fn test_process_path_not_exist() {
    let tempdir = create_temp_dir();
    let fpath = tmpdir_fpath(&tempdir, "no-such-file");
    let results = process_path(&fpath);
    assert_eq!(results, vec![ProcessPathResult::FileErrNotExist(fpath)]);
}

#[test]
fn test_process_path_dir() {
    let tempdir = create_temp_dir();
    create_file_bytes_name_in_tmpdir(b"bbb", "b.log", &tempdir);
    create_file_bytes_name_in_tmpdir(b"", "a-empty.log", &tempdir);
    create_file_bytes_name_in_tmpdir(b"c", "c/nested.log", &tempdir);
    create_file_bytes_name_in_tmpdir(b"", "d/", &tempdir);

    let results = process_path(&path_to_fpath(tempdir.path()));
    assert_eq!(
        results,
        vec![
            ProcessPathResult::FileErrEmpty(tmpdir_fpath(&tempdir, "a-empty.log")),
            ProcessPathResult::FileValid(tmpdir_fpath(&tempdir, "b.log"), 3),
            ProcessPathResult::FileValid(tmpdir_fpath(&tempdir, "c/nested.log"), 1),
        ]
    );
}

#[test]
fn test_process_path_dir_empty() {
    let tempdir = create_temp_dir();
    let results = process_path(&path_to_fpath(tempdir.path()));
    assert!(results.is_empty(), "{:?}", results);
}
