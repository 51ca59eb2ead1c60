use core_types::{FileSize, Sha1Checksum};

use crate::file_util::get_sha1;

/// Checksum and size of a string used as fake file content in tests.
pub fn get_sha1_and_size(str: &str) -> (Sha1Checksum, FileSize) {
    let expected_checksum = get_sha1(str.as_bytes());
    let expected_size: FileSize = str.len() as u64;
    (expected_checksum, expected_size)
}
