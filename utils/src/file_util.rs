use core_types::{FileSize, Sha1Checksum};
use sha1::{
    Digest, Sha1,
    digest::{consts::U20, generic_array::GenericArray},
};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

pub fn get_sha1(content: &[u8]) -> Sha1Checksum {
    let mut hasher = Sha1::new();
    hasher.update(content);
    let sha1_checksum: GenericArray<u8, U20> = hasher.finalize();
    sha1_checksum.into()
}

/// Formats a byte count with binary units, e.g. `3145728` -> `"3 MB"`, `1536` -> `"1.5 KB"`.
///
/// Values are rounded to two decimals and trailing zeros are dropped.
pub fn format_file_size(bytes: FileSize) -> String {
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let formatted = format!("{:.2}", rounded);
    let formatted = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", formatted, SIZE_UNITS[unit])
}
