//! Content-hash algorithms used by providers that index subtitles by the
//! bytes of the video itself (§6).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("I/O error hashing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

const CHUNK_SIZE: u64 = 64 * 1024;
const WORD_SIZE: u64 = 8;

/// The opensubtitles hash: a 64-bit wraparound sum of the file size plus
/// the first and last 64 KiB read as little-endian 8-byte words. Files
/// smaller than 128 KiB (two chunks) yield no hash.
pub fn opensubtitles(path: impl AsRef<Path>) -> Result<Option<String>, HashError> {
    let path = path.as_ref();
    let mut file = open(path)?;
    let size = file
        .metadata()
        .map_err(|source| io_err(path, source))?
        .len();

    if size < CHUNK_SIZE * 2 {
        return Ok(None);
    }

    let mut hash: u64 = size;

    hash = hash.wrapping_add(sum_words(&mut file, 0, CHUNK_SIZE, path)?);
    hash = hash.wrapping_add(sum_words(&mut file, size - CHUNK_SIZE, CHUNK_SIZE, path)?);

    Ok(Some(format!("{hash:016x}")))
}

fn sum_words(file: &mut File, offset: u64, len: u64, path: &Path) -> Result<u64, HashError> {
    file.seek(SeekFrom::Start(offset))
        .map_err(|source| io_err(path, source))?;

    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf).map_err(|source| io_err(path, source))?;

    let mut sum: u64 = 0;
    for word in buf.chunks_exact(WORD_SIZE as usize) {
        let bytes: [u8; 8] = word.try_into().expect("chunks_exact(8) yields 8 bytes");
        sum = sum.wrapping_add(u64::from_le_bytes(bytes));
    }
    Ok(sum)
}

/// The napiprojekt hash: MD5 of the first 10 MiB of the file, lowercase hex.
pub fn napiprojekt(path: impl AsRef<Path>) -> Result<String, HashError> {
    let path = path.as_ref();
    let mut file = open(path)?;

    const READ_SIZE: usize = 10 * 1024 * 1024;
    let mut buf = Vec::with_capacity(READ_SIZE);
    file.by_ref()
        .take(READ_SIZE as u64)
        .read_to_end(&mut buf)
        .map_err(|source| io_err(path, source))?;

    let digest = md5::compute(&buf);
    Ok(format!("{digest:x}"))
}

fn open(path: &Path) -> Result<File, HashError> {
    File::open(path).map_err(|source| io_err(path, source))
}

fn io_err(path: &Path, source: std::io::Error) -> HashError {
    HashError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(bytes: &[u8]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn opensubtitles_hash_below_threshold_is_none() {
        let f = write_temp(&vec![0u8; 128 * 1024 - 1]);
        assert_eq!(opensubtitles(f.path()).unwrap(), None);
    }

    #[test]
    fn opensubtitles_hash_at_threshold_is_some() {
        let f = write_temp(&vec![0u8; 128 * 1024]);
        assert!(opensubtitles(f.path()).unwrap().is_some());
    }

    #[test]
    fn opensubtitles_hash_all_zero_file_is_just_size() {
        let size = 128 * 1024u64;
        let f = write_temp(&vec![0u8; size as usize]);
        let hash = opensubtitles(f.path()).unwrap().unwrap();
        assert_eq!(hash, format!("{size:016x}"));
    }

    #[test]
    fn opensubtitles_hash_wraps_on_overflow() {
        // First/last word both 0xFFFF_FFFF_FFFF_FFFF plus a non-zero size
        // must wrap rather than panic.
        let mut bytes = vec![0xFFu8; 128 * 1024];
        // Keep the rest zero except the first/last words already all-ff.
        bytes.truncate(128 * 1024);
        let f = write_temp(&bytes);
        // Must not panic, and must be deterministic.
        let hash_a = opensubtitles(f.path()).unwrap().unwrap();
        let hash_b = opensubtitles(f.path()).unwrap().unwrap();
        assert_eq!(hash_a, hash_b);
    }

    #[test]
    fn napiprojekt_hash_is_md5_of_first_10mib() {
        let f = write_temp(b"hello world");
        let expected = format!("{:x}", md5::compute(b"hello world"));
        assert_eq!(napiprojekt(f.path()).unwrap(), expected);
    }

    #[test]
    fn napiprojekt_hash_truncates_to_10mib() {
        let mut bytes = vec![1u8; 10 * 1024 * 1024];
        bytes.extend_from_slice(&[2u8; 100]);
        let f = write_temp(&bytes);
        let expected = format!("{:x}", md5::compute(&bytes[..10 * 1024 * 1024]));
        assert_eq!(napiprojekt(f.path()).unwrap(), expected);
    }

    #[test]
    fn missing_file_errors() {
        assert!(opensubtitles("/does/not/exist").is_err());
        assert!(napiprojekt("/does/not/exist").is_err());
    }
}
