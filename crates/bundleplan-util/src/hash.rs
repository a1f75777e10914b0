use std::fs::File;
use std::io;
use std::path::Path;

/// Compute the BLAKE3 hash of a byte slice, returning the hex-encoded digest.
#[must_use]
pub fn blake3_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Content fingerprint: the first `len` hex characters of the BLAKE3 digest.
///
/// `len` is clamped to the full digest length (64).
#[must_use]
pub fn content_hash(data: &[u8], len: usize) -> String {
    truncated(blake3_bytes(data), len)
}

/// Content fingerprint of the file at `path`, as [`content_hash`] would
/// compute it over the file's bytes. The file is streamed, never loaded.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn content_hash_file(path: &Path, len: usize) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut File::open(path)?, &mut hasher)?;
    Ok(truncated(hasher.finalize().to_hex().to_string(), len))
}

fn truncated(mut hex: String, len: usize) -> String {
    hex.truncate(len.min(hex.len()));
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HELLO_WORLD: &str = "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24";

    #[test]
    fn test_blake3_bytes() {
        assert_eq!(blake3_bytes(b"hello world"), HELLO_WORLD);
    }

    #[test]
    fn test_content_hash_file_matches_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        assert_eq!(content_hash_file(file.path(), 20).unwrap(), &HELLO_WORLD[..20]);
        assert_eq!(
            content_hash_file(file.path(), 20).unwrap(),
            content_hash(b"hello world", 20)
        );
    }

    #[test]
    fn test_content_hash_file_spans_buffers() {
        let data = vec![7u8; 100_000];
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        assert_eq!(
            content_hash_file(file.path(), 64).unwrap(),
            content_hash(&data, 64)
        );
    }

    #[test]
    fn test_content_hash_file_not_found() {
        assert!(content_hash_file(Path::new("/nonexistent/file"), 20).is_err());
    }

    #[test]
    fn test_content_hash_truncates() {
        assert_eq!(content_hash(b"hello world", 20), &HELLO_WORLD[..20]);
        assert_eq!(content_hash(b"hello world", 500), HELLO_WORLD);
    }

    #[test]
    fn test_content_hash_differs_for_different_content() {
        assert_ne!(content_hash(b"a", 20), content_hash(b"b", 20));
    }
}
