// VarSleuth - platform/fs.rs
//
// Input file reading. The whole file is loaded before parsing starts; the
// handle is released before this module returns.

use std::io;
use std::path::Path;
use std::time::Duration;

/// Retry limits for transient I/O errors.
const MAX_RETRIES: u32 = 3;
const RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

/// Read the full content of a log file as a string.
///
/// Files larger than `large_threshold` bytes are memory-mapped; smaller files
/// are read into a buffer with transient-error retries. Invalid UTF-8 is
/// replaced rather than rejected so a stray byte cannot hide a whole file.
///
/// A missing or unreadable file is returned as the underlying `io::Error`.
pub fn read_log_file(path: &Path, large_threshold: u64) -> io::Result<String> {
    let size = std::fs::metadata(path)?.len();
    tracing::debug!(file = %path.display(), size, "Reading input file");

    if size > large_threshold {
        read_large_file(path)
    } else {
        read_small_file_with_retry(path)
    }
}

/// Read using `memmap2` for large files.
///
/// The mapped bytes are decoded in one pass into the returned `String`, so
/// the result is always a fresh copy of the content.
fn read_large_file(path: &Path) -> io::Result<String> {
    let file = std::fs::File::open(path)?;
    // SAFETY: the map is read-only and dropped before returning. A concurrent
    // writer truncating the file could fault the read; input logs are
    // expected to be complete before analysis.
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    Ok(String::from_utf8_lossy(&mmap).into_owned())
}

/// Read a small file with transient-error retries.
fn read_small_file_with_retry(path: &Path) -> io::Result<String> {
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..MAX_RETRIES {
        match std::fs::read(path) {
            Ok(bytes) => {
                return Ok(match String::from_utf8(bytes) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::debug!(
                            file = %path.display(),
                            "Input is not valid UTF-8; decoding lossily"
                        );
                        String::from_utf8_lossy(e.as_bytes()).into_owned()
                    }
                })
            }
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(RETRY_DELAYS_MS[attempt as usize]));
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("Unknown read error")))
}

/// Returns true for transient I/O errors that are worth retrying.
fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_small_and_large_paths_identically() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "-------------2024-01-01_00-00-00-------------\nx: 1\n").unwrap();
        file.flush().unwrap();

        let small = read_log_file(file.path(), u64::MAX).unwrap();
        let large = read_log_file(file.path(), 0).unwrap();
        assert_eq!(small, large);
        assert!(small.contains("x: 1"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"mode: \xffon\n").unwrap();
        file.flush().unwrap();

        let content = read_log_file(file.path(), u64::MAX).unwrap();
        assert!(content.starts_with("mode: "));
        assert!(content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_log_file(&dir.path().join("absent.log"), u64::MAX).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_transient_error_kinds() {
        assert!(is_transient_error(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(!is_transient_error(&io::Error::from(io::ErrorKind::NotFound)));
    }
}
