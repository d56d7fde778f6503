//! File content reading with head/tail abbreviation

use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::types::{Result, TRUNCATION_MARKER};

/// Read `path` as lossy UTF-8.
///
/// When `size` exceeds `max_content_bytes`, only the first and last
/// `max_content_bytes / 2` bytes are read, joined by [`TRUNCATION_MARKER`].
pub async fn read_content(path: &Path, size: u64, max_content_bytes: u64) -> Result<String> {
    if size <= max_content_bytes {
        let bytes = tokio::fs::read(path).await?;
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }

    let segment = max_content_bytes / 2;
    let mut file = File::open(path).await?;

    let mut head = Vec::with_capacity(segment as usize);
    (&mut file).take(segment).read_to_end(&mut head).await?;

    let mut tail = Vec::with_capacity(segment as usize);
    file.seek(SeekFrom::Start(size.saturating_sub(segment))).await?;
    file.take(segment).read_to_end(&mut tail).await?;

    Ok(format!(
        "{}{}{}",
        String::from_utf8_lossy(&head),
        TRUNCATION_MARKER,
        String::from_utf8_lossy(&tail)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_small_file_read_whole() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.txt");
        std::fs::write(&path, "fn main() {}\n").unwrap();

        let content = read_content(&path, 13, 1024).await.unwrap();
        assert_eq!(content, "fn main() {}\n");
    }

    #[tokio::test]
    async fn test_large_file_keeps_head_and_tail() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.txt");
        let body = format!("{}{}{}", "H".repeat(600), "M".repeat(3000), "T".repeat(600));
        std::fs::write(&path, &body).unwrap();

        let content = read_content(&path, body.len() as u64, 1024).await.unwrap();

        assert_eq!(content.matches(TRUNCATION_MARKER).count(), 1);
        let (head, tail) = content.split_once(TRUNCATION_MARKER).unwrap();
        assert_eq!(head, "H".repeat(512));
        assert_eq!(tail, "T".repeat(512));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_lossy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bin.dat");
        std::fs::write(&path, [b'o', b'k', 0xFF, 0xFE]).unwrap();

        let content = read_content(&path, 4, 1024).await.unwrap();
        assert!(content.starts_with("ok"));
        assert!(content.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        let result = read_content(&dir.path().join("gone.rs"), 10, 1024).await;
        assert!(result.is_err());
    }
}
