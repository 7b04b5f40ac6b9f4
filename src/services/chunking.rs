//! Fixed-width partitioning of a source file into chunk files.

use crate::services::error::{Result, UploadError};
use std::io::{self, SeekFrom};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Upper bound on chunks (and pool size) for a single upload.
pub const MAX_CHUNKS: usize = 1024;

/// A contiguous byte range of the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub index: usize,
    pub offset: u64,
    pub len: u64,
}

impl ChunkRange {
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// Splits `file_size` bytes into exactly `num_chunks` ranges.
///
/// Every range but the last is `file_size / num_chunks` bytes long; the last
/// one starts where the others stop and runs to the end of the file, so it
/// also carries the remainder of the division.
pub fn plan_chunks(file_size: u64, num_chunks: usize) -> Result<Vec<ChunkRange>> {
    if num_chunks == 0 || num_chunks > MAX_CHUNKS {
        return Err(UploadError::InvalidThreadCount);
    }

    let count = num_chunks as u64;
    let chunk_size = file_size / count;

    let chunks = (0..count)
        .map(|i| {
            let offset = i * chunk_size;
            let len = if i + 1 < count {
                chunk_size
            } else {
                file_size - offset
            };
            ChunkRange {
                index: i as usize,
                offset,
                len,
            }
        })
        .collect();

    Ok(chunks)
}

/// Object name of chunk `index` of the file called `base`.
pub fn part_name(base: &str, index: usize) -> String {
    format!("{}_part_{}", base, index)
}

/// Final path component, used as the prefix of every part name.
pub fn blob_base_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| UploadError::InvalidSourcePath(path.to_path_buf()))
}

/// Copies `range` of `source` into a newly created file at `dest`.
pub async fn write_chunk(source: &Path, range: &ChunkRange, dest: &Path) -> io::Result<u64> {
    let mut input = File::open(source).await?;
    input.seek(SeekFrom::Start(range.offset)).await?;

    let mut output = File::create(dest).await?;
    let mut limited = input.take(range.len);
    let copied = tokio::io::copy(&mut limited, &mut output).await?;
    output.flush().await?;

    if copied != range.len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "chunk {} expected {} bytes at offset {}, read {}",
                range.index, range.len, range.offset, copied
            ),
        ));
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn assert_partitions(chunks: &[ChunkRange], file_size: u64) {
        let mut expected_offset = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.offset, expected_offset, "gap or overlap before chunk {}", i);
            expected_offset = chunk.end();
        }
        assert_eq!(expected_offset, file_size);
    }

    #[test]
    fn test_even_split() {
        let chunks = plan_chunks(100, 4).unwrap();
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.len == 25));
        assert_partitions(&chunks, 100);
    }

    #[test]
    fn test_last_chunk_absorbs_remainder() {
        let chunks = plan_chunks(103, 4).unwrap();
        assert_eq!(chunks.len(), 4);
        assert_eq!(
            chunks.iter().map(|c| c.len).collect::<Vec<_>>(),
            vec![25, 25, 25, 28]
        );
        assert_partitions(&chunks, 103);
    }

    #[test]
    fn test_file_smaller_than_thread_count() {
        let chunks = plan_chunks(3, 4).unwrap();
        assert_eq!(chunks.len(), 4);
        assert_eq!(
            chunks.iter().map(|c| c.len).collect::<Vec<_>>(),
            vec![0, 0, 0, 3]
        );
        assert_partitions(&chunks, 3);
    }

    #[test]
    fn test_empty_file() {
        let chunks = plan_chunks(0, 4).unwrap();
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.len == 0 && c.offset == 0));
    }

    #[test]
    fn test_partition_holds_for_many_sizes() {
        for size in [1u64, 7, 64, 1000, 4097, 1 << 20] {
            for threads in 1..=9 {
                let chunks = plan_chunks(size, threads).unwrap();
                assert_eq!(chunks.len(), threads);
                assert_partitions(&chunks, size);
            }
        }
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(
            plan_chunks(10, 0),
            Err(UploadError::InvalidThreadCount)
        ));
    }

    #[test]
    fn test_thread_count_above_cap_rejected() {
        assert_eq!(plan_chunks(10, MAX_CHUNKS).unwrap().len(), MAX_CHUNKS);
        assert!(matches!(
            plan_chunks(10, MAX_CHUNKS + 1),
            Err(UploadError::InvalidThreadCount)
        ));
        assert!(matches!(
            plan_chunks(10, 1_000_000_000),
            Err(UploadError::InvalidThreadCount)
        ));
    }

    #[test]
    fn test_part_name() {
        assert_eq!(part_name("video.mp4", 0), "video.mp4_part_0");
        assert_eq!(part_name("video.mp4", 3), "video.mp4_part_3");
    }

    #[test]
    fn test_blob_base_name() {
        assert_eq!(
            blob_base_name(Path::new("/data/in/archive.tar")).unwrap(),
            "archive.tar"
        );
        assert_eq!(blob_base_name(Path::new("notes.txt")).unwrap(), "notes.txt");
        assert!(matches!(
            blob_base_name(Path::new("/")),
            Err(UploadError::InvalidSourcePath(p)) if p == PathBuf::from("/")
        ));
        assert!(blob_base_name(Path::new("..")).is_err());
    }

    #[tokio::test]
    async fn test_write_chunk_copies_exact_range() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.bin");
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        tokio::fs::write(&source, &data).await.unwrap();

        let range = ChunkRange {
            index: 2,
            offset: 500,
            len: 250,
        };
        let dest = dir.path().join("chunk_2");
        let written = write_chunk(&source, &range, &dest).await.unwrap();

        assert_eq!(written, 250);
        let chunk = tokio::fs::read(&dest).await.unwrap();
        assert_eq!(chunk, &data[500..750]);
    }

    #[tokio::test]
    async fn test_write_chunk_short_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.bin");
        tokio::fs::write(&source, b"short").await.unwrap();

        let range = ChunkRange {
            index: 0,
            offset: 0,
            len: 10,
        };
        let err = write_chunk(&source, &range, &dir.path().join("chunk_0"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
