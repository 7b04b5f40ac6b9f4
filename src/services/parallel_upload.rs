use crate::config::UploadConfig;
use crate::services::chunking::{self, ChunkRange};
use crate::services::error::{Result, UploadError};
use crate::services::storage::StorageService;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Outcome of a single chunk upload.
#[derive(Debug, Clone)]
pub struct PartOutcome {
    pub index: usize,
    pub blob_name: String,
    pub len: u64,
    pub error: Option<String>,
}

impl PartOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct UploadReport {
    pub file_path: PathBuf,
    pub bucket: String,
    pub total_size: u64,
    /// Ordered by chunk index.
    pub parts: Vec<PartOutcome>,
}

impl UploadReport {
    pub fn part_names(&self) -> Vec<String> {
        self.parts.iter().map(|p| p.blob_name.clone()).collect()
    }

    pub fn failed_parts(&self) -> usize {
        self.parts.iter().filter(|p| !p.is_success()).count()
    }
}

pub struct ParallelUploader {
    storage: Arc<dyn StorageService>,
    num_threads: usize,
    temp_dir: Option<PathBuf>,
}

impl ParallelUploader {
    pub fn new(storage: Arc<dyn StorageService>, config: &UploadConfig) -> Self {
        Self {
            storage,
            num_threads: config.num_threads,
            temp_dir: config.temp_dir.clone(),
        }
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn bucket(&self) -> &str {
        self.storage.bucket()
    }

    /// Uploads `file_path` as `num_threads` separate objects.
    ///
    /// Failed chunk uploads are logged and reported but never fail the call.
    /// Only problems with the source file or the local chunk files do.
    pub async fn upload(&self, file_path: &Path) -> Result<UploadReport> {
        let metadata = tokio::fs::metadata(file_path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                UploadError::SourceNotFound(file_path.to_path_buf())
            } else {
                UploadError::Io(e)
            }
        })?;
        if !metadata.is_file() {
            return Err(UploadError::InvalidSourcePath(file_path.to_path_buf()));
        }

        let file_size = metadata.len();
        let blob_name = chunking::blob_base_name(file_path)?;
        let chunks = chunking::plan_chunks(file_size, self.num_threads)?;

        self.upload_chunks(file_path, file_size, &blob_name, &chunks)
            .await
    }

    /// Writes each planned chunk to a temp file and hands it to the pool.
    async fn upload_chunks(
        &self,
        file_path: &Path,
        file_size: u64,
        blob_name: &str,
        chunks: &[ChunkRange],
    ) -> Result<UploadReport> {
        info!(
            "📦 Splitting {} ({} bytes) into {} chunks for {}",
            file_path.display(),
            file_size,
            chunks.len(),
            self.storage.bucket()
        );

        let work_dir = self.create_work_dir()?;
        let pool = Arc::new(Semaphore::new(self.num_threads));
        let mut tasks = JoinSet::new();
        let mut prepare_error = None;

        for chunk in chunks {
            let chunk_path = work_dir.path().join(format!("chunk_{}", chunk.index));
            if let Err(e) = chunking::write_chunk(file_path, chunk, &chunk_path).await {
                error!("❌ Failed to write chunk {}: {}", chunk.index, e);
                prepare_error = Some(e);
                break;
            }

            let storage = self.storage.clone();
            let pool = pool.clone();
            let name = chunking::part_name(blob_name, chunk.index);
            let chunk = *chunk;

            tasks.spawn(async move {
                let _permit = pool.acquire_owned().await;
                let res = storage.upload_file(&name, &chunk_path).await;
                (chunk, name, res)
            });
        }

        // Tasks already submitted still run to completion before the temp dir goes away.
        let mut outcomes: Vec<PartOutcome> = Vec::with_capacity(chunks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((chunk, name, res)) => {
                    outcomes.push(Self::outcome(&chunk, name, res));
                }
                Err(e) => error!("Error uploading chunk: {}", e),
            }
        }
        drop(work_dir);

        if let Some(e) = prepare_error {
            return Err(UploadError::Io(e));
        }

        // A panicked task leaves no outcome behind; record its chunk as failed.
        for chunk in chunks {
            if !outcomes.iter().any(|o| o.index == chunk.index) {
                outcomes.push(PartOutcome {
                    index: chunk.index,
                    blob_name: chunking::part_name(blob_name, chunk.index),
                    len: chunk.len,
                    error: Some("upload task aborted".to_string()),
                });
            }
        }
        outcomes.sort_by_key(|o| o.index);

        let report = UploadReport {
            file_path: file_path.to_path_buf(),
            bucket: self.storage.bucket().to_string(),
            total_size: file_size,
            parts: outcomes,
        };

        info!(
            "✅ Parallel upload complete: {}/{} chunks uploaded",
            report.parts.len() - report.failed_parts(),
            report.parts.len()
        );
        Ok(report)
    }

    fn outcome(chunk: &ChunkRange, blob_name: String, res: anyhow::Result<()>) -> PartOutcome {
        let error = match res {
            Ok(()) => None,
            Err(e) => {
                error!("Error uploading chunk: {} ({:#})", blob_name, e);
                Some(format!("{:#}", e))
            }
        };

        PartOutcome {
            index: chunk.index,
            blob_name,
            len: chunk.len,
            error,
        }
    }

    fn create_work_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("parallel-upload-");
        let dir = match &self.temp_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }
}
