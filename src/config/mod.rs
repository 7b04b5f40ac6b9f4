use crate::services::chunking::MAX_CHUNKS;
use std::env;
use std::path::PathBuf;

/// Configuration for the parallel upload function
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Destination bucket (default: "your_bucket_name")
    pub bucket: String,

    /// Custom S3-compatible endpoint, e.g. MinIO or https://storage.googleapis.com
    pub endpoint_url: Option<String>,

    /// Signing region (default: "us-east-1")
    pub region: String,

    /// Static access key, used together with `secret_key`
    pub access_key: Option<String>,

    /// Static secret key, used together with `access_key`
    pub secret_key: Option<String>,

    /// Use path-style addressing (default: true)
    pub force_path_style: bool,

    /// Number of chunks and size of the upload pool (default: 4, at most 1024)
    pub num_threads: usize,

    /// Parent directory for chunk files (default: system temp dir)
    pub temp_dir: Option<PathBuf>,

    /// HTTP port (default: 8080)
    pub port: u16,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            bucket: "your_bucket_name".to_string(),
            endpoint_url: None,
            region: "us-east-1".to_string(),
            access_key: None,
            secret_key: None,
            force_path_style: true,
            num_threads: 4,
            temp_dir: None,
            port: 8080,
        }
    }
}

impl UploadConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            bucket: non_empty("STORAGE_BUCKET").unwrap_or(default.bucket),

            endpoint_url: non_empty("STORAGE_ENDPOINT"),

            region: non_empty("STORAGE_REGION").unwrap_or(default.region),

            access_key: non_empty("STORAGE_ACCESS_KEY"),

            secret_key: non_empty("STORAGE_SECRET_KEY"),

            force_path_style: lookup("STORAGE_FORCE_PATH_STYLE")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.force_path_style),

            num_threads: lookup("UPLOAD_THREADS")
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| (1..=MAX_CHUNKS).contains(n))
                .unwrap_or(default.num_threads),

            temp_dir: non_empty("UPLOAD_TEMP_DIR").map(PathBuf::from),

            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),
        }
    }

    /// Static credentials, only when both halves are configured
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key, &self.secret_key) {
            (Some(access), Some(secret)) => Some((access.as_str(), secret.as_str())),
            _ => None,
        }
    }
}
