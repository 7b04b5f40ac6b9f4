pub mod chunking;
pub mod error;
pub mod parallel_upload;
pub mod storage;
