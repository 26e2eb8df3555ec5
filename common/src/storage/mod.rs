// Storage module for S3-compatible object stores

pub mod lister;
pub mod s3_client;

pub use lister::{ObjectLister, Snapshot};
pub use s3_client::S3Client;
