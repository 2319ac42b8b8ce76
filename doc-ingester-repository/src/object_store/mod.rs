//! Object store adapters.

mod local;
mod s3;

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;
