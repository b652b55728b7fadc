mod error;
mod key;
mod traits;

pub mod filesystem;
pub mod s3_store;

pub use error::StorageError;
pub use key::validate_key;
pub use traits::ContentStore;
