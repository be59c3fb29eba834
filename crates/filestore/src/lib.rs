pub mod error;
pub mod http;

pub use error::{StoreError, StoreResult};
pub use http::HttpFileStore;
