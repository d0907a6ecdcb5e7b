mod server;
mod storage;

pub use server::{ServerConfig, parse_api_keys};
pub use storage::StorageConfig;
