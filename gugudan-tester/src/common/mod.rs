pub mod scenario;
pub mod store;
pub mod util;

pub use store::{FileStore, StoreError};
pub use util::split_csv;
