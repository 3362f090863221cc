pub mod memory;
pub mod store;

pub use memory::MemoryTokenStore;
pub use store::{StoreError, TokenStore};
