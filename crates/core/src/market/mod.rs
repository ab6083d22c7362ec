pub mod crypto;
pub mod quotes;
