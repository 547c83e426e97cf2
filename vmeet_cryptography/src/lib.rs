pub mod hash;
pub mod signature;
pub mod utils;
