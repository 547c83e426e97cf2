mod meeting;
mod network;

pub use meeting::*;
pub use network::*;
