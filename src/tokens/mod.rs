pub mod generator;
pub mod password;
pub mod session;

pub use generator::{generate_hex, generate_token};
pub use session::{MemoryTokenStore, SessionError, TokenStore};
