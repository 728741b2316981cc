mod books;
pub mod db;
pub mod models;
mod sessions;
mod tables;
mod users;

pub use books::BookWrite;
pub use db::{Database, DatabaseError};
pub use tables::*;
