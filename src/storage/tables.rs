use redb::TableDefinition;

/// Books: id -> Book (msgpack)
pub const BOOKS: TableDefinition<u64, &[u8]> = TableDefinition::new("books");

/// Secondary index: isbn -> book id (enforces ISBN uniqueness)
pub const BOOK_ISBNS: TableDefinition<&str, u64> = TableDefinition::new("book_isbns");

/// Counters: name -> value
pub const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

/// Session tokens: token -> SessionToken (msgpack)
pub const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Users: username -> Credential (msgpack)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Key in [`META`] holding the last book id handed out
pub const BOOK_SEQUENCE: &str = "book_sequence";
