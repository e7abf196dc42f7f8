pub mod polyglot_book;
pub mod polyglot_hash;
pub mod polyglot_keys;

pub use polyglot_book::{PolyglotBook, PolyglotEntry};
pub use polyglot_hash::polyglot_key;
