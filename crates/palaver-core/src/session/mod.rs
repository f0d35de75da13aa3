pub mod file_store;
pub mod state;
pub mod store;

pub use file_store::{FileSessionStore, SESSION_KEY};
pub use state::{Message, MessageId, Role, Session};
pub use store::{InMemorySessionStore, SessionStore, StoreError};
