pub mod contacts;

pub use contacts::{ContactNew, ContactRow, ContactsRepo, PRIMARY_ROW_LIMIT};
