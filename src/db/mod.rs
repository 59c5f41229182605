//! Persistence module split across logical submodules.

mod connection;
mod contacts;

pub use connection::{ensure_schema, open_database, open_in_memory};
pub use contacts::{
    delete_contact, fetch_contacts, insert_contact, search_contacts, update_contact,
};
