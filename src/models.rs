//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. They stay light-weight data holders so other layers can focus on
//! presentation and persistence logic.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of the `contacts` table.
pub struct Contact {
    /// Primary key assigned by SQLite. Update and delete flows target rows by
    /// this value, never by name.
    pub id: i64,
    pub name: String,
    pub phone: String,
    /// Empty when the contact has no email on file.
    pub email: String,
    /// Empty when the contact has no address on file.
    pub address: String,
}

impl Contact {
    /// The `(name, phone, email, address)` tuple without the identifier.
    pub fn fields(&self) -> (&str, &str, &str, &str) {
        (&self.name, &self.phone, &self.email, &self.address)
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.phone)
    }
}

/// Validated, trimmed field values ready to be written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}
