use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use tracing::info;

use crate::models::Contact;

/// Column list shared by every read so `row_to_contact` can rely on ordinal
/// positions. NULL columns (rows written by other tools) read back as empty
/// strings.
const CONTACT_COLUMNS: &str = "id, name, phone, email, address";

fn row_to_contact(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        phone: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        email: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        address: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}

/// Insert a new contact and echo the hydrated row, including the identifier
/// SQLite assigned to it.
pub fn insert_contact(
    conn: &Connection,
    name: &str,
    phone: &str,
    email: &str,
    address: &str,
) -> Result<Contact> {
    conn.execute(
        "INSERT INTO contacts (name, phone, email, address) VALUES (?1, ?2, ?3, ?4)",
        params![name, phone, email, address],
    )
    .context("failed to insert contact")?;

    let id = conn.last_insert_rowid();
    info!(id, "inserted contact");
    Ok(Contact {
        id,
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        address: address.to_string(),
    })
}

/// Every contact in the table. No ORDER BY is applied, so rows come back in
/// whatever order SQLite scans them.
pub fn fetch_contacts(conn: &Connection) -> Result<Vec<Contact>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {CONTACT_COLUMNS} FROM contacts"))
        .context("failed to prepare contact query")?;

    let contacts = stmt
        .query_map([], row_to_contact)
        .context("failed to load contacts")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect contacts")?;

    Ok(contacts)
}

/// Overwrite all four editable fields of the row with the given id. Missing
/// rows are not an error: zero affected rows is reported the same way as one.
pub fn update_contact(
    conn: &Connection,
    id: i64,
    name: &str,
    phone: &str,
    email: &str,
    address: &str,
) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE contacts SET name = ?1, phone = ?2, email = ?3, address = ?4 WHERE id = ?5",
            params![name, phone, email, address, id],
        )
        .context("failed to update contact")?;

    info!(id, updated, "updated contact");
    Ok(())
}

/// Remove the row with the given id. Deleting an id that no longer exists is a
/// no-op.
pub fn delete_contact(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM contacts WHERE id = ?1", params![id])
        .context("failed to delete contact")?;

    info!(id, deleted, "deleted contact");
    Ok(())
}

/// Rows whose name contains `name_substring` or whose phone contains
/// `phone_substring`. Matching goes through `LIKE`, so ASCII letters compare
/// case-insensitively. Empty substrings match every row.
pub fn search_contacts(
    conn: &Connection,
    name_substring: &str,
    phone_substring: &str,
) -> Result<Vec<Contact>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE IFNULL(name, '') LIKE ?1 ESCAPE '\\'
                OR IFNULL(phone, '') LIKE ?2 ESCAPE '\\'"
        ))
        .context("failed to prepare contact search")?;

    let contacts = stmt
        .query_map(
            params![contains_pattern(name_substring), contains_pattern(phone_substring)],
            row_to_contact,
        )
        .context("failed to search contacts")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect search results")?;

    Ok(contacts)
}

/// Wrap user text in `%...%`, escaping LIKE metacharacters so `%` and `_`
/// typed by the user match themselves.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
