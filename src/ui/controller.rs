//! Form/list controller. Owns the database connection together with the
//! transient UI state (form contents, selection, displayed rows) and turns
//! [`Action`]s into single SQL statements followed by a list refresh.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{
    delete_contact, fetch_contacts, insert_contact, open_database, search_contacts,
    update_contact,
};
use crate::models::Contact;

use super::forms::ContactForm;

/// Which action needed a selected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Update,
    Delete,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Update => f.write_str("update"),
            Verb::Delete => f.write_str("delete"),
        }
    }
}

/// User-input problems that block an action before storage is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("Name and Phone are required!")]
    MissingRequired,
    #[error("Select a contact to {0}.")]
    NoSelection(Verb),
}

/// Everything the user can ask the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    /// Select the displayed row with this storage id.
    Select(i64),
    Update,
    Delete,
    Search,
    Refresh,
    /// Drop the selection and blank the form without touching storage.
    Clear,
}

/// Result of a dispatched action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(Contact),
    Updated(i64),
    Deleted(i64),
    Selected(i64),
    /// Number of rows the search produced.
    Searched(usize),
    /// Number of rows after a full reload.
    Refreshed(usize),
    Cleared,
    Unchanged,
    Rejected(Warning),
}

/// Application context: one long-lived connection plus the state of the form
/// and list bound to it.
pub struct Controller {
    conn: Connection,
    form: ContactForm,
    selection: Option<i64>,
    rows: Vec<Contact>,
}

impl Controller {
    /// Open the database file at `path` and load every contact.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = open_database(path)?;
        Self::new(conn)
    }

    /// Wrap an already opened connection and load every contact.
    pub fn new(conn: Connection) -> Result<Self> {
        let mut controller = Self {
            conn,
            form: ContactForm::default(),
            selection: None,
            rows: Vec::new(),
        };
        controller.refresh()?;
        Ok(controller)
    }

    /// Release the connection, surfacing any error SQLite reports while
    /// closing. Dropping the controller also closes it, silently.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| err)
            .context("failed to close contact database")
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ContactForm {
        &mut self.form
    }

    pub fn selection(&self) -> Option<i64> {
        self.selection
    }

    /// Rows currently shown in the list: the full table, or the last search.
    pub fn rows(&self) -> &[Contact] {
        &self.rows
    }

    /// Single entry point for every user action.
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        let outcome = match action {
            Action::Add => self.add()?,
            Action::Select(id) => self.select(id),
            Action::Update => self.update()?,
            Action::Delete => self.delete()?,
            Action::Search => self.search()?,
            Action::Refresh => Outcome::Refreshed(self.refresh()?),
            Action::Clear => {
                self.reset_form();
                Outcome::Cleared
            }
        };

        if let Outcome::Rejected(warning) = &outcome {
            warn!(?action, %warning, "action rejected");
        }
        Ok(outcome)
    }

    fn add(&mut self) -> Result<Outcome> {
        let draft = match self.form.parse_inputs() {
            Ok(draft) => draft,
            Err(warning) => return Ok(Outcome::Rejected(warning)),
        };

        let contact = insert_contact(
            &self.conn,
            &draft.name,
            &draft.phone,
            &draft.email,
            &draft.address,
        )?;
        self.refresh()?;
        self.reset_form();
        Ok(Outcome::Added(contact))
    }

    fn select(&mut self, id: i64) -> Outcome {
        match self.rows.iter().find(|contact| contact.id == id) {
            Some(contact) => {
                self.form.fill_from(contact);
                self.selection = Some(id);
                Outcome::Selected(id)
            }
            None => Outcome::Unchanged,
        }
    }

    fn update(&mut self) -> Result<Outcome> {
        let Some(id) = self.selection else {
            return Ok(Outcome::Rejected(Warning::NoSelection(Verb::Update)));
        };
        let draft = match self.form.parse_inputs() {
            Ok(draft) => draft,
            Err(warning) => return Ok(Outcome::Rejected(warning)),
        };

        update_contact(
            &self.conn,
            id,
            &draft.name,
            &draft.phone,
            &draft.email,
            &draft.address,
        )?;
        self.refresh()?;
        self.reset_form();
        Ok(Outcome::Updated(id))
    }

    fn delete(&mut self) -> Result<Outcome> {
        let Some(id) = self.selection else {
            return Ok(Outcome::Rejected(Warning::NoSelection(Verb::Delete)));
        };

        delete_contact(&self.conn, id)?;
        self.refresh()?;
        self.reset_form();
        Ok(Outcome::Deleted(id))
    }

    fn search(&mut self) -> Result<Outcome> {
        let name = self.form.name.trim();
        let phone = self.form.phone.trim();
        self.rows = search_contacts(&self.conn, name, phone)?;
        info!(matches = self.rows.len(), "searched contacts");
        Ok(Outcome::Searched(self.rows.len()))
    }

    fn refresh(&mut self) -> Result<usize> {
        self.rows = fetch_contacts(&self.conn)?;
        Ok(self.rows.len())
    }

    fn reset_form(&mut self) {
        self.form.clear();
        self.selection = None;
    }
}
