use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Contact, ContactDraft};

use super::controller::Warning;

/// The four input slots of the contact form, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Phone,
    Email,
    Address,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::Phone,
        FormField::Email,
        FormField::Address,
    ];

    /// Label shown to the left of the input.
    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Phone => "Phone",
            FormField::Email => "Email",
            FormField::Address => "Address",
        }
    }

    /// Whether the field must be non-blank before a save.
    pub fn required(self) -> bool {
        matches!(self, FormField::Name | FormField::Phone)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            FormField::Name => 0,
            FormField::Phone => 1,
            FormField::Email => 2,
            FormField::Address => 3,
        }
    }
}

/// Transient values typed into the form. Reset after every successful
/// mutation.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub active: FormField,
}

impl ContactForm {
    /// Borrow the text stored in a slot.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Phone => &self.phone,
            FormField::Email => &self.email,
            FormField::Address => &self.address,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Phone => &mut self.phone,
            FormField::Email => &mut self.email,
            FormField::Address => &mut self.address,
        }
    }

    /// Replace the text of a slot wholesale.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.value_mut(field) = value.into();
    }

    pub fn focus(&mut self, field: FormField) {
        self.active = field;
    }

    /// Move focus down, wrapping from Address back to Name.
    pub fn next_field(&mut self) {
        let next = (self.active.index() + 1) % FormField::ALL.len();
        self.active = FormField::ALL[next];
    }

    /// Move focus up, wrapping from Name to Address.
    pub fn previous_field(&mut self) {
        let len = FormField::ALL.len();
        let previous = (self.active.index() + len - 1) % len;
        self.active = FormField::ALL[previous];
    }

    /// Append a character to the active field. Control characters are
    /// rejected.
    pub fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    /// Remove the last character from the active field.
    pub fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Blank every slot and return focus to Name.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Copy a stored contact into the form for editing.
    pub fn fill_from(&mut self, contact: &Contact) {
        self.name = contact.name.clone();
        self.phone = contact.phone.clone();
        self.email = contact.email.clone();
        self.address = contact.address.clone();
    }

    /// Trim every slot and enforce the required fields.
    pub fn parse_inputs(&self) -> Result<ContactDraft, Warning> {
        let name = self.name.trim();
        let phone = self.phone.trim();
        if name.is_empty() || phone.is_empty() {
            return Err(Warning::MissingRequired);
        }
        Ok(ContactDraft {
            name: name.to_string(),
            phone: phone.to_string(),
            email: self.email.trim().to_string(),
            address: self.address.trim().to_string(),
        })
    }

    /// Render a single labelled line for the form widget.
    pub(crate) fn build_line(&self, field: FormField, focused: bool) -> Line<'static> {
        let value = self.value(field);
        let is_active = focused && self.active == field;

        let display = if value.is_empty() {
            if field.required() {
                "<required>".to_string()
            } else {
                "<optional>".to_string()
            }
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{:>8}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Terminal columns a slot occupies, used to place the cursor. Wide
    /// glyphs (CJK, emoji) count as two.
    pub(crate) fn value_width(&self, field: FormField) -> usize {
        Span::raw(self.value(field)).width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, phone: &str, email: &str, address: &str) -> ContactForm {
        ContactForm {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            address: address.into(),
            active: FormField::Name,
        }
    }

    #[test]
    fn typing_goes_to_the_active_field() {
        let mut form = ContactForm::default();
        for ch in "Ann".chars() {
            assert!(form.push_char(ch));
        }
        form.next_field();
        for ch in "42".chars() {
            form.push_char(ch);
        }
        form.backspace();

        assert_eq!(form.name, "Ann");
        assert_eq!(form.phone, "4");
        assert_eq!(form.active, FormField::Phone);
    }

    #[test]
    fn control_characters_are_rejected() {
        let mut form = ContactForm::default();
        assert!(!form.push_char('\n'));
        assert!(!form.push_char('\t'));
        assert!(form.name.is_empty());
    }

    #[test]
    fn focus_wraps_in_both_directions() {
        let mut form = ContactForm::default();
        form.previous_field();
        assert_eq!(form.active, FormField::Address);
        form.next_field();
        assert_eq!(form.active, FormField::Name);
        form.next_field();
        form.next_field();
        assert_eq!(form.active, FormField::Email);
    }

    #[test]
    fn parse_trims_every_field() {
        let draft = form("  Alice ", " 555-1000 ", " a@x.io ", "  ").parse_inputs().unwrap();
        assert_eq!(
            draft,
            ContactDraft {
                name: "Alice".into(),
                phone: "555-1000".into(),
                email: "a@x.io".into(),
                address: String::new(),
            }
        );
    }

    #[test]
    fn parse_requires_name_and_phone() {
        assert_eq!(
            form("", "555-2000", "", "").parse_inputs(),
            Err(Warning::MissingRequired)
        );
        assert_eq!(
            form("Bob", "   ", "b@x.io", "").parse_inputs(),
            Err(Warning::MissingRequired)
        );
    }

    #[test]
    fn fill_from_copies_all_four_values() {
        let contact = Contact {
            id: 7,
            name: "Dana".into(),
            phone: "1".into(),
            email: "d@x.io".into(),
            address: "Pier 9".into(),
        };
        let mut form = ContactForm::default();
        form.focus(FormField::Email);
        form.fill_from(&contact);

        assert_eq!(form.value(FormField::Name), "Dana");
        assert_eq!(form.value(FormField::Address), "Pier 9");
        assert_eq!(form.active, FormField::Email);

        form.clear();
        assert_eq!(form, ContactForm::default());
    }

    #[test]
    fn value_width_counts_terminal_columns() {
        let mut form = ContactForm::default();
        form.set(FormField::Name, "山田");
        form.set(FormField::Phone, "555");
        assert_eq!(form.value_width(FormField::Name), 4);
        assert_eq!(form.value_width(FormField::Phone), 3);
        assert_eq!(form.value_width(FormField::Email), 0);
    }
}
