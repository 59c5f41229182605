use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use url::form_urlencoded::byte_serialize;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Build a `mailto:` URI for the system mail handler, or `None` when there is
/// no address to write to. Both sides of the last `@` are percent-encoded so
/// `?`, `&`, `#` or spaces in the stored text cannot add headers to the URI.
pub(crate) fn mailto_uri(email: &str) -> Option<String> {
    let email = email.trim();
    if email.is_empty() {
        return None;
    }
    let encoded = match email.rsplit_once('@') {
        Some((local, domain)) => {
            format!("{}@{}", encode_mailto_part(local), encode_mailto_part(domain))
        }
        None => encode_mailto_part(email),
    };
    Some(format!("mailto:{encoded}"))
}

/// `form_urlencoded` writes spaces as `+`, which a mailto address reads
/// literally, so those become `%20`. A literal `+` is already `%2B`.
fn encode_mailto_part(part: &str) -> String {
    byte_serialize(part.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
