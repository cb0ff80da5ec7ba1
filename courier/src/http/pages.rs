//! HTML served by the front-end

use std::{fmt::Write as _, sync::Arc};

use courier_common::EmailSubmission;

pub const INDEX: &str = include_str!("../../assets/index.html");
pub const NOT_FOUND: &str = include_str!("../../assets/not_found.html");
const STATUS: &str = include_str!("../../assets/status.html");
const ROWS_MARKER: &str = "<!-- rows -->";

/// Table of pending submissions, numbered from 1 in queue order.
pub fn status(pending: &[Arc<EmailSubmission>]) -> String {
    let mut rows = String::new();

    if pending.is_empty() {
        rows.push_str("<tr> <td colspan='6'>No pending emails!</td></tr>");
    }

    for (index, submission) in pending.iter().enumerate() {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            index + 1,
            escape(submission.source()),
            escape(submission.destination()),
            escape(submission.subject()),
            submission.submitted_time(),
            submission.send_time(),
        );
    }

    STATUS.replace(ROWS_MARKER, &rows)
}

/// Result of a submission with a link to the status page.
pub fn compose_result(message: &str) -> String {
    format!(
        "<html> <body> <h2>{}</h2> <p>\
        <h3> To see the list of pending emails </h3>\
        <a href='status'>Click Here</a> </p></body> </html>",
        escape(message)
    )
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}
