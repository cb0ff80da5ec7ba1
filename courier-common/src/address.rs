//! Mailbox grammar accepted for submissions
//!
//! Narrower than RFC 5321: submissions are typed into a web form
//! and only plain dot-atom mailboxes with an alphabetic top-level label are
//! accepted.
//!
//! ```text
//! Mailbox     = Local-part "@" Domain
//! Local-part  = First-atom *("." Atom)
//! First-atom  = 1*( ALPHA / DIGIT / "_" / "-" / "+" )
//! Atom        = 1*( ALPHA / DIGIT / "_" / "-" )
//! Domain      = Head-label *("." Label) "." Top-label
//! Head-label  = 1*( ALPHA / DIGIT / "-" )
//! Label       = 1*( ALPHA / DIGIT )
//! Top-label   = 2*ALPHA
//! ```

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AddressError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Empty address")]
    Empty,

    #[error("Missing '@' separator in mailbox")]
    MissingAtSign,

    #[error("Invalid local-part: {0}")]
    InvalidLocalPart(String),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

/// A mailbox borrowed from the address it was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mailbox<'a> {
    pub local_part: &'a str,
    pub domain: &'a str,
}

impl std::fmt::Display for Mailbox<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

/// Parse `input` as a mailbox.
///
/// # Errors
///
/// Returns an `AddressError` describing the first part of the address that
/// does not match the grammar.
pub fn parse_mailbox(input: &str) -> Result<Mailbox<'_>> {
    if input.is_empty() {
        return Err(AddressError::Empty);
    }

    let (local_part, domain) = input.split_once('@').ok_or(AddressError::MissingAtSign)?;

    check_local_part(local_part)?;
    check_domain(domain)?;

    Ok(Mailbox { local_part, domain })
}

/// Returns `true` when `input` matches the mailbox grammar.
pub fn is_valid(input: &str) -> bool {
    parse_mailbox(input).is_ok()
}

/// Everything after the first `@`, or the empty string if there is none.
pub fn domain_of(address: &str) -> &str {
    address.split_once('@').map_or("", |(_, domain)| domain)
}

const fn is_atom_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

fn check_local_part(input: &str) -> Result<()> {
    for (index, atom) in input.split('.').enumerate() {
        if atom.is_empty() {
            return Err(AddressError::InvalidLocalPart(
                "Empty atom in local-part".to_string(),
            ));
        }

        // '+' is only allowed before the first dot
        let allowed = |ch: char| is_atom_char(ch) || (index == 0 && ch == '+');
        if let Some(ch) = atom.chars().find(|&ch| !allowed(ch)) {
            return Err(AddressError::InvalidLocalPart(format!(
                "Invalid character '{ch}' in atom"
            )));
        }
    }

    Ok(())
}

fn check_domain(input: &str) -> Result<()> {
    let labels = input.split('.').collect::<Vec<_>>();

    let [head, middle @ .., top] = labels.as_slice() else {
        return Err(AddressError::InvalidDomain(
            "Domain needs at least two labels".to_string(),
        ));
    };

    if head.is_empty() || !head.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-') {
        return Err(AddressError::InvalidDomain(format!(
            "Invalid first label '{head}'"
        )));
    }

    if let Some(label) = middle
        .iter()
        .find(|label| label.is_empty() || !label.chars().all(|ch| ch.is_ascii_alphanumeric()))
    {
        return Err(AddressError::InvalidDomain(format!("Invalid label '{label}'")));
    }

    if top.len() < 2 || !top.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err(AddressError::InvalidDomain(format!(
            "Invalid top-level label '{top}'"
        )));
    }

    Ok(())
}
