use serde::{Deserialize, Serialize};

/// A CLI user. Identified by email; saving again with the same email
/// updates the mutable fields instead of creating a second row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub school_year: Option<String>,
    /// Opt-in to the public same-flight match aggregate. Only mutable by
    /// explicit re-entry on a later run.
    pub consented: bool,
}

/// Accepts `local@domain.tld` with no whitespace: a non-empty local part,
/// exactly one '@', and a dot inside the domain.
pub fn is_valid_email(input: &str) -> bool {
    let s = input.trim();
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = s.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
