// ABOUTME: Transaction failure classification.
// ABOUTME: Revert payloads are reduced to a short message when one can be recovered.

/// Why a tracked transaction did not confirm.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TxError {
    #[error("Transaction rejected in wallet")]
    Rejected,

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    #[error("{0}")]
    Reverted(String),

    #[error("Receipt unavailable: {0}")]
    Receipt(String),
}

/// Extract the human part of a revert message.
///
/// Handles the reason-string and custom-error shapes RPC nodes and clients
/// produce; anything else comes back as its first line.
pub fn short_revert_message(raw: &str) -> String {
    let raw = raw.trim();

    if let Some(reason) = between(raw, "reverted with reason string '", "'") {
        return reason.to_string();
    }

    if let Some(name) = between(raw, "reverted with custom error '", "'") {
        return custom_error_name(name).unwrap_or(name).to_string();
    }

    if let Some(idx) = raw.find("execution reverted: ") {
        let rest = &raw[idx + "execution reverted: ".len()..];
        let rest = rest.lines().next().unwrap_or(rest);
        let rest = rest.trim_matches(|c| c == '"' || c == ' ');
        return custom_error_name(rest).unwrap_or(rest).to_string();
    }

    let first_line = raw.lines().next().unwrap_or(raw).trim();
    if let Some(name) = custom_error_name(first_line) {
        return name.to_string();
    }

    first_line.to_string()
}

fn between<'a>(haystack: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = haystack.find(start)? + start.len();
    let len = haystack[from..].find(end)?;
    Some(&haystack[from..from + len])
}

/// `NotPermitted(uint64,address)` → `NotPermitted`.
fn custom_error_name(s: &str) -> Option<&str> {
    let paren = s.find('(')?;
    let name = &s[..paren];
    let first = name.chars().next()?;
    let identifier = name.chars().all(|c| c.is_ascii_alphanumeric());
    if first.is_ascii_uppercase() && identifier && s.ends_with(')') {
        Some(name)
    } else {
        None
    }
}
