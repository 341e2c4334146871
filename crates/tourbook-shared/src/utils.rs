//! Utility functions

/// Masks the local part of an email for log lines.
pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let keep = local.chars().take(if local.chars().count() <= 2 { 1 } else { 2 }).collect::<String>();
        format!("{}***{}", keep, domain)
    } else {
        "***".to_string()
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
