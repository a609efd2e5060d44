//! Utility functions

/// Masks the local part of an email for log output.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let keep = if local.chars().count() <= 2 { 1 } else { 2 };
            let visible: String = local.chars().take(keep).collect();
            format!("{}***@{}", visible, domain)
        }
        _ => "***".to_string(),
    }
}

/// Returns the first candidate that is present and non-empty.
pub fn first_non_empty<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates.into_iter().flatten().find(|value| !value.is_empty())
}
