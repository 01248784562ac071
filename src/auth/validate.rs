/// Validate a display name: 1-100 chars after trimming.
pub fn validate_name(name: &str) -> Option<String> {
    validate_required(name, "Name", 100)
}

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Some("Email must be a valid address (contain '@' and '.')".to_string());
    }
    None
}

/// Validate a password: min 8 chars.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// Validate a required text field with a max length in characters.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional 1-5 rating.
pub fn validate_rating(rating: Option<i16>) -> Option<String> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => Some("Rating must be between 1 and 5".to_string()),
        _ => None,
    }
}

/// Trim tags, drop empty ones and duplicates; first occurrence wins.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_counts_characters_not_bytes() {
        let title: String = "é".repeat(200);
        assert!(validate_required(&title, "Title", 200).is_none());
        let title: String = "é".repeat(201);
        assert_eq!(
            validate_required(&title, "Title", 200).as_deref(),
            Some("Title must be at most 200 characters")
        );
    }

    #[test]
    fn blank_is_missing() {
        assert_eq!(validate_required("   ", "Description", 10).as_deref(), Some("Description is required"));
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(None).is_none());
        assert!(validate_rating(Some(1)).is_none());
        assert!(validate_rating(Some(5)).is_none());
        assert!(validate_rating(Some(0)).is_some());
        assert!(validate_rating(Some(6)).is_some());
    }

    #[test]
    fn tags_are_a_set() {
        let tags = vec![" ui ".to_string(), "".to_string(), "ui".to_string(), "theme".to_string()];
        assert_eq!(normalize_tags(&tags), vec!["ui".to_string(), "theme".to_string()]);
    }

    #[test]
    fn credentials() {
        assert!(validate_email("founder@startup.io").is_none());
        assert!(validate_email("nope").is_some());
        assert!(validate_password("short").is_some());
        assert!(validate_password("long enough").is_none());
    }
}
