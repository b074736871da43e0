//! Tenant naming rules.

use crate::error::CoreError;

pub const MAX_TENANT_NAME_LENGTH: usize = 120;
pub const MAX_SLUG_LENGTH: usize = 60;

/// Derive a URL-safe slug from a company name.
///
/// Lower-cases ASCII letters and digits, collapses every other run of
/// characters into a single `-`, and trims dashes from both ends.
///
/// ```
/// use solarfy_core::tenant::slugify;
/// assert_eq!(slugify("Sunny Days Solar, LLC"), "sunny-days-solar-llc");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Append a numeric suffix to disambiguate a taken slug.
pub fn slug_with_suffix(base: &str, n: u32) -> String {
    let suffix = format!("-{n}");
    let keep = MAX_SLUG_LENGTH.saturating_sub(suffix.len()).min(base.len());
    format!("{}{suffix}", base[..keep].trim_end_matches('-'))
}

pub fn validate_tenant_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Company name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TENANT_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Company name exceeds {MAX_TENANT_NAME_LENGTH} characters"
        )));
    }
    if slugify(trimmed).is_empty() {
        return Err(CoreError::Validation(
            "Company name must contain at least one letter or digit".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("  Bright -- Future  Solar! "), "bright-future-solar");
        assert_eq!(slugify("Énergie Solaire"), "nergie-solaire");
    }

    #[test]
    fn slugify_truncates_long_names() {
        let slug = slugify(&"ab ".repeat(40));
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn suffix_keeps_slug_within_limit() {
        assert_eq!(slug_with_suffix("acme-solar", 2), "acme-solar-2");
        let long = "a".repeat(MAX_SLUG_LENGTH);
        assert_eq!(slug_with_suffix(&long, 12).len(), MAX_SLUG_LENGTH);
    }

    #[test]
    fn tenant_name_needs_alphanumerics() {
        assert!(validate_tenant_name("Acme Solar").is_ok());
        assert!(validate_tenant_name("!!!").is_err());
        assert!(validate_tenant_name("").is_err());
    }
}
