//! Identifier validation for table and field names

use regex::Regex;

/// Longest identifier accepted for a table or field name
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Validate a table or field name
///
/// Rules:
/// - Must start with a letter or underscore
/// - Can only contain letters, numbers, and underscores
/// - At most 64 characters
///
/// # Example
/// ```
/// use table_relations::sanitize::validate_identifier;
///
/// assert!(validate_identifier("tl_metamodel_dca").is_ok());
/// assert!(validate_identifier("mm_Products").is_ok());
/// assert!(validate_identifier("mm-products").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(format!(
            "Identifier '{}' is longer than {} characters.",
            name, MAX_IDENTIFIER_LENGTH
        ));
    }

    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(|e| e.to_string())?;
    if !re.is_match(name) {
        return Err(format!(
            "Identifier '{}' is invalid. Must start with a letter or underscore and contain only letters, numbers, and underscores.",
            name
        ));
    }

    Ok(())
}
