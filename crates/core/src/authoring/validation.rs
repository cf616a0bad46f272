//! Name and definition checks applied before statements are emitted.

use once_cell::sync::Lazy;
use pgsafe_domain::constants::MAX_IDENTIFIER_LENGTH;
use pgsafe_domain::AuthoringError;
use regex::Regex;

static FOREIGN_KEY_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    // Inline `REFERENCES` and table-level `FOREIGN KEY`.
    Regex::new(r"(?i)\b(?:foreign\s+key|references)\b")
        .expect("FOREIGN_KEY_CLAUSE should compile - this is a bug")
});

/// Check a single, unqualified identifier (index, constraint, column).
///
/// # Errors
/// [`AuthoringError::EmptyIdentifier`] or [`AuthoringError::IdentifierTooLong`].
pub fn validate_identifier(kind: &'static str, name: &str) -> Result<(), AuthoringError> {
    if name.trim().is_empty() {
        return Err(AuthoringError::EmptyIdentifier { kind });
    }

    let length = name.len();
    if length > MAX_IDENTIFIER_LENGTH {
        return Err(AuthoringError::IdentifierTooLong {
            kind,
            name: name.to_owned(),
            length,
            max: MAX_IDENTIFIER_LENGTH,
        });
    }

    Ok(())
}

/// Check a possibly schema-qualified name such as `billing.invoices`.
///
/// # Errors
/// Same as [`validate_identifier`], applied to every dotted part.
pub fn validate_qualified(kind: &'static str, name: &str) -> Result<(), AuthoringError> {
    if name.trim().is_empty() {
        return Err(AuthoringError::EmptyIdentifier { kind });
    }

    name.split('.').try_for_each(|part| validate_identifier(kind, part))
}

/// Index names are limited to 63 bytes; PostgreSQL would otherwise truncate
/// them silently and later `DROP INDEX` statements would miss.
///
/// # Errors
/// See [`validate_identifier`].
pub fn validate_index_name(name: &str) -> Result<(), AuthoringError> {
    validate_identifier("index", name)
}

/// Reject table definitions that declare foreign keys inline.
///
/// # Errors
/// [`AuthoringError::InlineForeignKey`] when any definition contains
/// `FOREIGN KEY` or `REFERENCES`, in any case and with any whitespace.
pub fn ensure_no_inline_foreign_key<S: AsRef<str>>(
    table: &str,
    definitions: &[S],
) -> Result<(), AuthoringError> {
    if definitions.iter().any(|definition| FOREIGN_KEY_CLAUSE.is_match(definition.as_ref())) {
        return Err(AuthoringError::InlineForeignKey { table: table.to_owned() });
    }

    Ok(())
}

/// Unqualified part of a dotted name.
pub(crate) fn base_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
