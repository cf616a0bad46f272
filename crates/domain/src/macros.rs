//! Macro for implementing Display and FromStr for string-backed enums
//!
//! Plan files and configuration refer to parameter types and failure classes
//! by name. This macro gives those enums a single lowercase spelling for both
//! directions.
//!
//! # Example
//!
//! ```rust
//! use pgsafe_domain::impl_domain_str_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     Expand,
//!     Contract,
//! }
//!
//! impl_domain_str_conversions!(Phase {
//!     Expand => "expand",
//!     Contract => "contract",
//! });
//! ```

/// Implements Display and FromStr traits for string-backed enums
///
/// This macro generates:
/// - Display trait: converts enum variants to their lowercase names
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// Parsing failures return a message naming the enum and the rejected input.
#[macro_export]
macro_rules! impl_domain_str_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
