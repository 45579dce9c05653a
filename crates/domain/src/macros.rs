//! Macro for implementing Display and FromStr for label enums
//!
//! Wire-level enums (user types, login phases) are rendered and parsed
//! through one mapping so the two directions cannot drift apart.
//!
//! # Example
//!
//! ```rust
//! use bookline_domain::impl_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Silent,
//!     Popup,
//! }
//!
//! impl_label_conversions!(Channel {
//!     Silent => "silent",
//!     Popup => "popup",
//! });
//! ```

/// Implements Display and FromStr traits for label enums
///
/// - Display writes the mapped label verbatim
/// - FromStr lowercases the input before matching, so labels must be
///   lowercase
#[macro_export]
macro_rules! impl_label_conversions {
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
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Channel {
        Silent,
        Popup,
    }

    impl_label_conversions!(Channel {
        Silent => "silent",
        Popup => "popup",
    });

    #[test]
    fn test_display_uses_label() {
        assert_eq!(Channel::Silent.to_string(), "silent");
        assert_eq!(Channel::Popup.to_string(), "popup");
    }

    #[test]
    fn test_fromstr_is_case_insensitive() {
        assert_eq!(Channel::from_str("POPUP").unwrap(), Channel::Popup);
        assert_eq!(Channel::from_str("Silent").unwrap(), Channel::Silent);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = Channel::from_str("redirect");
        assert!(result.unwrap_err().contains("Invalid Channel: redirect"));
    }
}
