//! # Domain Models
//!
//! These structs represent the core entities of roam.
//! Internal record ids are UUID v7 for time-ordered, globally unique identification.

use uuid::Uuid;

use crate::error::{DomainError, Result};

/// Returned when a string does not name a member of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value {0:?}")]
pub struct UnknownVariant(pub String);

/// Declares a closed enum whose members serialize as fixed strings.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $value:literal),+ $(,)? }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::UnknownVariant;

            fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
                match raw {
                    $($value => Ok($name::$variant),)+
                    other => Err($crate::models::UnknownVariant(other.to_string())),
                }
            }
        }
    };
}

pub(crate) use closed_enum;

mod email;
mod identity;
mod insight;
mod post;
mod trivia;
mod user;

pub use email::*;
pub use identity::*;
pub use insight::*;
pub use post::*;
pub use trivia::*;
pub use user::*;

/// Parses an internal record id. Anything that is not a UUID is rejected with `message`.
pub fn parse_record_id(raw: &str, message: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| DomainError::invalid(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_must_be_uuids() {
        let id = Uuid::now_v7();
        assert_eq!(parse_record_id(&id.to_string(), "bad").unwrap(), id);
        assert_eq!(
            parse_record_id("65a1f0c2e4b0a1b2c3d4e5f6", "Invalid post ID format").unwrap_err(),
            DomainError::InvalidArgument("Invalid post ID format".into())
        );
    }
}
