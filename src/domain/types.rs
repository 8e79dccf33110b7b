//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (positive identifiers, known entity
//! kinds, normalized emails and phone numbers) so that once a value reaches the
//! domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use phonenumber::{Mode, country, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Phone number did not meet expected format.
    #[error("invalid phone number")]
    InvalidPhone,
    /// Entity kind slug is not part of the catalogue.
    #[error("unknown entity kind: {0}")]
    UnknownEntityKind(String),
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Normalizes and validates an email string.
pub fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Normalizes a phone number string to E.164 format.
///
/// Numbers without an international prefix are read as Vietnamese numbers.
pub fn normalize_phone_to_e164(value: &str) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    let parsed = parse(Some(country::Id::VN), trimmed)
        .map_err(|_| TypeConstraintError::InvalidPhone)?;
    if !phonenumber::is_valid(&parsed) {
        return Err(TypeConstraintError::InvalidPhone);
    }
    Ok(parsed.format().mode(Mode::E164).to_string())
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(RecordId, "Unique identifier of a stored entity record.");

/// Entity types managed through the administration pages.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Branch,
    Facility,
    Room,
    Staff,
    Student,
    Benefit,
    Schedule,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Branch,
        EntityKind::Facility,
        EntityKind::Room,
        EntityKind::Staff,
        EntityKind::Student,
        EntityKind::Benefit,
        EntityKind::Schedule,
    ];

    /// URL and storage slug.
    pub const fn slug(self) -> &'static str {
        match self {
            EntityKind::Branch => "branches",
            EntityKind::Facility => "facilities",
            EntityKind::Room => "rooms",
            EntityKind::Staff => "staff",
            EntityKind::Student => "students",
            EntityKind::Benefit => "benefits",
            EntityKind::Schedule => "schedules",
        }
    }

    /// Page heading shown above the management table.
    pub const fn title(self) -> &'static str {
        match self {
            EntityKind::Branch => "Chi nhánh",
            EntityKind::Facility => "Cơ sở",
            EntityKind::Room => "Phòng học",
            EntityKind::Staff => "Nhân viên",
            EntityKind::Student => "Học sinh",
            EntityKind::Benefit => "Ưu đãi",
            EntityKind::Schedule => "Lịch học",
        }
    }

    /// Record field holding the human readable name of an entity.
    pub const fn name_field(self) -> &'static str {
        match self {
            EntityKind::Staff | EntityKind::Student => "full_name",
            EntityKind::Schedule => "title",
            _ => "name",
        }
    }

    /// Whether the name identifies the record within its kind.
    ///
    /// Must agree with the partial `idx_records_unique_name` index.
    pub const fn has_unique_name(self) -> bool {
        matches!(
            self,
            EntityKind::Branch | EntityKind::Facility | EntityKind::Room | EntityKind::Benefit
        )
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for EntityKind {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| TypeConstraintError::UnknownEntityKind(s.to_string()))
    }
}

/// Roles recognised by the dashboards and management pages.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Parent,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Parent => "parent",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "parent" => Ok(Role::Parent),
            other => Err(TypeConstraintError::InvalidValue(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_rejects_non_positive() {
        assert_eq!(RecordId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(RecordId::new(7).map(RecordId::get), Ok(7));
    }

    #[test]
    fn entity_kind_round_trips_through_slug() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.slug().parse::<EntityKind>(), Ok(kind));
        }
        assert!(matches!(
            "teachers".parse::<EntityKind>(),
            Err(TypeConstraintError::UnknownEntityKind(_))
        ));
    }

    #[test]
    fn unique_name_kinds_match_the_migration() {
        let sql = include_str!("../../migrations/2024-09-01-000000_create_records/up.sql");
        let (_, clause) = sql.split_once("WHERE kind IN").unwrap();
        for kind in EntityKind::ALL {
            let quoted = format!("'{}'", kind.slug());
            assert_eq!(clause.contains(&quoted), kind.has_unique_name(), "{kind}");
        }
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Parent@Example.COM "),
            Ok("parent@example.com".to_string())
        );
        assert_eq!(
            normalize_email("not-an-email"),
            Err(TypeConstraintError::InvalidEmail)
        );
    }

    #[test]
    fn local_phone_numbers_are_normalized() {
        assert_eq!(
            normalize_phone_to_e164("0912 345 678"),
            Ok("+84912345678".to_string())
        );
        assert_eq!(
            normalize_phone_to_e164("12"),
            Err(TypeConstraintError::InvalidPhone)
        );
        assert_eq!(
            normalize_phone_to_e164("   "),
            Err(TypeConstraintError::EmptyString)
        );
    }
}
