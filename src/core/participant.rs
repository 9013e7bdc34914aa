use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;

/// Longest accepted email address (RFC 5321 forward-path limit).
pub const EMAIL_MAX_LENGTH: usize = 254;

/// A struct representing a registered participant.
///
/// The store keys records by an opaque generated id, so the id is not part
/// of the stored record itself; it is filled in from the record key when
/// listing and left off the wire when creating.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Unique participant ID, assigned by the store on creation
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// The participant's display name
    pub name: String,

    /// The participant's email, unique across the roster
    pub email: String,

    /// Registration timestamp, used only for sort ordering
    #[serde(with = "time::serde::rfc3339")]
    pub participation_time: OffsetDateTime,

    /// Whether this participant has been drawn as a winner
    pub is_winner: bool,
}

/// A Json struct for an incoming registration
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewParticipant {
    pub name: String,
    pub email: String,
}

/// Practical email check: dotted local part, hyphen-safe domain labels,
/// 2+ letter TLD. Deliberately not RFC-exhaustive.
fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*\.[a-zA-Z]{2,}$",
        )
        .expect("email pattern must compile")
    })
}

impl NewParticipant {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidRegistration("Name is required".to_string()));
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err(Error::InvalidRegistration("Email is required".to_string()));
        }
        if email.len() > EMAIL_MAX_LENGTH {
            return Err(Error::InvalidRegistration("Email is too long".to_string()));
        }
        if !email_regex().is_match(email) {
            return Err(Error::InvalidRegistration(
                "Invalid email address".to_string(),
            ));
        }

        Ok(())
    }
}
