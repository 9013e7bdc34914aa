use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use time::OffsetDateTime;
use url::Url;

use crate::{
    core::participant::{NewParticipant, Participant},
    error::Error,
};

/// Gateway to the remote participant record store.
///
/// The store is a Json-over-HTTP record service: `participants.json` is the
/// collection resource and `participants/<id>.json` addresses a single
/// record. It offers no transactions; every operation here is a single
/// best-effort request against the latest state.
pub struct ParticipantStore {
    client: Client,
    base: Option<Url>,
}

/// Response shape for a record creation, carrying the generated id.
#[derive(Deserialize)]
struct CreatedRecord {
    name: String,
}

/// Maps transport-level failures to the distinguished unavailability error,
/// leaving HTTP-status failures as plain errors.
fn to_store_error(err: reqwest::Error) -> anyhow::Error {
    if err.is_connect() || err.is_timeout() {
        Error::StoreUnavailable(err.to_string()).into()
    } else {
        Error::Http(err).into()
    }
}

impl ParticipantStore {
    /// Creates a gateway for the given base URL. A missing URL is not fatal;
    /// every operation will fail with an unavailability error until the
    /// service is restarted with one configured.
    pub fn new(base: Option<&str>) -> anyhow::Result<Self> {
        let base = match base {
            Some(url) if url.ends_with('/') => Some(Url::parse(url)?),
            Some(url) => Some(Url::parse(&format!("{}/", url))?),
            None => None,
        };

        Ok(ParticipantStore {
            client: Client::new(),
            base,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base.as_ref().ok_or_else(|| {
            Error::StoreUnavailable("store URL is not configured".to_string())
        })?;

        base.join(path)
            .map_err(|e| Error::StoreUnavailable(e.to_string()))
    }

    /// Fetches the full roster, in store-defined order.
    pub async fn list(&self) -> anyhow::Result<Vec<Participant>> {
        let url = self.endpoint("participants.json")?;

        let records: Option<HashMap<String, Participant>> = self
            .client
            .get(url)
            .send()
            .await
            .map_err(to_store_error)?
            .error_for_status()?
            .json()
            .await?;

        Ok(roster_from_records(records))
    }

    /// Registers a new participant, enforcing email uniqueness against the
    /// current roster, and returns the stored record with its generated id.
    pub async fn create(&self, registration: &NewParticipant) -> anyhow::Result<Participant> {
        registration.validate()?;

        let email = registration.email.trim();
        let roster = self.list().await?;
        if roster.iter().any(|p| p.email.eq_ignore_ascii_case(email)) {
            Err(Error::DuplicateEmail)?;
        }

        let mut participant = Participant {
            id: String::new(),
            name: registration.name.trim().to_string(),
            email: email.to_string(),
            participation_time: OffsetDateTime::now_utc(),
            is_winner: false,
        };

        participant.id = self.insert(&participant).await?;
        log::info!("Registered participant {} ({})", participant.name, participant.id);
        Ok(participant)
    }

    /// Appends a record to the collection without the uniqueness pre-check
    /// and returns the generated id.
    pub async fn insert(&self, participant: &Participant) -> anyhow::Result<String> {
        let url = self.endpoint("participants.json")?;

        let created: CreatedRecord = self
            .client
            .post(url)
            .json(participant)
            .send()
            .await
            .map_err(to_store_error)?
            .error_for_status()?
            .json()
            .await?;

        Ok(created.name)
    }

    /// Best-effort partial update of a single record. The store acknowledges
    /// with an HTTP status only; there is no read-back.
    pub async fn patch(&self, id: &str, fields: &serde_json::Value) -> anyhow::Result<()> {
        let url = self.endpoint(&format!("participants/{}.json", id))?;

        self.client
            .patch(url)
            .json(fields)
            .send()
            .await
            .map_err(to_store_error)?
            .error_for_status()?;

        Ok(())
    }

    /// Flags a drawn participant as a winner. The flag only ever moves from
    /// false to true; a new draw clears the whole collection instead of
    /// resetting flags.
    pub async fn mark_winner(&self, id: &str) -> anyhow::Result<()> {
        self.patch(id, &serde_json::json!({ "isWinner": true })).await
    }

    pub async fn delete_one(&self, id: &str) -> anyhow::Result<()> {
        let url = self.endpoint(&format!("participants/{}.json", id))?;

        self.client
            .delete(url)
            .send()
            .await
            .map_err(to_store_error)?
            .error_for_status()?;

        log::info!("Deleted participant {}", id);
        Ok(())
    }

    /// Clears the whole collection, starting a fresh draw cycle.
    pub async fn delete_all(&self) -> anyhow::Result<()> {
        let url = self.endpoint("participants.json")?;

        self.client
            .delete(url)
            .send()
            .await
            .map_err(to_store_error)?
            .error_for_status()?;

        log::info!("Cleared the participant collection");
        Ok(())
    }
}

/// The collection resource decodes to `null` when empty, otherwise to a map
/// of generated id to record; each record gets its id filled in from its key.
fn roster_from_records(records: Option<HashMap<String, Participant>>) -> Vec<Participant> {
    records
        .unwrap_or_default()
        .into_iter()
        .map(|(id, mut participant)| {
            participant.id = id;
            participant
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_decoding() {
        let payload = r#"{
            "-NxAb12": {
                "name": "Joe",
                "email": "joe@example.com",
                "participationTime": "2024-05-01T18:30:00Z",
                "isWinner": false
            },
            "-NxAb34": {
                "name": "Ann",
                "email": "ann@example.com",
                "participationTime": "2024-05-01T19:00:00Z",
                "isWinner": true
            }
        }"#;

        let records: Option<HashMap<String, Participant>> =
            serde_json::from_str(payload).unwrap();
        let mut roster = roster_from_records(records);
        roster.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].id, "-NxAb12");
        assert_eq!(roster[0].name, "Joe");
        assert!(!roster[0].is_winner);
        assert_eq!(roster[1].id, "-NxAb34");
        assert!(roster[1].is_winner);
    }

    #[test]
    fn test_empty_collection_decodes_as_null() {
        let records: Option<HashMap<String, Participant>> =
            serde_json::from_str("null").unwrap();
        assert!(roster_from_records(records).is_empty());
    }

    #[test]
    fn test_endpoints() {
        let store = ParticipantStore::new(Some("https://records.example.com/draw")).unwrap();
        assert_eq!(
            store.endpoint("participants.json").unwrap().as_str(),
            "https://records.example.com/draw/participants.json"
        );
        assert_eq!(
            store
                .endpoint("participants/-NxAb12.json")
                .unwrap()
                .as_str(),
            "https://records.example.com/draw/participants/-NxAb12.json"
        );
    }

    #[test]
    fn test_unconfigured_store() {
        let store = ParticipantStore::new(None).unwrap();
        assert!(matches!(
            store.endpoint("participants.json"),
            Err(Error::StoreUnavailable(_))
        ));
    }
}
