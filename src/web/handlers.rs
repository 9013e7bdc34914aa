use std::{collections::HashMap, convert::Infallible, sync::Arc};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use warp::http::StatusCode;

use crate::{
    core::{
        draw::{select_winners, DEFAULT_DRAW_COUNT},
        participant::{NewParticipant, Participant},
        settings::Settings,
        store::ParticipantStore,
    },
    error::Error,
};

/// A Json struct for an admin password check
#[derive(Serialize, Deserialize, Debug)]
pub struct Credentials {
    pub password: String,
}

fn error_status(e: &anyhow::Error) -> StatusCode {
    match e.downcast_ref::<Error>() {
        Some(Error::DuplicateEmail) => StatusCode::CONFLICT,
        Some(Error::StoreUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        Some(Error::InvalidRegistration(_)) | Some(Error::DrawTooLarge { .. }) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn to_http_none_or_error(result: anyhow::Result<()>) -> Result<impl warp::Reply, Infallible> {
    match result {
        Ok(_) => Ok(warp::reply::with_status(
            "Success".to_string(),
            StatusCode::OK,
        )),
        Err(e) => {
            log::warn!("{}", e);
            Ok(warp::reply::with_status(e.to_string(), error_status(&e)))
        }
    }
}

pub fn to_http_output<T: Serialize>(
    result: anyhow::Result<T>,
) -> Result<impl warp::Reply, Infallible> {
    match result {
        Ok(data) => Ok(warp::reply::with_status(
            serde_json::to_string::<T>(&data).unwrap(),
            StatusCode::OK,
        )),
        Err(e) => {
            log::warn!("{}", e);
            Ok(warp::reply::with_status(e.to_string(), error_status(&e)))
        }
    }
}

/// Winner count for a draw request. Missing or non-numeric values fall back
/// to the default; negative values select nothing.
pub fn requested_count(args: &HashMap<String, String>) -> usize {
    match args.get("count") {
        Some(raw) => match raw.parse::<i64>() {
            Ok(count) => count.max(0) as usize,
            Err(_) => DEFAULT_DRAW_COUNT,
        },
        None => DEFAULT_DRAW_COUNT,
    }
}

pub async fn list_participants(
    store: Arc<ParticipantStore>,
) -> Result<impl warp::Reply, Infallible> {
    let roster = store.list().await.map(|mut roster| {
        roster.sort_by(|a, b| a.participation_time.cmp(&b.participation_time));
        roster
    });

    to_http_output(roster)
}

pub async fn register_participant(
    registration: NewParticipant,
    store: Arc<ParticipantStore>,
) -> Result<impl warp::Reply, Infallible> {
    to_http_output(store.create(&registration).await)
}

pub async fn delete_participant(
    id: String,
    store: Arc<ParticipantStore>,
) -> Result<impl warp::Reply, Infallible> {
    to_http_none_or_error(store.delete_one(&id).await)
}

/// Draws winners from a fresh roster snapshot and responds with their ids.
///
/// The winner flags are persisted by detached tasks; the response does not
/// wait for them, and a failed patch is only logged. Listing clients pick
/// the flags up on a later poll.
pub async fn draw_winners(
    args: HashMap<String, String>,
    store: Arc<ParticipantStore>,
) -> Result<impl warp::Reply, Infallible> {
    let count = requested_count(&args);

    let roster = match store.list().await {
        Ok(roster) => roster,
        Err(e) => {
            log::warn!("{}", e);
            return Ok(warp::reply::with_status(e.to_string(), error_status(&e)));
        }
    };

    let winners = match select_winners(&roster, count, &mut rand::thread_rng()) {
        Ok(winners) => winners,
        Err(e) => {
            let e = anyhow::Error::from(e);
            log::warn!("{}", e);
            return Ok(warp::reply::with_status(e.to_string(), error_status(&e)));
        }
    };

    log::info!("Drew {} winners from a roster of {}", winners.len(), roster.len());

    for id in &winners {
        let store = store.clone();
        let id = id.clone();
        tokio::spawn(async move {
            if let Err(e) = store.mark_winner(&id).await {
                log::warn!("Failed to persist winner flag for {}: {}", id, e);
            }
        });
    }

    Ok(warp::reply::with_status(
        serde_json::to_string(&winners).unwrap(),
        StatusCode::OK,
    ))
}

pub async fn reset_draw(store: Arc<ParticipantStore>) -> Result<impl warp::Reply, Infallible> {
    to_http_none_or_error(store.delete_all().await)
}

/// Seeds the store with synthetic registrations for rehearsing a draw.
pub async fn mock_participants(
    store: Arc<ParticipantStore>,
) -> Result<impl warp::Reply, Infallible> {
    let seeds: Vec<Participant> = (0..50)
        .map(|i| Participant {
            id: String::new(),
            name: format!("test {} name", i),
            email: format!("test{}@example.com", i),
            participation_time: OffsetDateTime::now_utc(),
            is_winner: false,
        })
        .collect();

    let inserts = futures::future::join_all(seeds.iter().map(|participant| {
        let store = store.clone();
        async move { store.insert(participant).await }
    }))
    .await;

    let result = inserts
        .into_iter()
        .collect::<anyhow::Result<Vec<_>>>()
        .map(|_| ());
    to_http_none_or_error(result)
}

pub async fn authenticate(
    credentials: Credentials,
    settings: Arc<Settings>,
) -> Result<impl warp::Reply, Infallible> {
    let authorized = settings
        .admin_password
        .as_deref()
        .is_some_and(|password| password == credentials.password);

    let code = if authorized {
        StatusCode::OK
    } else {
        log::warn!("Rejected an admin password check");
        StatusCode::UNAUTHORIZED
    };

    Ok(warp::reply::with_status("{}".to_string(), code))
}
