use std::{collections::HashMap, convert::Infallible, sync::Arc};

use warp::{reject::Rejection, Filter};

use crate::core::{settings::Settings, store::ParticipantStore};

use super::handlers::{
    authenticate, delete_participant, draw_winners, list_participants, mock_participants,
    register_participant, reset_draw,
};

pub fn with_store(
    store: Arc<ParticipantStore>,
) -> impl Filter<Extract = (Arc<ParticipantStore>,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

pub fn with_settings(
    settings: Arc<Settings>,
) -> impl Filter<Extract = (Arc<Settings>,), Error = Infallible> + Clone {
    warp::any().map(move || settings.clone())
}

fn participant_filters(
    store: Arc<ParticipantStore>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Rejection> + Clone {
    let list_participants = warp::path!("participants")
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(list_participants);

    let register_participant = warp::path!("participants")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and_then(register_participant);

    let delete_participant = warp::path!("participants" / String)
        .and(warp::delete())
        .and(with_store(store.clone()))
        .and_then(delete_participant);

    list_participants
        .or(register_participant)
        .or(delete_participant)
}

fn draw_filters(
    store: Arc<ParticipantStore>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Rejection> + Clone {
    warp::path!("draw")
        .and(warp::post())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_store(store))
        .and_then(draw_winners)
}

fn admin_filters(
    store: Arc<ParticipantStore>,
    settings: Arc<Settings>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Rejection> + Clone {
    let reset_draw = warp::path!("admin" / "new-draw")
        .and(warp::post())
        .and(with_store(store.clone()))
        .and_then(reset_draw);

    let mock_participants = warp::path!("admin" / "mock-participants")
        .and(warp::post())
        .and(with_store(store))
        .and_then(mock_participants);

    let authenticate = warp::path!("authenticate")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_settings(settings))
        .and_then(authenticate);

    reset_draw.or(mock_participants).or(authenticate)
}

pub fn api_filters(
    store: Arc<ParticipantStore>,
    settings: Arc<Settings>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Rejection> + Clone {
    participant_filters(store.clone())
        .or(draw_filters(store.clone()))
        .or(admin_filters(store, settings))
}
