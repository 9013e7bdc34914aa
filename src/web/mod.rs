use std::{convert::Infallible, sync::Arc};

use filters::api_filters;
use warp::{http::Method, reject::Rejection, Filter};

use crate::core::{settings::Settings, store::ParticipantStore};

pub mod filters;
pub mod handlers;

pub const DEFAULT_WEB_PORT: u16 = 8320;

async fn handle_rejection(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, body) = if let Some(err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        log::error!("{}", err);
        (
            warp::http::StatusCode::BAD_REQUEST,
            warp::reply::json(&err.to_string()),
        )
    } else if let Some(err) = err.find::<warp::reject::MethodNotAllowed>() {
        log::error!("Method Not Allowed: {}", err);
        (
            warp::http::StatusCode::METHOD_NOT_ALLOWED,
            warp::reply::json(&serde_json::json!({})),
        )
    } else if let Some(err) = err.find::<warp::reject::InvalidQuery>() {
        log::error!("Invalid Query: {}", err);
        (
            warp::http::StatusCode::BAD_REQUEST,
            warp::reply::json(&err.to_string()),
        )
    } else if err.is_not_found() {
        (
            warp::http::StatusCode::NOT_FOUND,
            warp::reply::json(&"Not Found".to_string()),
        )
    } else {
        log::error!("Unhandled Rejection: {:?}", err);
        (
            warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            warp::reply::json(&"Internal Server Error".to_string()),
        )
    };

    Ok(warp::reply::with_status(body, code))
}

pub async fn run_http_server(
    store: Arc<ParticipantStore>,
    settings: Arc<Settings>,
) -> anyhow::Result<()> {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec![
            "User-Agent",
            "Sec-Fetch-Mode",
            "Referer",
            "Origin",
            "Content-Type",
            "Access-Control-Allow-Origin",
            "Access-Control-Request-Method",
            "Access-Control-Request-Headers",
            "Access-Control-Allow-Headers",
        ])
        .allow_methods(&[
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    let routes = api_filters(store, settings.clone()).recover(handle_rejection);

    warp::serve(routes.with(cors))
        .run(([0, 0, 0, 0], settings.web_port.unwrap_or(DEFAULT_WEB_PORT)))
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::participant::NewParticipant, web::handlers::Credentials};

    /// State backed by an unconfigured store, which fails every store
    /// operation without any network traffic.
    fn test_state(admin_password: Option<&str>) -> (Arc<ParticipantStore>, Arc<Settings>) {
        let store = Arc::new(ParticipantStore::new(None).unwrap());
        let settings = Arc::new(Settings {
            store_url: None,
            web_port: None,
            admin_password: admin_password.map(str::to_string),
        });
        (store, settings)
    }

    #[tokio::test]
    async fn test_draw_rejects_other_methods() {
        let (store, settings) = test_state(None);
        let routes = api_filters(store, settings).recover(handle_rejection);

        for method in ["GET", "PUT", "DELETE"] {
            let resp = warp::test::request()
                .method(method)
                .path("/draw?count=2")
                .reply(&routes)
                .await;

            assert_eq!(resp.status(), 405);
            assert_eq!(resp.body(), "{}");
        }
    }

    #[tokio::test]
    async fn test_unconfigured_store_is_unavailable() {
        let (store, settings) = test_state(None);
        let routes = api_filters(store, settings).recover(handle_rejection);

        let resp = warp::test::request()
            .method("POST")
            .path("/draw")
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), 503);

        let resp = warp::test::request()
            .method("GET")
            .path("/participants")
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), 503);

        let resp = warp::test::request()
            .method("DELETE")
            .path("/participants/-NxAb12")
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), 503);
    }

    #[tokio::test]
    async fn test_invalid_registration() {
        let (store, settings) = test_state(None);
        let routes = api_filters(store, settings).recover(handle_rejection);

        let resp = warp::test::request()
            .method("POST")
            .path("/participants")
            .json(&NewParticipant {
                name: "Joe".to_string(),
                email: "not-an-email".to_string(),
            })
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), 400);
        assert_eq!(resp.body(), "Invalid email address");
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (store, settings) = test_state(Some("hunter2"));
        let routes = api_filters(store, settings).recover(handle_rejection);

        let resp = warp::test::request()
            .method("POST")
            .path("/authenticate")
            .json(&Credentials {
                password: "hunter2".to_string(),
            })
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.body(), "{}");

        let resp = warp::test::request()
            .method("POST")
            .path("/authenticate")
            .json(&Credentials {
                password: "wrong".to_string(),
            })
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), 401);

        // With no password configured, nothing authenticates.
        let (store, settings) = test_state(None);
        let unconfigured = api_filters(store, settings).recover(handle_rejection);
        let resp = warp::test::request()
            .method("POST")
            .path("/authenticate")
            .json(&Credentials {
                password: "".to_string(),
            })
            .reply(&unconfigured)
            .await;
        assert_eq!(resp.status(), 401);
    }
}
