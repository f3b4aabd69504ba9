use std::sync::Arc;

use axum::{
    Form, Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
};
use serde::Deserialize;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use weatherdash_core::{LocationQuery, WeatherService};

use crate::templates::{FormValues, render_page};

const NOT_FOUND_NOTICE: &str =
    "Location not found or weather unavailable. Check the spelling and try again.";

struct AppState {
    service: WeatherService,
}

#[derive(Debug, Deserialize)]
pub struct LocationForm {
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    country: String,
}

impl LocationForm {
    fn to_query(&self) -> LocationQuery {
        let optional = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        LocationQuery {
            city: self.city.trim().to_string(),
            state: optional(&self.state),
            country: optional(&self.country),
        }
    }
}

pub fn app(service: WeatherService) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/", get(index).post(lookup))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

async fn index() -> impl IntoResponse {
    Html(render_page(&FormValues::default(), None, None))
}

async fn lookup(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LocationForm>,
) -> impl IntoResponse {
    let query = form.to_query();
    let snapshot = state.service.lookup(&query).await;

    let values = FormValues {
        city: &form.city,
        state: &form.state,
        country: &form.country,
    };
    match snapshot {
        Some(snapshot) => {
            info!(city = %query.city, "rendered weather");
            Html(render_page(&values, Some(&snapshot), None))
        }
        None => Html(render_page(&values, None, Some(NOT_FOUND_NOTICE))),
    }
}

async fn healthz() -> &'static str {
    "ok"
}
