use reqwest::StatusCode;

/// Outcomes of a single provider call that did not yield data.
///
/// None of these are anomalies: [`crate::WeatherService`] absorbs every
/// variant into an absent snapshot or a neutral forecast.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("location not found")]
    NotFound,

    #[error("{endpoint} request failed with status {status}: {body}")]
    Unavailable {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed {endpoint} response: {source}")]
    Malformed {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound)
    }
}
