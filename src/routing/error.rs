use thiserror::Error;

/// Why a route could not be computed. Absorbed by the view: logged, cached, not retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RouteError {
    #[error("Routing request failed: {0}")]
    Http(String),

    #[error("Routing provider answered HTTP {0}")]
    Status(u16),

    #[error("Routing response could not be decoded: {0}")]
    Decode(String),

    #[error("Routing provider returned no route")]
    Empty,

    #[error("Routing misconfigured: {0}")]
    Config(String),
}

impl From<reqwest::Error> for RouteError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => RouteError::Status(status.as_u16()),
            None => RouteError::Http(e.to_string()),
        }
    }
}
