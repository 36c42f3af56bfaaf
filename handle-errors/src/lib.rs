use config::ConfigError;
use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeJsonError;
use tracing::{event, instrument, Level};
use warp::{
    filters::cors::CorsForbidden, http::StatusCode, reject::Reject, Rejection, Reply,
};

#[derive(Debug)]
pub enum Error {
    /// Network failure, timeout, non-2xx status or unreadable body from the scraped site.
    ExternalAPIError(ReqwestError),
    ConfigError(ConfigError),
    SerializationError(SerdeJsonError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::ExternalAPIError(ref err) => write!(f, "cannot execute: {}", err),
            Error::ConfigError(ref err) => write!(f, "cannot read configuration: {}", err),
            Error::SerializationError(ref err) => write!(f, "cannot serialize: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::ExternalAPIError(ref err) => Some(err),
            Error::ConfigError(ref err) => Some(err),
            Error::SerializationError(ref err) => Some(err),
        }
    }
}

impl Reject for Error {}

#[instrument]
pub async fn return_error(r: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(error) = r.find::<Error>() {
        event!(Level::ERROR, "{}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    } else if let Some(error) = r.find::<CorsForbidden>() {
        event!(Level::ERROR, "{}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::FORBIDDEN,
        ))
    } else if r.find::<warp::reject::MethodNotAllowed>().is_some() {
        Ok(warp::reply::with_status(
            "Method not allowed".to_string(),
            StatusCode::METHOD_NOT_ALLOWED,
        ))
    } else {
        Ok(warp::reply::with_status(
            "Route not found".to_string(),
            StatusCode::NOT_FOUND,
        ))
    }
}
