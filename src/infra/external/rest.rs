use crate::infra::external::rate_limiter::bitstamp_limiter::BitstampLimiter;
use crate::infra::external::ExecutionError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// A single REST endpoint: where it lives, how it is called and what it returns.
pub trait RestRequest {
    type Response: DeserializeOwned;
    type QueryParams: Serialize;

    fn path(&self) -> Cow<'static, str>;

    fn method() -> reqwest::Method {
        reqwest::Method::GET
    }

    fn query_params(&self) -> Option<&Self::QueryParams> {
        None
    }
}

/// Rate limited HTTP client bound to one base url.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    limiter: BitstampLimiter,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, limiter: BitstampLimiter) -> Result<Self, ExecutionError> {
        // connect timeout only, large history pages may take a while to stream
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limiter,
        })
    }

    pub async fn execute<Request>(&self, request: Request) -> Result<Request::Response, ExecutionError>
    where
        Request: RestRequest,
    {
        let path = request.path();
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self.http.request(Request::method(), &url);
        if let Some(params) = request.query_params() {
            builder = builder.query(params);
        }

        self.limiter.acquire().await;
        let response = builder.send().await?;
        let status = response.status();
        let payload = response.bytes().await?;
        debug!("{} {} -> {}", Request::method(), url, status);

        parse_response(&path, status, &payload)
    }
}

/// Maps a raw HTTP reply onto the typed response or an [`ExecutionError`].
pub fn parse_response<T>(path: &str, status: StatusCode, payload: &[u8]) -> Result<T, ExecutionError>
where
    T: DeserializeOwned,
{
    if status == StatusCode::NOT_FOUND {
        return Err(ExecutionError::NotFound {
            path: path.to_string(),
        });
    }
    if !status.is_success() {
        let body = String::from_utf8_lossy(payload).into_owned();
        return Err(ExecutionError::HttpResponse(status, body));
    }

    serde_json::from_slice(payload).map_err(|error| ExecutionError::Deserialise {
        path: path.to_string(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        ok: bool,
    }

    #[test]
    fn not_found_is_reported_as_such() {
        let err = parse_response::<Pong>("/ohlc/gone/", StatusCode::NOT_FOUND, b"{}").unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.is_connectivity());
    }

    #[test]
    fn server_error_keeps_status_and_body() {
        let err = parse_response::<Pong>("/x/", StatusCode::INTERNAL_SERVER_ERROR, b"boom")
            .unwrap_err();
        match err {
            ExecutionError::HttpResponse(status, body) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn success_is_deserialised() {
        let pong: Pong = parse_response("/x/", StatusCode::OK, br#"{"ok":true}"#).unwrap();
        assert_eq!(pong, Pong { ok: true });
    }

    #[test]
    fn malformed_json_is_a_deserialise_error() {
        let err = parse_response::<Pong>("/x/", StatusCode::OK, b"<html>").unwrap_err();
        assert!(matches!(err, ExecutionError::Deserialise { .. }));
    }
}
