//! Best-effort JSON GET client shared by every provider.
//!
//! Every fetcher in `data` talks to its provider through [`JsonSource`], so
//! they all share one failure contract: either structured data comes back, or
//! `None` does. Transport errors, non-2xx statuses and non-JSON bodies are
//! logged here and never bubble up as errors. There are no retries.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::AppError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameters for a single request.
pub type Params = Vec<(&'static str, String)>;

/// A source of JSON documents addressed by URL + query parameters.
///
/// `Sync` because the report aggregator dispatches fetches across threads.
pub trait JsonSource: Send + Sync {
    /// Issue one GET. `None` on any failure.
    fn get_json(&self, url: &str, params: &[(&'static str, String)]) -> Option<serde_json::Value>;
}

/// Fetch and decode into `T`; decoding failures are logged and yield `None`.
pub fn fetch<T: DeserializeOwned>(
    source: &(impl JsonSource + ?Sized),
    url: &str,
    params: &[(&'static str, String)],
) -> Option<T> {
    let value = source.get_json(url, params)?;
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(url, error = %e, "unexpected response shape");
            None
        }
    }
}

/// `reqwest` blocking client with a bounded per-request timeout.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cropfit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl JsonSource for HttpSource {
    fn get_json(&self, url: &str, params: &[(&'static str, String)]) -> Option<serde_json::Value> {
        debug!(url, ?params, "GET");
        let resp = match self.client.get(url).query(params).send() {
            Ok(r) => r,
            Err(e) => {
                warn!(url, error = %e, "request failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!(url, status = %resp.status(), "request returned non-success status");
            return None;
        }

        match resp.json::<serde_json::Value>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(url, error = %e, "failed to parse JSON body");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory source for fetcher tests.

    use std::sync::Mutex;

    use super::*;

    type Responder = Box<dyn Fn(&[(&'static str, String)]) -> Option<serde_json::Value> + Send + Sync>;

    /// Routes requests by URL to a responder closure and records every call.
    #[derive(Default)]
    pub struct ScriptedSource {
        routes: Vec<(String, Responder)>,
        calls: Mutex<Vec<(String, Vec<(&'static str, String)>)>>,
    }

    impl ScriptedSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(
            mut self,
            url: &str,
            f: impl Fn(&[(&'static str, String)]) -> Option<serde_json::Value> + Send + Sync + 'static,
        ) -> Self {
            self.routes.push((url.to_string(), Box::new(f)));
            self
        }

        pub fn calls_to(&self, url: &str) -> Vec<Vec<(&'static str, String)>> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(u, _)| u == url)
                .map(|(_, p)| p.clone())
                .collect()
        }
    }

    impl JsonSource for ScriptedSource {
        fn get_json(&self, url: &str, params: &[(&'static str, String)]) -> Option<serde_json::Value> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), params.to_vec()));
            let (_, responder) = self.routes.iter().find(|(u, _)| u == url)?;
            responder(params)
        }
    }

    pub fn param<'a>(params: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}
