//! Thin JSON-over-HTTP layer shared by both adapters.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use notorii_sync::RemoteError;

const TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated client bound to one base URL.
pub(crate) struct Http {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    headers: Vec<(&'static str, String)>,
}

impl fmt::Debug for Http {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Http")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("headers", &self.headers)
            .finish()
    }
}

impl Http {
    pub(crate) fn new(base_url: &str, token: String) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            headers: Vec::new(),
        }
    }

    pub(crate) fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let response = self.request("GET", path).call().map_err(map_ureq)?;
        decode(response)
    }

    pub(crate) fn send<B, T>(&self, method: &str, path: &str, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .request(method, path)
            .send_json(body)
            .map_err(map_ureq)?;
        decode(response)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);
        let mut request = self
            .agent
            .request(method, &url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/json");
        for (name, value) in &self.headers {
            request = request.set(name, value);
        }
        request
    }
}

fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, RemoteError> {
    response
        .into_json::<T>()
        .map_err(|e| RemoteError::Decode(e.to_string()))
}

fn map_ureq(err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(code, response) => RemoteError::Status {
            code,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => RemoteError::Transport(transport.to_string()),
    }
}
