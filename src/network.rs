/*
 * SPDX-License-Identifier: MIT
 *
 * Permission is hereby granted, free of charge, to any person obtaining a
 * copy of this software and associated documentation files (the "Software"),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
 * THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */
use std::{collections::HashMap, time::Duration};

use reqwest::{
    blocking::Client as HttpClient, blocking::ClientBuilder as HttpClientBuilder,
    header::HeaderValue, header::ACCEPT, header::CONTENT_TYPE, header::LOCATION, Method,
    StatusCode,
};
use serde::de::DeserializeOwned;
use tracing::debug;

pub use crate::RedfishError;

pub const REDFISH_ENDPOINT: &str = "redfish/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// iDRAC session tokens go in this header instead of basic auth.
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// How to authenticate against the BMC. Basic auth and a session token are
/// mutually exclusive, which the enum enforces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Auth {
    #[default]
    None,
    Basic {
        user: String,
        password: Option<String>,
    },
    SessionToken(String),
}

/// The endpoint that the client connects to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    /// Hostname or IP address of BMC
    pub host: String,
    /// BMC port. If absent the default HTTPS port 443 will be used
    pub port: Option<u16>,
    /// BMC credentials
    pub auth: Auth,
}

#[derive(Debug)]
pub struct ClientBuilder {
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl ClientBuilder {
    /// Allows the client to accept self signed certificates and other
    /// invalid certificates. BMCs usually ship with a self-signed cert, but
    /// validation stays on unless the caller opts out.
    pub fn accept_invalid_certs(mut self) -> ClientBuilder {
        self.accept_invalid_certs = true;
        self
    }

    /// Overwrites the timeout that will be applied to every request
    pub fn timeout(mut self, timeout: Duration) -> ClientBuilder {
        self.timeout = timeout;
        self
    }

    /// Builds an HTTP client targeting the given BMC endpoint
    pub fn build(&self, endpoint: Endpoint) -> Result<RedfishHttpClient, RedfishError> {
        let http_client = HttpClientBuilder::new()
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .timeout(self.timeout)
            .build()
            .map_err(|e| RedfishError::NetworkError {
                url: endpoint.host.clone(),
                source: e,
            })?;
        Ok(RedfishHttpClient {
            endpoint,
            http_client,
        })
    }
}

/// Status and Location header of a POST. Redfish actions answer 204 with no
/// body; SimpleUpdate answers 202 and names the created job in Location.
#[derive(Debug, Clone)]
pub struct PostOutcome {
    pub status: StatusCode,
    pub location: Option<String>,
}

/// The seam between the orchestrator and the wire. Production uses
/// [`RedfishHttpClient`]; tests script responses through a fake.
pub trait Transport {
    fn get<T>(&self, api: &str) -> Result<T, RedfishError>
    where
        T: DeserializeOwned + ::std::fmt::Debug;

    fn post(&self, api: &str, body: HashMap<&str, String>) -> Result<PostOutcome, RedfishError>;
}

/// A blocking HTTP client which targets a single BMC endpoint
pub struct RedfishHttpClient {
    endpoint: Endpoint,
    http_client: HttpClient,
}

impl RedfishHttpClient {
    /// Returns a builder for configuring the HTTP connection
    pub fn builder() -> ClientBuilder {
        ClientBuilder {
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    fn url(&self, api: &str) -> String {
        match self.endpoint.port {
            Some(p) => format!(
                "https://{}:{}/{}/{}",
                self.endpoint.host, p, REDFISH_ENDPOINT, api
            ),
            None => format!(
                "https://{}/{}/{}",
                self.endpoint.host, REDFISH_ENDPOINT, api
            ),
        }
    }

    // All the HTTP requests happen from here.
    fn req<T, B>(
        &self,
        method: Method,
        api: &str,
        body: Option<B>,
    ) -> Result<(StatusCode, Option<String>, Option<T>), RedfishError>
    where
        T: DeserializeOwned + ::std::fmt::Debug,
        B: serde::Serialize + ::std::fmt::Debug,
    {
        let url = self.url(api);
        let body_enc = match body {
            Some(b) => {
                let url = url.clone();
                let body_enc =
                    serde_json::to_string(&b).map_err(|e| RedfishError::JsonSerializeError {
                        url,
                        object_debug: format!("{b:?}"),
                        source: e,
                    })?;
                Some(body_enc)
            }
            None => None,
        };
        debug!(
            "TX {} {} {}",
            method,
            url,
            body_enc.as_deref().unwrap_or_default()
        );

        let mut req_b = match method {
            Method::GET => self.http_client.get(&url),
            Method::POST => self.http_client.post(&url),
            _ => unreachable!("Only GET and POST http methods are used."),
        };
        req_b = req_b
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match &self.endpoint.auth {
            Auth::None => {}
            Auth::Basic { user, password } => {
                req_b = req_b.basic_auth(user, password.as_ref());
            }
            Auth::SessionToken(token) => {
                req_b = req_b.header(AUTH_TOKEN_HEADER, token.as_str());
            }
        }
        if let Some(b) = body_enc {
            req_b = req_b.body(b);
        }
        let response = req_b.send().map_err(|e| RedfishError::NetworkError {
            url: url.clone(),
            source: e,
        })?;
        let status_code = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        // read the body even if not status 2XX, because iDRAC gives useful error messages as JSON
        let response_body = response.text().map_err(|e| RedfishError::NetworkError {
            url: url.clone(),
            source: e,
        })?;
        let mut res = None;
        if !response_body.is_empty() {
            debug!("RX {status_code} {response_body}");
            match serde_json::from_str(&response_body) {
                Ok(v) => res.insert(v),
                Err(e) => {
                    return Err(RedfishError::JsonDeserializeError {
                        url,
                        body: response_body,
                        source: e,
                    });
                }
            };
        } else {
            debug!("RX {status_code}");
        }

        if !status_code.is_success() {
            return Err(RedfishError::HTTPErrorCode { url, status_code });
        }
        Ok((status_code, location, res))
    }
}

impl Transport for RedfishHttpClient {
    fn get<T>(&self, api: &str) -> Result<T, RedfishError>
    where
        T: DeserializeOwned + ::std::fmt::Debug,
    {
        let (_status_code, _location, resp_opt) = self.req::<T, String>(Method::GET, api, None)?;
        match resp_opt {
            Some(response_body) => Ok(response_body),
            None => Err(RedfishError::NoContent),
        }
    }

    fn post(&self, api: &str, body: HashMap<&str, String>) -> Result<PostOutcome, RedfishError> {
        let (status, location, _resp_body): (_, _, Option<HashMap<String, serde_json::Value>>) =
            self.req(Method::POST, api, Some(body))?;
        Ok(PostOutcome { status, location })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn client(endpoint: Endpoint) -> RedfishHttpClient {
        RedfishHttpClient::builder().build(endpoint).unwrap()
    }

    #[test]
    fn test_url_default_port() {
        let c = client(Endpoint {
            host: "10.0.0.1".to_string(),
            ..Default::default()
        });
        assert_eq!(
            c.url("TaskService/Tasks/JID_471269252011"),
            "https://10.0.0.1/redfish/v1/TaskService/Tasks/JID_471269252011"
        );
    }

    #[test]
    fn test_url_explicit_port() {
        let c = client(Endpoint {
            host: "bmc.example.net".to_string(),
            port: Some(8443),
            ..Default::default()
        });
        assert_eq!(
            c.url("UpdateService"),
            "https://bmc.example.net:8443/redfish/v1/UpdateService"
        );
    }
}
