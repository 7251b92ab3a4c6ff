use reqwest::{Method, RequestBuilder as ReqwestRequestBuilder, Response};
use serde::Deserialize;

use crate::error::{self, MattermostRequestError};

/// A single API v4 endpoint together with its query string.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub path: String,
    pub method: Method,
    pub query_params: Option<Vec<(String, String)>>,
}

impl Endpoint {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::GET,
            query_params: None,
        }
    }

    pub fn with_query_params(mut self, params: Vec<(String, String)>) -> Self {
        self.query_params = Some(params);
        self
    }
}

/// Builds and executes authenticated requests against one server.
pub struct RequestBuilder<'a> {
    client: &'a reqwest::Client,
    base_url: &'a str,
    token: &'a str,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(client: &'a reqwest::Client, base_url: &'a str, token: &'a str) -> Self {
        Self {
            client,
            base_url,
            token,
        }
    }

    /// Build a request for the given endpoint
    pub fn build_request(&self, endpoint: &Endpoint) -> ReqwestRequestBuilder {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.path.trim_start_matches('/')
        );

        let mut req = self
            .client
            .request(endpoint.method.clone(), &url)
            .bearer_auth(self.token)
            .header("x-requested-with", "XMLHttpRequest");

        if let Some(ref params) = endpoint.query_params {
            req = req.query(params);
        }

        req
    }

    /// Execute a request without body and return deserialized response
    pub async fn request<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &Endpoint,
    ) -> Result<T, MattermostRequestError> {
        tracing::debug!(
            method = %endpoint.method,
            path = %endpoint.path,
            query = ?endpoint.query_params,
            "sending request"
        );
        let res = self.build_request(endpoint).send().await?;
        self.handle_response(res).await
    }

    /// Handle response and parse errors
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        res: Response,
    ) -> Result<T, MattermostRequestError> {
        let status = res.status();
        let bytes = res.bytes().await?;

        if status.is_success() {
            serde_json::from_slice::<T>(&bytes).map_err(|e| {
                MattermostRequestError::UnexpectedResponse(format!(
                    "HTTP {} but failed to decode JSON: {}; body: {}",
                    status.as_u16(),
                    e,
                    String::from_utf8_lossy(&bytes)
                ))
            })
        } else {
            Err(error::parse_error_response(status, &bytes))
        }
    }
}
