use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::CsrfToken,
    protocol::{UpdateItemRequest, CSRF_HEADER},
};
use url::Url;

use crate::error::DispatchError;

/// Body is decoded by the dispatcher, not the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUpdateResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawUpdateResponse {
    pub fn is_success(&self) -> bool {
        StatusCode::from_u16(self.status)
            .map(|status| status.is_success())
            .unwrap_or(false)
    }
}

#[async_trait]
pub trait CartTransport: Send + Sync {
    async fn post_update(
        &self,
        request: &UpdateItemRequest,
        csrf_token: &CsrfToken,
    ) -> Result<RawUpdateResponse, DispatchError>;
}

pub struct HttpCartTransport {
    http: Client,
    endpoint: Url,
}

impl HttpCartTransport {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(http: Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CartTransport for HttpCartTransport {
    async fn post_update(
        &self,
        request: &UpdateItemRequest,
        csrf_token: &CsrfToken,
    ) -> Result<RawUpdateResponse, DispatchError> {
        // Like `fetch`, a 4xx/5xx still counts as a response.
        let res = self
            .http
            .post(self.endpoint.clone())
            .header(CSRF_HEADER, csrf_token.expose())
            .json(request)
            .send()
            .await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?.to_vec();
        Ok(RawUpdateResponse { status, body })
    }
}
