//! REST client for the guest service

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use gw_core::error::TransportError;
use gw_core::traits::RemoteApi;
use gw_protocol::{GuestPatch, GuestRecord, InvitationId};

/// `RemoteApi` implementation over HTTP
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a response into the expected body, mapping HTTP failures into
    /// the transport taxonomy
    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Request {
                status: Some(status.as_u16()),
                message,
            });
        }
        response.json::<T>().await.map_err(request_error)
    }
}

fn request_error(err: reqwest::Error) -> TransportError {
    TransportError::Request {
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn fetch_guests(&self) -> Result<Vec<GuestRecord>, TransportError> {
        let response = self
            .client
            .get(self.url("/guests"))
            .send()
            .await
            .map_err(request_error)?;
        Self::parse(response).await
    }

    async fn fetch_guest(&self, id: &InvitationId) -> Result<GuestRecord, TransportError> {
        let response = self
            .client
            .get(self.url(&format!("/guests/{}", id)))
            .send()
            .await
            .map_err(request_error)?;
        Self::parse(response).await
    }

    async fn update_guest(&self, patch: &GuestPatch) -> Result<GuestRecord, TransportError> {
        let response = self
            .client
            .patch(self.url(&format!("/guests/{}", patch.invitation_id)))
            .json(patch)
            .send()
            .await
            .map_err(request_error)?;
        Self::parse(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpApi::new("http://localhost:8080/");
        assert_eq!(api.url("/guests"), "http://localhost:8080/guests");
    }

    #[test]
    fn test_record_routes_use_the_invitation_id() {
        let api = HttpApi::new("http://localhost:8080");
        let id = InvitationId::new("inv-42");
        assert_eq!(
            api.url(&format!("/guests/{}", id)),
            "http://localhost:8080/guests/inv-42"
        );
    }
}
