// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use marketdesk_app::{
    ApiError, Buyer, BuyerId, Field, FieldDraft, FieldId, PartyDraft, PartyKind, Seller, SellerId,
};
use reqwest::Method;
use reqwest::blocking::{Client as HttpClient, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Blocking client for the buyers, sellers, and fields REST API.
///
/// No request timeout is applied: a hung request blocks until the
/// transport itself gives up.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let base_url = Url::parse(trimmed).with_context(|| format!("parse api.base_url {trimmed:?}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }
        if base_url.cannot_be_a_base() {
            bail!("api.base_url {trimmed:?} cannot carry request paths");
        }

        let http = HttpClient::builder()
            .timeout(None::<Duration>)
            .build()
            .context("build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Transport {
                url: self.base_url().to_owned(),
                reason: "base URL cannot carry request paths".to_owned(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "api request");

        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            // json() sets Content-Type: application/json.
            request = request.json(body);
        }
        let response = request
            .send()
            .map_err(|error| connection_error(url.as_str(), &error))?;

        let status = response.status();
        debug!(%method, %url, status = status.as_u16(), "api response");
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let error = clean_error_response(status.as_u16(), &body);
            warn!(%method, %url, %error, "api request failed");
            return Err(error);
        }
        Ok(response)
    }

    fn fetch<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let response = self.send(Method::GET, segments, None)?;
        let url = response.url().to_string();
        let text = response.text().map_err(|error| ApiError::Decode {
            url: url.clone(),
            reason: error.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|error| ApiError::Decode {
            url,
            reason: error.to_string(),
        })
    }

    fn mutate(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&serde_json::Value>,
    ) -> Result<(), ApiError> {
        // The echoed record is not needed; callers refetch or patch locally.
        self.send(method, segments, body).map(drop)
    }

    pub fn list_buyers(&self) -> Result<Vec<Buyer>, ApiError> {
        self.fetch(&["buyers", "get-buyers"])
    }

    pub fn list_sellers(&self) -> Result<Vec<Seller>, ApiError> {
        self.fetch(&["sellers", "get-sellers"])
    }

    pub fn get_buyer(&self, id: &BuyerId) -> Result<Buyer, ApiError> {
        self.fetch(&["buyers", "get-buyer-by-id", id.as_str()])
    }

    pub fn get_seller(&self, id: &SellerId) -> Result<Seller, ApiError> {
        self.fetch(&["sellers", "get-seller-by-id", id.as_str()])
    }

    /// `get-<kind>-by-id`, reduced to the editable fields.
    pub fn get_party_draft(&self, kind: PartyKind, id: &str) -> Result<PartyDraft, ApiError> {
        match kind {
            PartyKind::Buyer => self
                .get_buyer(&BuyerId::new(id))
                .map(|buyer| PartyDraft::from_record(&buyer)),
            PartyKind::Seller => self
                .get_seller(&SellerId::new(id))
                .map(|seller| PartyDraft::from_record(&seller)),
        }
    }

    pub fn add_party(&self, kind: PartyKind, draft: &PartyDraft) -> Result<(), ApiError> {
        let action = format!("add-{}", kind.wire_prefix());
        self.mutate(
            Method::POST,
            &[kind.plural(), action.as_str()],
            Some(&draft.to_wire(kind)),
        )
    }

    pub fn update_party(&self, kind: PartyKind, id: &str, draft: &PartyDraft) -> Result<(), ApiError> {
        let action = format!("update-{}", kind.wire_prefix());
        self.mutate(
            Method::PUT,
            &[kind.plural(), action.as_str(), id],
            Some(&draft.to_wire(kind)),
        )
    }

    pub fn delete_party(&self, kind: PartyKind, id: &str) -> Result<(), ApiError> {
        let action = format!("delete-{}", kind.wire_prefix());
        self.mutate(Method::DELETE, &[kind.plural(), action.as_str(), id], None)
    }

    pub fn list_fields(&self) -> Result<Vec<Field>, ApiError> {
        self.fetch(&["fields", "get-fields"])
    }

    pub fn add_field(&self, draft: &FieldDraft) -> Result<(), ApiError> {
        let body = encode(draft)?;
        self.mutate(Method::POST, &["fields", "add-field"], Some(&body))
    }

    /// Sends the whole record, server-assigned parts included.
    pub fn update_field(&self, field: &Field) -> Result<(), ApiError> {
        let body = encode(field)?;
        self.mutate(
            Method::PUT,
            &["fields", "update-field", field.id.as_str()],
            Some(&body),
        )
    }

    pub fn delete_field(&self, id: &FieldId) -> Result<(), ApiError> {
        self.mutate(Method::DELETE, &["fields", "delete-field", id.as_str()], None)
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|error| ApiError::Decode {
        url: String::new(),
        reason: format!("encode request body: {error}"),
    })
}

fn connection_error(url: &str, error: &reqwest::Error) -> ApiError {
    ApiError::Transport {
        url: url.to_owned(),
        reason: error.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

/// Non-2xx reply. Only a JSON `message` is surfaced to the user; anything
/// else falls back to the caller's generic text.
fn clean_error_response(code: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .map(|message| message.trim().to_owned())
        .filter(|message| !message.is_empty());
    ApiError::Status { code, message }
}

#[cfg(test)]
mod tests {
    use super::{Client, clean_error_response};
    use marketdesk_app::ApiError;

    #[test]
    fn error_body_message_is_extracted() {
        assert_eq!(
            clean_error_response(404, r#"{"message":"Buyer not found"}"#),
            ApiError::Status {
                code: 404,
                message: Some("Buyer not found".to_owned()),
            }
        );
    }

    #[test]
    fn unparsable_or_blank_error_body_has_no_message() {
        for body in ["", "<html>bad gateway</html>", r#"{"message":"  "}"#, r#"{"error":"x"}"#] {
            assert_eq!(
                clean_error_response(502, body),
                ApiError::Status {
                    code: 502,
                    message: None
                },
                "{body}"
            );
        }
    }

    #[test]
    fn base_url_is_trimmed_and_validated() {
        let client = Client::new("http://localhost:5000/api/").expect("valid base url");
        assert_eq!(client.base_url(), "http://localhost:5000/api");

        assert!(Client::new("").is_err());
        assert!(Client::new("ftp://example.com").is_err());
        assert!(Client::new("not a url").is_err());
    }

    #[test]
    fn endpoint_escapes_ids_and_keeps_base_path() {
        let client = Client::new("http://localhost:5000/api").expect("valid base url");
        let url = client
            .endpoint(&["buyers", "get-buyer-by-id", "a/b c"])
            .expect("endpoint");
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/buyers/get-buyer-by-id/a%2Fb%20c"
        );

        let root = Client::new("http://localhost:5000").expect("valid base url");
        let url = root.endpoint(&["fields", "get-fields"]).expect("endpoint");
        assert_eq!(url.as_str(), "http://localhost:5000/fields/get-fields");
    }
}
