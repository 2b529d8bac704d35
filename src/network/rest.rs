use serde::Deserialize;
use serde_json::json;

use super::ClientError;
use crate::common::offer::{Offer, OfferUpdate};
use crate::common::types::{ChatMessage, CompanyId, OfferId, SessionKey};

/// Standard `{success, error?}` body returned by every action endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    pub messages: Vec<ChatMessage>,
    pub offer: Offer,
}

/// Thin wrapper over the marketplace REST API. One method per endpoint;
/// `{success: false}` bodies surface as [`ClientError::Rejected`].
pub struct RestClient {
    http: reqwest::Client,
    base: String,
}

impl RestClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn chat_history(&self, key: SessionKey) -> Result<HistoryResponse, ClientError> {
        let url = self.url(&format!("/chat_history/{}/{}", key.cargo_id, key.offer_id));
        let resp = self.http.get(url).send().await?.error_for_status()?;
        Ok(resp.json::<HistoryResponse>().await?)
    }

    pub async fn offer_info(&self, offer_id: OfferId) -> Result<Offer, ClientError> {
        let url = self.url(&format!("/offer_info/{offer_id}"));
        let resp = self.http.get(url).send().await?.error_for_status()?;
        Ok(resp.json::<Offer>().await?)
    }

    pub async fn accept_offer(&self, offer_id: OfferId) -> Result<(), ClientError> {
        self.post_action(&format!("/cargo/offers/accept/{offer_id}"), None)
            .await
    }

    pub async fn decline_offer(&self, offer_id: OfferId) -> Result<(), ClientError> {
        self.post_action(&format!("/cargo/offers/decline/{offer_id}"), None)
            .await
    }

    /// `action` is `"finalize"` or `"withdraw"`; the backend shares one
    /// endpoint for both.
    pub async fn finalize_or_withdraw(
        &self,
        offer_id: OfferId,
        action: &str,
    ) -> Result<(), ClientError> {
        self.post_action(
            &format!("/cargo/offer/finalize_or_withdraw/{offer_id}"),
            Some(json!({ "action": action })),
        )
        .await
    }

    pub async fn update_offer(
        &self,
        offer_id: OfferId,
        update: &OfferUpdate,
    ) -> Result<(), ClientError> {
        self.post_action(
            &format!("/cargo/offer/update/{offer_id}"),
            Some(serde_json::to_value(update)?),
        )
        .await
    }

    pub async fn mark_seen(&self, offer_id: OfferId) -> Result<(), ClientError> {
        self.post_action(&format!("/cargo/offer/mark_seen/{offer_id}"), None)
            .await
    }

    pub async fn block_company(&self, company_id: CompanyId) -> Result<(), ClientError> {
        self.post_action(&format!("/company/block_company/{company_id}"), None)
            .await
    }

    async fn post_action(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(), ClientError> {
        let mut req = self.http.post(self.url(path));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await?.error_for_status()?;
        let body = resp.json::<ApiResponse>().await?;
        if body.success {
            Ok(())
        } else {
            Err(ClientError::Rejected(
                body.error.unwrap_or_else(|| "unknown server error".to_string()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = RestClient::new("http://localhost:5000/");
        assert_eq!(
            client.url("/chat_history/1/2"),
            "http://localhost:5000/chat_history/1/2"
        );
    }

    #[test]
    fn history_response_decodes_server_shape() {
        let raw = r#"{
            "messages": [
                {"from_user_id": 20, "to_user_id": 10, "cargo_id": 3, "offer_id": 7,
                 "message": "Jo napot!", "created_at": "2025-03-01T08:00:00Z"}
            ],
            "offer": {
                "offer_id": 7, "cargo_id": 3, "from_user_id": 20, "to_user_id": 10,
                "from_user": "Kovacs Adam", "price": 950.0, "currency": "eur",
                "origin": "Wien", "destination": "Budapest",
                "pickup_date": "2025-03-01", "arrival_date": "2025-03-02"
            }
        }"#;
        let resp: HistoryResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.messages.len(), 1);
        assert_eq!(resp.offer.offer_id, 7);
        // History rows carry no id; decode assigns one so dedup still works.
        let a = resp.messages[0].id;
        assert!(!a.is_nil());
    }

    #[test]
    fn api_response_tolerates_missing_fields() {
        let ok: ApiResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(ok.success && ok.error.is_none());
        let err: ApiResponse =
            serde_json::from_str(r#"{"success": false, "error": "Nincs jogosultsag."}"#).unwrap();
        assert!(!err.success);
        assert_eq!(err.error.as_deref(), Some("Nincs jogosultsag."));
    }
}
