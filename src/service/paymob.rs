use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::error::ServiceError;
use crate::config::Config;

const PAYMOB_BASE_URL: &str = "https://accept.paymob.com/api";

/// The transaction fields Paymob signs, in the exact order the gateway
/// concatenates them. `order` resolves to `order.id`, the `source_data.*`
/// keys to the nested object.
const HMAC_FIELDS: [&str; 20] = [
    "amount_cents",
    "created_at",
    "currency",
    "error_occured",
    "has_parent_transaction",
    "id",
    "integration_id",
    "is_3d_secure",
    "is_auth",
    "is_capture",
    "is_refunded",
    "is_standalone_payment",
    "is_voided",
    "order.id",
    "owner",
    "pending",
    "source_data.pan",
    "source_data.sub_type",
    "source_data.type",
    "success",
];

const TOKEN_HMAC_FIELDS: [&str; 8] = [
    "card_subtype",
    "created_at",
    "email",
    "id",
    "masked_pan",
    "merchant_id",
    "order_id",
    "token",
];

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct PaymentKeyResponse {
    token: String,
}

/// Thin client over the Paymob Accept API. One instance lives in AppState
/// and is shared across requests through the pooled reqwest client.
#[derive(Debug, Clone)]
pub struct PaymobClient {
    http: reqwest::Client,
    api_key: String,
    integration_id: String,
    iframe_id: String,
    hmac_secret: String,
}

impl PaymobClient {
    pub fn new(config: &Config) -> Self {
        PaymobClient {
            http: reqwest::Client::new(),
            api_key: config.paymob_api_key.clone(),
            integration_id: config.paymob_integration_id.clone(),
            iframe_id: config.paymob_iframe_id.clone(),
            hmac_secret: config.paymob_hmac_secret.clone(),
        }
    }

    /// Exchanges the API key for a short-lived auth token.
    pub async fn authenticate(&self) -> Result<String, ServiceError> {
        let response = self
            .http
            .post(format!("{}/auth/tokens", PAYMOB_BASE_URL))
            .json(&json!({ "api_key": self.api_key }))
            .send()
            .await
            .map_err(|e| ServiceError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::Gateway(format!(
                "auth request failed with status {}",
                response.status()
            )));
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Gateway(e.to_string()))?;

        Ok(body.token)
    }

    /// Registers an order with the gateway. `merchant_order_id` is our own
    /// transaction reference; the returned id is what the webhook echoes back.
    pub async fn register_order(
        &self,
        auth_token: &str,
        amount_cents: i64,
        merchant_order_id: &str,
    ) -> Result<i64, ServiceError> {
        let response = self
            .http
            .post(format!("{}/ecommerce/orders", PAYMOB_BASE_URL))
            .json(&json!({
                "auth_token": auth_token,
                "delivery_needed": "false",
                "amount_cents": amount_cents,
                "currency": "EGP",
                "merchant_order_id": merchant_order_id,
                "items": [],
            }))
            .send()
            .await
            .map_err(|e| ServiceError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::Gateway(format!(
                "order registration failed with status {}",
                response.status()
            )));
        }

        let body: OrderResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Gateway(e.to_string()))?;

        Ok(body.id)
    }

    /// Requests a payment key for the registered order. Tokenization is
    /// always on so successful payments also produce a TOKEN callback.
    pub async fn payment_key(
        &self,
        auth_token: &str,
        amount_cents: i64,
        paymob_order_id: i64,
        email: &str,
        first_name: &str,
        last_name: &str,
        phone_number: Option<&str>,
    ) -> Result<String, ServiceError> {
        let body = payment_key_request(
            auth_token,
            amount_cents,
            paymob_order_id,
            &self.integration_id,
            email,
            first_name,
            last_name,
            phone_number,
        );

        let response = self
            .http
            .post(format!("{}/acceptance/payment_keys", PAYMOB_BASE_URL))
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::Gateway(format!(
                "payment key request failed with status {}",
                response.status()
            )));
        }

        let body: PaymentKeyResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Gateway(e.to_string()))?;

        Ok(body.token)
    }

    pub fn iframe_url(&self, payment_token: &str) -> String {
        format!(
            "{}/acceptance/iframes/{}?payment_token={}",
            PAYMOB_BASE_URL, self.iframe_id, payment_token
        )
    }

    /// Charges a saved card token against a fresh payment key.
    pub async fn pay_with_token(
        &self,
        card_token: &str,
        payment_token: &str,
    ) -> Result<(), ServiceError> {
        let response = self
            .http
            .post(format!("{}/acceptance/payments/pay", PAYMOB_BASE_URL))
            .json(&json!({
                "source": { "identifier": card_token, "subtype": "TOKEN" },
                "payment_token": payment_token,
            }))
            .send()
            .await
            .map_err(|e| ServiceError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::Gateway(format!(
                "token payment failed with status {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// Verifies the `hmac` query parameter of a transaction callback against
    /// the payload. Comparison is constant time.
    pub fn validate_hmac(&self, obj: &Value, provided: &str) -> Result<(), ServiceError> {
        self.check_hmac(&HMAC_FIELDS, obj, provided)
    }

    /// TOKEN callbacks are signed over a different, shorter field set.
    pub fn validate_token_hmac(&self, obj: &Value, provided: &str) -> Result<(), ServiceError> {
        self.check_hmac(&TOKEN_HMAC_FIELDS, obj, provided)
    }

    fn check_hmac(&self, fields: &[&str], obj: &Value, provided: &str) -> Result<(), ServiceError> {
        let expected = compute_hmac_over(&self.hmac_secret, fields, obj);

        let provided = provided.to_lowercase();
        if expected.as_bytes().ct_eq(provided.as_bytes()).into() {
            Ok(())
        } else {
            Err(ServiceError::InvalidHmac)
        }
    }
}

/// Request body for /acceptance/payment_keys. Tokenization is always on and
/// every billing field the gateway insists on falls back to "NA".
#[allow(clippy::too_many_arguments)]
fn payment_key_request(
    auth_token: &str,
    amount_cents: i64,
    paymob_order_id: i64,
    integration_id: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
    phone_number: Option<&str>,
) -> Value {
    json!({
        "auth_token": auth_token,
        "amount_cents": amount_cents,
        "expiration": 3600,
        "order_id": paymob_order_id,
        "billing_data": {
            "email": email,
            "first_name": first_name,
            "last_name": last_name,
            "phone_number": phone_number.unwrap_or("NA"),
            "apartment": "NA",
            "floor": "NA",
            "street": "NA",
            "building": "NA",
            "shipping_method": "NA",
            "postal_code": "NA",
            "city": "NA",
            "country": "NA",
            "state": "NA",
        },
        "currency": "EGP",
        "integration_id": integration_id,
        "tokenization": "true",
    })
}

/// Builds the signed string: the fields in gateway order, concatenated with
/// no separator. Booleans render lowercase, absent or null fields as the
/// empty string.
fn hmac_payload(fields: &[&str], obj: &Value) -> String {
    let mut payload = String::new();
    for field in fields {
        payload.push_str(&field_as_string(obj, field));
    }
    payload
}

fn field_as_string(obj: &Value, path: &str) -> String {
    let mut current = obj;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(next) => current = next,
            None => return String::new(),
        }
    }

    match current {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compute_hmac_over(secret: &str, fields: &[&str], obj: &Value) -> String {
    let payload = hmac_payload(fields, obj);

    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_obj() -> Value {
        json!({
            "amount_cents": 10000,
            "created_at": "2025-01-15T10:30:00.000000",
            "currency": "EGP",
            "error_occured": false,
            "has_parent_transaction": false,
            "id": 987654,
            "integration_id": 12345,
            "is_3d_secure": true,
            "is_auth": false,
            "is_capture": false,
            "is_refunded": false,
            "is_standalone_payment": true,
            "is_voided": false,
            "order": { "id": 555111 },
            "owner": 42,
            "pending": false,
            "source_data": { "pan": "2346", "sub_type": "MasterCard", "type": "card" },
            "success": true,
        })
    }

    #[test]
    fn payload_concatenates_fields_in_gateway_order() {
        let payload = hmac_payload(&HMAC_FIELDS, &sample_obj());

        assert_eq!(
            payload,
            "100002025-01-15T10:30:00.000000EGPfalsefalse98765412345truefalsefalse\
             falsetruefalse55511142false2346MasterCardcardtrue"
        );
    }

    #[test]
    fn missing_and_null_fields_render_empty() {
        let obj = json!({ "amount_cents": 50, "currency": null });
        let payload = hmac_payload(&HMAC_FIELDS, &obj);
        assert!(payload.starts_with("50"));
        assert!(!payload.contains("null"));
    }

    #[test]
    fn booleans_render_lowercase() {
        let payload = hmac_payload(&HMAC_FIELDS, &sample_obj());
        assert!(payload.contains("true"));
        assert!(!payload.contains("True"));
    }

    #[test]
    fn valid_signature_passes_tampered_fails() {
        let secret = "hmac-secret";
        let obj = sample_obj();
        let good = compute_hmac_over(secret, &HMAC_FIELDS, &obj);

        let client = PaymobClient {
            http: reqwest::Client::new(),
            api_key: "k".into(),
            integration_id: "1".into(),
            iframe_id: "2".into(),
            hmac_secret: secret.into(),
        };

        assert!(client.validate_hmac(&obj, &good).is_ok());
        assert!(client.validate_hmac(&obj, &good.to_uppercase()).is_ok());

        let mut tampered = obj.clone();
        tampered["amount_cents"] = json!(999999);
        assert!(client.validate_hmac(&tampered, &good).is_err());
    }

    #[test]
    fn token_callback_uses_its_own_field_set() {
        let obj = json!({
            "card_subtype": "MasterCard",
            "created_at": "2025-01-15T10:31:00",
            "email": "client@example.com",
            "id": 111,
            "masked_pan": "xxxx-xxxx-xxxx-2346",
            "merchant_id": 9,
            "order_id": "555111",
            "token": "tok_saved_card",
        });

        assert_eq!(
            hmac_payload(&TOKEN_HMAC_FIELDS, &obj),
            "MasterCard2025-01-15T10:31:00client@example.com111xxxx-xxxx-xxxx-23469555111tok_saved_card"
        );
    }

    #[test]
    fn payment_key_request_always_asks_for_tokenization() {
        let body = payment_key_request(
            "auth", 10000, 555111, "12345", "client@example.com", "Amira", "Hassan", None,
        );

        assert_eq!(body["tokenization"], "true");
        assert_eq!(body["order_id"], 555111);
        assert_eq!(body["amount_cents"], 10000);
        assert_eq!(body["currency"], "EGP");
    }

    #[test]
    fn missing_billing_fields_fall_back_to_na() {
        let body = payment_key_request(
            "auth", 10000, 555111, "12345", "client@example.com", "Amira", "Hassan", None,
        );

        assert_eq!(body["billing_data"]["phone_number"], "NA");
        assert_eq!(body["billing_data"]["street"], "NA");
        assert_eq!(body["billing_data"]["email"], "client@example.com");

        let with_phone = payment_key_request(
            "auth", 10000, 555111, "12345", "client@example.com", "Amira", "Hassan",
            Some("+201001234567"),
        );
        assert_eq!(with_phone["billing_data"]["phone_number"], "+201001234567");
    }

    #[test]
    fn iframe_url_embeds_token() {
        let client = PaymobClient {
            http: reqwest::Client::new(),
            api_key: "k".into(),
            integration_id: "1".into(),
            iframe_id: "778899".into(),
            hmac_secret: "s".into(),
        };

        assert_eq!(
            client.iframe_url("tok_abc"),
            "https://accept.paymob.com/api/acceptance/iframes/778899?payment_token=tok_abc"
        );
    }
}
