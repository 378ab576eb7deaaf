use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::models::paymentmodel::{PaymentMethod, Transaction};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct InitiateDepositDto {
    pub amount: BigDecimal,
}

/// Body of a Paymob callback. The interesting parts are the event type and
/// the raw `obj`, which is also what the HMAC covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymobWebhookDto {
    #[serde(rename = "type")]
    pub event_type: String,
    pub obj: Value,
}

/// Paymob appends the signature as a query parameter, not a header.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookQueryDto {
    pub hmac: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DepositResponseDto {
    pub status: String,
    pub reference: String,
    pub iframe_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponseDto {
    pub status: String,
    pub transaction: Transaction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionListResponseDto {
    pub status: String,
    pub transactions: Vec<Transaction>,
    pub results: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentMethodResponseDto {
    pub status: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentMethodListResponseDto {
    pub status: String,
    pub payment_methods: Vec<PaymentMethod>,
}
