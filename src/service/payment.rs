use std::sync::Arc;

use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use serde_json::Value;
use uuid::Uuid;

use super::error::ServiceError;
use super::paymob::PaymobClient;
use crate::db::{DBClient, PaymentExt, UserExt};
use crate::models::paymentmodel::{PaymentMethod, Transaction};
use crate::models::usermodel::User;
use crate::utils::reference::generate_transaction_reference;

/// Everything a client needs to finish a card deposit in the browser.
#[derive(Debug, Clone)]
pub struct DepositInitiation {
    pub transaction: Transaction,
    pub iframe_url: String,
}

#[derive(Debug, Clone)]
pub struct PaymentService {
    db_client: Arc<DBClient>,
    paymob: PaymobClient,
}

impl PaymentService {
    pub fn new(db_client: Arc<DBClient>, paymob: PaymobClient) -> Self {
        PaymentService { db_client, paymob }
    }

    /// Creates a pending deposit and hands back the hosted payment page URL.
    /// The wallet is only credited when the gateway confirms via webhook.
    pub async fn initiate_deposit(
        &self,
        user: &User,
        amount: BigDecimal,
    ) -> Result<DepositInitiation, ServiceError> {
        let amount_cents = amount_to_cents(&amount)?;
        let reference = generate_transaction_reference();

        let deposit = self
            .db_client
            .create_pending_deposit(user.id, amount.clone(), "EGP", &reference)
            .await?;

        let auth_token = self.paymob.authenticate().await?;
        let paymob_order_id = self
            .paymob
            .register_order(&auth_token, amount_cents, &reference)
            .await?;

        self.db_client
            .set_transaction_external_id(deposit.id, &paymob_order_id.to_string())
            .await?;

        let payment_token = self
            .paymob
            .payment_key(
                &auth_token,
                amount_cents,
                paymob_order_id,
                &user.email,
                &user.first_name,
                &user.last_name,
                user.phone_number.as_deref(),
            )
            .await?;

        Ok(DepositInitiation {
            transaction: deposit,
            iframe_url: self.paymob.iframe_url(&payment_token),
        })
    }

    /// Charges the user's default saved card without the iframe step. The
    /// deposit still completes through the webhook like any other.
    pub async fn deposit_with_saved_card(
        &self,
        user: &User,
        amount: BigDecimal,
    ) -> Result<Transaction, ServiceError> {
        let method = self
            .db_client
            .get_default_payment_method(user.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No saved payment method".to_string()))?;

        let amount_cents = amount_to_cents(&amount)?;
        let reference = generate_transaction_reference();

        let deposit = self
            .db_client
            .create_pending_deposit(user.id, amount.clone(), "EGP", &reference)
            .await?;

        let auth_token = self.paymob.authenticate().await?;
        let paymob_order_id = self
            .paymob
            .register_order(&auth_token, amount_cents, &reference)
            .await?;

        self.db_client
            .set_transaction_external_id(deposit.id, &paymob_order_id.to_string())
            .await?;

        let payment_token = self
            .paymob
            .payment_key(
                &auth_token,
                amount_cents,
                paymob_order_id,
                &user.email,
                &user.first_name,
                &user.last_name,
                user.phone_number.as_deref(),
            )
            .await?;

        self.paymob
            .pay_with_token(&method.card_token, &payment_token)
            .await?;

        Ok(deposit)
    }

    /// Entry point for gateway callbacks. Returns early with InvalidHmac
    /// before touching the database when the signature does not check out.
    pub async fn handle_webhook(
        &self,
        event_type: &str,
        obj: &Value,
        provided_hmac: &str,
    ) -> Result<(), ServiceError> {
        match event_type {
            "TRANSACTION" => {
                self.paymob.validate_hmac(obj, provided_hmac)?;
                self.handle_transaction_event(obj).await
            }
            "TOKEN" => {
                self.paymob.validate_token_hmac(obj, provided_hmac)?;
                self.handle_token_event(obj).await
            }
            other => {
                tracing::warn!("ignoring unknown webhook event type: {}", other);
                Ok(())
            }
        }
    }

    async fn handle_transaction_event(&self, obj: &Value) -> Result<(), ServiceError> {
        let success = obj
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let paymob_order_id = obj
            .get("order")
            .and_then(|o| o.get("id"))
            .and_then(Value::as_i64)
            .ok_or_else(|| ServiceError::Validation("Webhook missing order id".to_string()))?;

        let external_id = paymob_order_id.to_string();

        let settled = if success {
            self.db_client.complete_deposit(&external_id).await?
        } else {
            self.db_client.fail_deposit(&external_id).await?
        };

        match settled {
            Some(tx) => {
                tracing::info!(
                    "deposit {} marked {} via webhook",
                    tx.reference,
                    tx.status.to_str()
                );
            }
            None => {
                // Replayed or unknown callback. Acknowledge without changes.
                tracing::info!(
                    "webhook for paymob order {} matched no pending deposit",
                    external_id
                );
            }
        }

        Ok(())
    }

    async fn handle_token_event(&self, obj: &Value) -> Result<(), ServiceError> {
        let card = extract_tokenized_card(obj)?;
        let user = self.resolve_card_owner(&card).await?;

        self.db_client
            .save_payment_method(user.id, &card.card_type, &card.last_four, "", "", &card.token)
            .await?;

        tracing::info!("saved card ending {} for user {}", card.last_four, user.id);
        Ok(())
    }

    /// The gateway order id links the callback to the deposit we registered,
    /// so it identifies the owner even when the payload email is stale. The
    /// email is only a fallback.
    async fn resolve_card_owner(&self, card: &TokenizedCard) -> Result<User, ServiceError> {
        if let Some(order_id) = &card.gateway_order_id {
            if let Some(transaction) = self
                .db_client
                .get_transaction_by_external_id(order_id)
                .await?
            {
                if let Some(user_id) = transaction.destination_user_id {
                    if let Some(user) = self.db_client.get_user(Some(user_id), None, None).await? {
                        return Ok(user);
                    }
                }
            }
        }

        if let Some(email) = &card.email {
            if let Some(user) = self
                .db_client
                .get_user(None, Some(email.as_str()), None)
                .await?
            {
                return Ok(user);
            }
        }

        Err(ServiceError::NotFound(
            "No user for tokenized card".to_string(),
        ))
    }

    pub async fn get_transactions(
        &self,
        user_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Transaction>, ServiceError> {
        Ok(self
            .db_client
            .get_transactions_for_user(user_id, page, limit)
            .await?)
    }

    pub async fn get_transaction_by_reference(
        &self,
        user_id: Uuid,
        reference: &str,
    ) -> Result<Transaction, ServiceError> {
        let transaction = self
            .db_client
            .get_transaction_by_reference(reference)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Transaction not found".to_string()))?;

        let involved = transaction.source_user_id == Some(user_id)
            || transaction.destination_user_id == Some(user_id);
        if !involved {
            return Err(ServiceError::Forbidden(
                "You are not a party to this transaction".to_string(),
            ));
        }

        Ok(transaction)
    }

    pub async fn list_payment_methods(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PaymentMethod>, ServiceError> {
        Ok(self.db_client.get_payment_methods(user_id).await?)
    }

    pub async fn set_default_payment_method(
        &self,
        user_id: Uuid,
        payment_method_id: Uuid,
    ) -> Result<PaymentMethod, ServiceError> {
        self.db_client
            .set_default_payment_method(user_id, payment_method_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Payment method not found".to_string()))
    }

    pub async fn delete_payment_method(
        &self,
        user_id: Uuid,
        payment_method_id: Uuid,
    ) -> Result<(), ServiceError> {
        let deleted = self
            .db_client
            .delete_payment_method(user_id, payment_method_id)
            .await?;

        if deleted == 0 {
            return Err(ServiceError::NotFound("Payment method not found".to_string()));
        }
        Ok(())
    }
}

/// Card fields pulled out of a TOKEN callback. Only the gateway token and the
/// last four PAN digits survive extraction; the rest of the PAN is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizedCard {
    pub token: String,
    pub gateway_order_id: Option<String>,
    pub email: Option<String>,
    pub card_type: String,
    pub last_four: String,
}

pub fn extract_tokenized_card(obj: &Value) -> Result<TokenizedCard, ServiceError> {
    let token = obj
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServiceError::Validation("Token event missing token".to_string()))?
        .to_string();

    // Paymob sends order_id as a number on some integrations, a string on
    // others.
    let gateway_order_id = match obj.get("order_id") {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    };

    let email = obj
        .get("email")
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    let masked_pan = obj
        .get("masked_pan")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let digits = masked_pan
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>();
    let last_four = if digits.len() > 4 {
        digits[digits.len() - 4..].to_string()
    } else {
        digits
    };

    let card_type = obj
        .get("card_subtype")
        .and_then(Value::as_str)
        .unwrap_or("card")
        .to_string();

    Ok(TokenizedCard {
        token,
        gateway_order_id,
        email,
        card_type,
        last_four,
    })
}

/// Converts an EGP amount to whole piasters. Rejects non-positive amounts
/// and anything finer than two decimal places.
pub fn amount_to_cents(amount: &BigDecimal) -> Result<i64, ServiceError> {
    if amount <= &BigDecimal::from(0u32) {
        return Err(ServiceError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }

    if &amount.with_scale(2) != amount {
        return Err(ServiceError::Validation(
            "Amount cannot have more than two decimal places".to_string(),
        ));
    }

    (amount * BigDecimal::from(100u32))
        .with_scale(0)
        .to_i64()
        .ok_or_else(|| ServiceError::Validation("Amount is too large".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn whole_and_fractional_amounts_convert() {
        assert_eq!(amount_to_cents(&dec("100")).unwrap(), 10000);
        assert_eq!(amount_to_cents(&dec("99.99")).unwrap(), 9999);
        assert_eq!(amount_to_cents(&dec("0.01")).unwrap(), 1);
    }

    #[test]
    fn zero_and_negative_amounts_rejected() {
        assert!(amount_to_cents(&dec("0")).is_err());
        assert!(amount_to_cents(&dec("-5")).is_err());
    }

    #[test]
    fn sub_cent_precision_rejected() {
        assert!(amount_to_cents(&dec("1.005")).is_err());
    }

    use serde_json::json;

    #[test]
    fn token_callback_keeps_gateway_order_id_for_owner_lookup() {
        let numeric = extract_tokenized_card(&json!({
            "token": "tok_1",
            "order_id": 999888,
            "email": "someone@example.com",
            "masked_pan": "xxxx-xxxx-xxxx-2346",
            "card_subtype": "MasterCard",
        }))
        .unwrap();
        assert_eq!(numeric.gateway_order_id.as_deref(), Some("999888"));

        let stringly = extract_tokenized_card(&json!({
            "token": "tok_2",
            "order_id": "999888",
        }))
        .unwrap();
        assert_eq!(stringly.gateway_order_id.as_deref(), Some("999888"));

        let absent = extract_tokenized_card(&json!({ "token": "tok_3" })).unwrap();
        assert_eq!(absent.gateway_order_id, None);
    }

    #[test]
    fn only_the_last_four_pan_digits_survive() {
        let masked = extract_tokenized_card(&json!({
            "token": "tok_1",
            "masked_pan": "xxxx-xxxx-xxxx-2346",
        }))
        .unwrap();
        assert_eq!(masked.last_four, "2346");

        // Even a full PAN in the payload must not reach storage.
        let full_pan = extract_tokenized_card(&json!({
            "token": "tok_1",
            "masked_pan": "5123456789012346",
        }))
        .unwrap();
        assert_eq!(full_pan.last_four, "2346");
    }

    #[test]
    fn token_callback_without_token_is_rejected() {
        assert!(extract_tokenized_card(&json!({ "email": "a@b.c" })).is_err());
        assert!(extract_tokenized_card(&json!({ "token": "" })).is_err());
    }

    #[test]
    fn card_subtype_defaults_when_missing() {
        let card = extract_tokenized_card(&json!({ "token": "tok_1" })).unwrap();
        assert_eq!(card.card_type, "card");
        assert_eq!(card.email, None);
    }
}
