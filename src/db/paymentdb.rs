use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::ordermodel::{Order, OrderStatus};
use crate::models::paymentmodel::{PaymentMethod, Transaction, TransactionType};

const TRANSACTION_COLUMNS: &str = r#"
    id, source_user_id, destination_user_id, order_id, dispute_id,
    transaction_type, amount, currency, status, reference, external_id,
    created_at
"#;

const PAYMENT_METHOD_COLUMNS: &str = r#"
    id, user_id, card_type, last_four_digits, expiry_month, expiry_year,
    card_token, is_default, created_at, updated_at
"#;

const ORDER_COLUMNS: &str = r#"
    id, client_id, service_id, technician_id, order_type, order_status,
    problem_description, requested_location, scheduled_date,
    scheduled_time_start, scheduled_time_end, expected_price, final_price,
    commission_percentage, platform_commission_amount, amount_to_technician,
    job_start_timestamp, job_done_timestamp, job_completion_timestamp,
    auto_release_date, created_at, updated_at
"#;

#[async_trait]
pub trait PaymentExt {
    async fn create_pending_deposit(
        &self,
        user_id: Uuid,
        amount: BigDecimal,
        currency: &str,
        reference: &str,
    ) -> Result<Transaction, sqlx::Error>;

    async fn set_transaction_external_id(
        &self,
        transaction_id: Uuid,
        external_id: &str,
    ) -> Result<(), sqlx::Error>;

    /// Completes a pending deposit and credits the wallet in one transaction.
    /// The pending-status predicate makes a replayed webhook a no-op.
    async fn complete_deposit(
        &self,
        external_id: &str,
    ) -> Result<Option<Transaction>, sqlx::Error>;

    async fn fail_deposit(&self, external_id: &str) -> Result<Option<Transaction>, sqlx::Error>;

    async fn get_transaction_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transaction>, sqlx::Error>;

    async fn get_transaction_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Transaction>, sqlx::Error>;

    async fn get_transactions_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Transaction>, sqlx::Error>;

    /// Moves funds from the client's available balance into escrow. Returns
    /// None when the balance predicate fails, leaving everything untouched.
    async fn hold_escrow(
        &self,
        client_id: Uuid,
        order_id: Uuid,
        amount: BigDecimal,
        reference: &str,
    ) -> Result<Option<Transaction>, sqlx::Error>;

    /// Undoes a hold without touching the order. Used when an order update
    /// loses the race after funds were already moved.
    async fn release_hold(
        &self,
        client_id: Uuid,
        order_id: Uuid,
        amount: BigDecimal,
        reference: &str,
    ) -> Result<(), sqlx::Error>;

    /// Returns escrowed funds to the client and moves the order to `to`.
    /// Used for cancellations and dispute refunds.
    #[allow(clippy::too_many_arguments)]
    async fn refund_escrow_to_client(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        client_id: Uuid,
        amount: BigDecimal,
        transaction_type: TransactionType,
        dispute_id: Option<Uuid>,
        reference: &str,
    ) -> Result<Option<Order>, sqlx::Error>;

    /// Pays the technician's pending balance out of escrow, books the
    /// platform fee and completes the order, all atomically. `payout` +
    /// `commission` must equal `total`.
    #[allow(clippy::too_many_arguments)]
    async fn release_escrow_to_technician(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        client_id: Uuid,
        technician_id: Uuid,
        total: BigDecimal,
        commission_percentage: BigDecimal,
        commission: BigDecimal,
        payout: BigDecimal,
        transaction_type: TransactionType,
        dispute_id: Option<Uuid>,
        payout_reference: &str,
        fee_reference: &str,
    ) -> Result<Option<Order>, sqlx::Error>;

    /// Dispute split: part of the escrow to the technician (minus the
    /// commission on that part), the rest back to the client.
    #[allow(clippy::too_many_arguments)]
    async fn split_escrow(
        &self,
        order_id: Uuid,
        client_id: Uuid,
        technician_id: Uuid,
        total: BigDecimal,
        commission_percentage: BigDecimal,
        commission: BigDecimal,
        technician_net: BigDecimal,
        client_refund: BigDecimal,
        dispute_id: Uuid,
        payout_reference: &str,
        fee_reference: &str,
        refund_reference: &str,
    ) -> Result<Option<Order>, sqlx::Error>;

    #[allow(clippy::too_many_arguments)]
    async fn save_payment_method(
        &self,
        user_id: Uuid,
        card_type: &str,
        last_four_digits: &str,
        expiry_month: &str,
        expiry_year: &str,
        card_token: &str,
    ) -> Result<PaymentMethod, sqlx::Error>;

    async fn get_payment_methods(&self, user_id: Uuid)
        -> Result<Vec<PaymentMethod>, sqlx::Error>;

    async fn get_default_payment_method(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PaymentMethod>, sqlx::Error>;

    async fn set_default_payment_method(
        &self,
        user_id: Uuid,
        payment_method_id: Uuid,
    ) -> Result<Option<PaymentMethod>, sqlx::Error>;

    async fn delete_payment_method(
        &self,
        user_id: Uuid,
        payment_method_id: Uuid,
    ) -> Result<u64, sqlx::Error>;
}

#[async_trait]
impl PaymentExt for DBClient {
    async fn create_pending_deposit(
        &self,
        user_id: Uuid,
        amount: BigDecimal,
        currency: &str,
        reference: &str,
    ) -> Result<Transaction, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO transactions
                (destination_user_id, transaction_type, amount, currency, status, reference)
            VALUES ($1, 'deposit'::transaction_type, $2, $3, 'pending'::transaction_status, $4)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Transaction>(&query)
            .bind(user_id)
            .bind(amount)
            .bind(currency)
            .bind(reference)
            .fetch_one(&self.pool)
            .await
    }

    async fn set_transaction_external_id(
        &self,
        transaction_id: Uuid,
        external_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE transactions SET external_id = $2 WHERE id = $1")
            .bind(transaction_id)
            .bind(external_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn complete_deposit(
        &self,
        external_id: &str,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            UPDATE transactions
            SET status = 'completed'::transaction_status
            WHERE external_id = $1
              AND transaction_type = 'deposit'::transaction_type
              AND status = 'pending'::transaction_status
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );

        let deposit = sqlx::query_as::<_, Transaction>(&query)
            .bind(external_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(deposit) = deposit else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE users
            SET available_balance = available_balance + $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(deposit.destination_user_id)
        .bind(deposit.amount.clone())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(deposit))
    }

    async fn fail_deposit(&self, external_id: &str) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE transactions
            SET status = 'failed'::transaction_status
            WHERE external_id = $1
              AND transaction_type = 'deposit'::transaction_type
              AND status = 'pending'::transaction_status
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Transaction>(&query)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_transaction_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE reference = $1");

        sqlx::query_as::<_, Transaction>(&query)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_transaction_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE external_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#
        );

        sqlx::query_as::<_, Transaction>(&query)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_transactions_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;
        let query = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE source_user_id = $1 OR destination_user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        sqlx::query_as::<_, Transaction>(&query)
            .bind(user_id)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn hold_escrow(
        &self,
        client_id: Uuid,
        order_id: Uuid,
        amount: BigDecimal,
        reference: &str,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let moved = sqlx::query(
            r#"
            UPDATE users
            SET available_balance = available_balance - $2,
                in_escrow_balance = in_escrow_balance + $2,
                updated_at = NOW()
            WHERE id = $1 AND available_balance >= $2
            "#,
        )
        .bind(client_id)
        .bind(amount.clone())
        .execute(&mut *tx)
        .await?;

        if moved.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            r#"
            INSERT INTO transactions
                (source_user_id, order_id, transaction_type, amount, currency, status, reference)
            VALUES ($1, $2, 'escrow_hold'::transaction_type, $3, 'EGP',
                    'completed'::transaction_status, $4)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );

        let hold = sqlx::query_as::<_, Transaction>(&query)
            .bind(client_id)
            .bind(order_id)
            .bind(amount)
            .bind(reference)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(hold))
    }

    async fn release_hold(
        &self,
        client_id: Uuid,
        order_id: Uuid,
        amount: BigDecimal,
        reference: &str,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE users
            SET in_escrow_balance = in_escrow_balance - $2,
                available_balance = available_balance + $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(client_id)
        .bind(amount.clone())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO transactions
                (destination_user_id, order_id, transaction_type, amount, currency,
                 status, reference)
            VALUES ($1, $2, 'cancel_refund'::transaction_type, $3, 'EGP',
                    'completed'::transaction_status, $4)
            "#,
        )
        .bind(client_id)
        .bind(order_id)
        .bind(amount)
        .bind(reference)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn refund_escrow_to_client(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        client_id: Uuid,
        amount: BigDecimal,
        transaction_type: TransactionType,
        dispute_id: Option<Uuid>,
        reference: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            UPDATE orders
            SET order_status = $3, updated_at = NOW()
            WHERE id = $1 AND order_status = $2
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .bind(from)
            .bind(to)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = order else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE users
            SET in_escrow_balance = in_escrow_balance - $2,
                available_balance = available_balance + $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(client_id)
        .bind(amount.clone())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO transactions
                (destination_user_id, order_id, dispute_id, transaction_type,
                 amount, currency, status, reference)
            VALUES ($1, $2, $3, $4, $5, 'EGP', 'completed'::transaction_status, $6)
            "#,
        )
        .bind(client_id)
        .bind(order_id)
        .bind(dispute_id)
        .bind(transaction_type)
        .bind(amount)
        .bind(reference)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(order))
    }

    async fn release_escrow_to_technician(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        client_id: Uuid,
        technician_id: Uuid,
        total: BigDecimal,
        commission_percentage: BigDecimal,
        commission: BigDecimal,
        payout: BigDecimal,
        transaction_type: TransactionType,
        dispute_id: Option<Uuid>,
        payout_reference: &str,
        fee_reference: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            UPDATE orders
            SET order_status = 'completed'::order_status,
                commission_percentage = $3,
                platform_commission_amount = $4,
                amount_to_technician = $5,
                job_completion_timestamp = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND order_status = $2
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .bind(from)
            .bind(commission_percentage)
            .bind(commission.clone())
            .bind(payout.clone())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = order else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE users
            SET in_escrow_balance = in_escrow_balance - $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(client_id)
        .bind(total)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET pending_balance = pending_balance + $2,
                num_jobs_completed = num_jobs_completed + 1,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(technician_id)
        .bind(payout.clone())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO transactions
                (source_user_id, destination_user_id, order_id, dispute_id,
                 transaction_type, amount, currency, status, reference)
            VALUES ($1, $2, $3, $4, $5, $6, 'EGP', 'completed'::transaction_status, $7)
            "#,
        )
        .bind(client_id)
        .bind(technician_id)
        .bind(order_id)
        .bind(dispute_id)
        .bind(transaction_type)
        .bind(payout)
        .bind(payout_reference)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO transactions
                (source_user_id, order_id, dispute_id, transaction_type,
                 amount, currency, status, reference)
            VALUES ($1, $2, $3, 'platform_fee'::transaction_type, $4, 'EGP',
                    'completed'::transaction_status, $5)
            "#,
        )
        .bind(client_id)
        .bind(order_id)
        .bind(dispute_id)
        .bind(commission)
        .bind(fee_reference)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(order))
    }

    async fn split_escrow(
        &self,
        order_id: Uuid,
        client_id: Uuid,
        technician_id: Uuid,
        total: BigDecimal,
        commission_percentage: BigDecimal,
        commission: BigDecimal,
        technician_net: BigDecimal,
        client_refund: BigDecimal,
        dispute_id: Uuid,
        payout_reference: &str,
        fee_reference: &str,
        refund_reference: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            UPDATE orders
            SET order_status = 'completed'::order_status,
                commission_percentage = $2,
                platform_commission_amount = $3,
                amount_to_technician = $4,
                job_completion_timestamp = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND order_status = 'disputed'::order_status
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .bind(commission_percentage)
            .bind(commission.clone())
            .bind(technician_net.clone())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = order else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE users
            SET in_escrow_balance = in_escrow_balance - $2,
                available_balance = available_balance + $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(client_id)
        .bind(total)
        .bind(client_refund.clone())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET pending_balance = pending_balance + $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(technician_id)
        .bind(technician_net.clone())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO transactions
                (source_user_id, destination_user_id, order_id, dispute_id,
                 transaction_type, amount, currency, status, reference)
            VALUES ($1, $2, $3, $4, 'dispute_payout'::transaction_type, $5, 'EGP',
                    'completed'::transaction_status, $6)
            "#,
        )
        .bind(client_id)
        .bind(technician_id)
        .bind(order_id)
        .bind(dispute_id)
        .bind(technician_net)
        .bind(payout_reference)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO transactions
                (source_user_id, order_id, dispute_id, transaction_type,
                 amount, currency, status, reference)
            VALUES ($1, $2, $3, 'platform_fee'::transaction_type, $4, 'EGP',
                    'completed'::transaction_status, $5)
            "#,
        )
        .bind(client_id)
        .bind(order_id)
        .bind(dispute_id)
        .bind(commission)
        .bind(fee_reference)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO transactions
                (destination_user_id, order_id, dispute_id, transaction_type,
                 amount, currency, status, reference)
            VALUES ($1, $2, $3, 'dispute_refund'::transaction_type, $4, 'EGP',
                    'completed'::transaction_status, $5)
            "#,
        )
        .bind(client_id)
        .bind(order_id)
        .bind(dispute_id)
        .bind(client_refund)
        .bind(refund_reference)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(order))
    }

    async fn save_payment_method(
        &self,
        user_id: Uuid,
        card_type: &str,
        last_four_digits: &str,
        expiry_month: &str,
        expiry_year: &str,
        card_token: &str,
    ) -> Result<PaymentMethod, sqlx::Error> {
        // A re-tokenized card (new gateway token, same physical card) keys on
        // (user, brand, last four) and just refreshes the token.
        let query = format!(
            r#"
            INSERT INTO payment_methods
                (user_id, card_type, last_four_digits, expiry_month, expiry_year,
                 card_token, is_default)
            VALUES ($1, $2, $3, $4, $5, $6,
                    NOT EXISTS (SELECT 1 FROM payment_methods WHERE user_id = $1))
            ON CONFLICT (user_id, card_type, last_four_digits) DO UPDATE
            SET card_token = EXCLUDED.card_token,
                expiry_month = EXCLUDED.expiry_month,
                expiry_year = EXCLUDED.expiry_year,
                updated_at = NOW()
            RETURNING {PAYMENT_METHOD_COLUMNS}
            "#
        );

        sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(user_id)
            .bind(card_type)
            .bind(last_four_digits)
            .bind(expiry_month)
            .bind(expiry_year)
            .bind(card_token)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_payment_methods(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PaymentMethod>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {PAYMENT_METHOD_COLUMNS}
            FROM payment_methods
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC
            "#
        );

        sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_default_payment_method(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PaymentMethod>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {PAYMENT_METHOD_COLUMNS}
            FROM payment_methods
            WHERE user_id = $1 AND is_default = true
            "#
        );

        sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn set_default_payment_method(
        &self,
        user_id: Uuid,
        payment_method_id: Uuid,
    ) -> Result<Option<PaymentMethod>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE payment_methods SET is_default = false, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            r#"
            UPDATE payment_methods
            SET is_default = true, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {PAYMENT_METHOD_COLUMNS}
            "#
        );

        let method = sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(payment_method_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        if method.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(method)
    }

    async fn delete_payment_method(
        &self,
        user_id: Uuid,
        payment_method_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = $1 AND user_id = $2")
            .bind(payment_method_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
