use std::sync::Arc;

use uuid::Uuid;

use super::error::ServiceError;
use super::notification::NotificationService;
use crate::db::{DBClient, OrderExt, ReviewExt, UserExt};
use crate::models::ordermodel::{Order, OrderStatus};
use crate::models::reviewmodel::Review;
use crate::models::usermodel::User;

/// The party being reviewed, given who is writing the review. None when the
/// reviewer is not a party to the order.
fn reviewee_for(order: &Order, reviewer_id: Uuid) -> Option<Uuid> {
    if order.client_id == reviewer_id {
        order.technician_id
    } else if order.technician_id == Some(reviewer_id) {
        Some(order.client_id)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct ReviewService {
    db_client: Arc<DBClient>,
    notifications: NotificationService,
}

impl ReviewService {
    pub fn new(db_client: Arc<DBClient>, notifications: NotificationService) -> Self {
        ReviewService {
            db_client,
            notifications,
        }
    }

    /// Either party of a completed order reviews the other, once. Updates
    /// the reviewed party's cached rating in the same call.
    pub async fn submit_review(
        &self,
        reviewer: &User,
        order_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Review, ServiceError> {
        if !(1..=5).contains(&rating) {
            return Err(ServiceError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        if order.order_status != OrderStatus::Completed {
            return Err(ServiceError::Conflict(
                "Only completed orders can be reviewed".to_string(),
            ));
        }

        let reviewee_id = reviewee_for(&order, reviewer.id).ok_or_else(|| {
            ServiceError::Forbidden(
                "Only a party to the order can review it".to_string(),
            )
        })?;

        if self
            .db_client
            .get_review_by_reviewer(order_id, reviewer.id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "You have already reviewed this order".to_string(),
            ));
        }

        let review = self
            .db_client
            .create_review(order_id, reviewer.id, reviewee_id, rating, comment)
            .await?;

        if let Err(e) = self.refresh_rating(reviewee_id).await {
            tracing::warn!("rating refresh failed for {}: {}", reviewee_id, e);
        }

        if let Err(e) = self
            .notifications
            .notify(
                reviewee_id,
                "new_review",
                "New review",
                &format!("You received a {}-star review", rating),
                Some(order_id),
                None,
            )
            .await
        {
            tracing::warn!("notification failed for {}: {}", reviewee_id, e);
        }

        Ok(review)
    }

    pub async fn get_reviews_for_user(
        &self,
        reviewee_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Review>, ServiceError> {
        Ok(self
            .db_client
            .get_reviews_for_user(reviewee_id, page, limit)
            .await?)
    }

    async fn refresh_rating(&self, reviewee_id: Uuid) -> Result<(), ServiceError> {
        let Some(rating) = self.db_client.get_average_rating(reviewee_id).await? else {
            return Ok(());
        };
        let Some(user) = self
            .db_client
            .get_user(Some(reviewee_id), None, None)
            .await?
        else {
            return Ok(());
        };

        self.db_client
            .update_rating_aggregates(reviewee_id, rating, user.num_jobs_completed)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ordermodel::OrderType;
    use chrono::{NaiveDate, Utc};

    fn completed_order(client_id: Uuid, technician_id: Uuid) -> Order {
        Order {
            id: Uuid::new_v4(),
            client_id,
            service_id: Uuid::new_v4(),
            technician_id: Some(technician_id),
            order_type: OrderType::ServiceRequest,
            order_status: OrderStatus::Completed,
            problem_description: "leaking tap".to_string(),
            requested_location: "Nasr City".to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            scheduled_time_start: "09:00".to_string(),
            scheduled_time_end: "11:00".to_string(),
            expected_price: None,
            final_price: None,
            commission_percentage: None,
            platform_commission_amount: None,
            amount_to_technician: None,
            job_start_timestamp: None,
            job_done_timestamp: None,
            job_completion_timestamp: None,
            auto_release_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn client_reviews_the_technician() {
        let client = Uuid::new_v4();
        let technician = Uuid::new_v4();
        let order = completed_order(client, technician);

        assert_eq!(reviewee_for(&order, client), Some(technician));
    }

    #[test]
    fn technician_reviews_the_client() {
        let client = Uuid::new_v4();
        let technician = Uuid::new_v4();
        let order = completed_order(client, technician);

        assert_eq!(reviewee_for(&order, technician), Some(client));
    }

    #[test]
    fn outsiders_have_no_one_to_review() {
        let order = completed_order(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(reviewee_for(&order, Uuid::new_v4()), None);
    }

    #[test]
    fn unassigned_order_leaves_the_client_without_a_reviewee() {
        let client = Uuid::new_v4();
        let mut order = completed_order(client, Uuid::new_v4());
        order.technician_id = None;

        assert_eq!(reviewee_for(&order, client), None);
    }
}
