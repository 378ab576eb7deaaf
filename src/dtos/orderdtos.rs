use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::ordermodel::{Order, ProjectOffer};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderDto {
    pub service_id: Uuid,

    /// "direct_hire" or "service_request".
    #[validate(length(min = 1, message = "Order type is required"))]
    pub order_type: String,

    /// Required for direct hires.
    pub technician_id: Option<Uuid>,

    #[validate(length(min = 10, max = 2000, message = "Problem description must be between 10-2000 characters"))]
    pub problem_description: String,

    #[validate(length(min = 2, max = 255, message = "Location must be between 2-255 characters"))]
    pub requested_location: String,

    pub scheduled_date: NaiveDate,

    #[validate(length(min = 1, message = "Start time is required"))]
    pub scheduled_time_start: String,

    #[validate(length(min = 1, message = "End time is required"))]
    pub scheduled_time_end: String,

    pub expected_price: Option<BigDecimal>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOfferDto {
    pub offered_price: BigDecimal,

    #[validate(length(max = 1000, message = "Offer description must be at most 1000 characters"))]
    pub offer_description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponseDto {
    pub status: String,
    pub order: Order,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponseDto {
    pub status: String,
    pub orders: Vec<Order>,
    pub results: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OfferResponseDto {
    pub status: String,
    pub offer: ProjectOffer,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OfferListResponseDto {
    pub status: String,
    pub offers: Vec<ProjectOffer>,
    pub results: usize,
}
