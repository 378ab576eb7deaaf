use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::disputemodel::Dispute;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct OpenDisputeDto {
    #[validate(length(max = 5000, message = "Argument must be at most 5000 characters"))]
    pub argument: Option<String>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct DisputeArgumentDto {
    #[validate(length(min = 1, max = 5000, message = "Argument must be between 1-5000 characters"))]
    pub argument: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ResolveDisputeDto {
    /// "pay_technician", "refund_client" or "split_payment".
    #[validate(length(min = 1, message = "Resolution is required"))]
    pub resolution: String,

    #[validate(length(max = 5000, message = "Notes must be at most 5000 characters"))]
    pub admin_notes: Option<String>,

    /// Gross amount awarded to the technician for split resolutions.
    pub technician_share: Option<BigDecimal>,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct DisputeQueryDto {
    /// "open", "in_review" or "resolved".
    pub status: Option<String>,
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisputeResponseDto {
    pub status: String,
    pub dispute: Dispute,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisputeListResponseDto {
    pub status: String,
    pub disputes: Vec<Dispute>,
    pub results: usize,
}
