use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::servicemodel::{Service, ServiceCategory};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateCategoryDto {
    #[validate(length(min = 2, max = 100, message = "Category name must be between 2-100 characters"))]
    pub category_name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(url(message = "Icon must be a valid URL"))]
    pub icon_url: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateServiceDto {
    pub category_id: Uuid,

    #[validate(length(min = 2, max = 150, message = "Service name must be between 2-150 characters"))]
    pub service_name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 1, message = "Service type is required"))]
    pub service_type: String,

    pub base_inspection_fee: BigDecimal,
    pub estimated_price_min: Option<BigDecimal>,
    pub estimated_price_max: Option<BigDecimal>,
    pub emergency_surcharge_percentage: Option<BigDecimal>,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct ServiceQueryDto {
    pub category_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct QuoteQueryDto {
    pub emergency: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteResponseDto {
    pub status: String,
    pub service_id: Uuid,
    pub emergency: bool,
    pub inspection_fee: BigDecimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponseDto {
    pub status: String,
    pub category: ServiceCategory,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryListResponseDto {
    pub status: String,
    pub categories: Vec<ServiceCategory>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceResponseDto {
    pub status: String,
    pub service: Service,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceListResponseDto {
    pub status: String,
    pub services: Vec<Service>,
    pub results: usize,
}
