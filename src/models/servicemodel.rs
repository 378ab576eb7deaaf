use bigdecimal::BigDecimal;
use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct ServiceCategory {
    pub id: Uuid,
    pub category_name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Service {
    pub id: Uuid,
    pub category_id: Uuid,
    pub service_name: String,
    pub description: Option<String>,
    pub service_type: String,
    pub base_inspection_fee: BigDecimal,
    pub estimated_price_min: Option<BigDecimal>,
    pub estimated_price_max: Option<BigDecimal>,
    pub emergency_surcharge_percentage: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
}

impl Service {
    /// Quote for an emergency call-out: inspection fee plus the service's
    /// surcharge percentage, rounded to two decimal places.
    pub fn emergency_quote(&self) -> BigDecimal {
        let fee = self.base_inspection_fee.clone();
        match &self.emergency_surcharge_percentage {
            Some(pct) => {
                let surcharge = (&fee * pct) / BigDecimal::from(100);
                (fee + surcharge).with_scale(2)
            }
            None => fee.with_scale(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn service_with_surcharge(pct: Option<&str>) -> Service {
        Service {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            service_name: "AC repair".to_string(),
            description: None,
            service_type: "repair".to_string(),
            base_inspection_fee: BigDecimal::from_str("200.00").unwrap(),
            estimated_price_min: None,
            estimated_price_max: None,
            emergency_surcharge_percentage: pct.map(|p| BigDecimal::from_str(p).unwrap()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn emergency_quote_applies_surcharge() {
        let service = service_with_surcharge(Some("25.00"));
        assert_eq!(service.emergency_quote(), BigDecimal::from_str("250.00").unwrap());
    }

    #[test]
    fn emergency_quote_without_surcharge_is_base_fee() {
        let service = service_with_surcharge(None);
        assert_eq!(service.emergency_quote(), BigDecimal::from_str("200.00").unwrap());
    }
}
