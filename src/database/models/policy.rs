use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored policy record, including whichever document URLs have been
/// attached so far. URL slots stay NULL until an upload succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Policy {
    pub id: i64,
    pub policy_number: String,
    pub policy_name: String,
    pub policy_type: String,
    pub provider_name: String,
    pub coverage_amount: Decimal,
    pub monthly_premium: Decimal,
    pub start_date: NaiveDate,
    pub renewal_date: NaiveDate,
    pub policy_status: String,
    pub policy_description: Option<String>,
    pub contract_url: Option<String>,
    pub terms_url: Option<String>,
    pub claim_form_url: Option<String>,
    pub annexure_url: Option<String>,
}

/// Policy fields accepted on create/update. The id is store-assigned and
/// document URLs are only ever set by the upload flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyInput {
    pub policy_number: String,
    pub policy_name: String,
    pub policy_type: String,
    pub provider_name: String,
    pub coverage_amount: Decimal,
    pub monthly_premium: Decimal,
    pub start_date: NaiveDate,
    pub renewal_date: NaiveDate,
    pub policy_status: String,
    pub policy_description: Option<String>,
}
