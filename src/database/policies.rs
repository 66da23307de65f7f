use sqlx::PgExecutor;

use crate::database::manager::DatabaseError;
use crate::database::models::policy::{Policy, PolicyInput};

const POLICY_COLUMNS: &str = "id, policy_number, policy_name, policy_type, provider_name, \
     coverage_amount, monthly_premium, start_date, renewal_date, policy_status, \
     policy_description, contract_url, terms_url, claim_form_url, annexure_url";

/// Insert a new policy record and return it with its store-assigned id.
/// Document URL slots start out NULL.
pub async fn insert_policy<'e>(
    executor: impl PgExecutor<'e>,
    input: &PolicyInput,
) -> Result<Policy, DatabaseError> {
    let query = format!(
        "INSERT INTO policies
            (policy_number, policy_name, policy_type, provider_name,
             coverage_amount, monthly_premium, start_date, renewal_date,
             policy_status, policy_description)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {POLICY_COLUMNS}"
    );

    let policy = sqlx::query_as::<_, Policy>(&query)
        .bind(&input.policy_number)
        .bind(&input.policy_name)
        .bind(&input.policy_type)
        .bind(&input.provider_name)
        .bind(input.coverage_amount)
        .bind(input.monthly_premium)
        .bind(input.start_date)
        .bind(input.renewal_date)
        .bind(&input.policy_status)
        .bind(&input.policy_description)
        .fetch_one(executor)
        .await?;

    Ok(policy)
}

/// Replace every mutable field of an existing policy, including the
/// document URL slots.
pub async fn update_policy<'e>(
    executor: impl PgExecutor<'e>,
    policy: &Policy,
) -> Result<Policy, DatabaseError> {
    let query = format!(
        "UPDATE policies SET
            policy_number = $2, policy_name = $3, policy_type = $4, provider_name = $5,
            coverage_amount = $6, monthly_premium = $7, start_date = $8, renewal_date = $9,
            policy_status = $10, policy_description = $11,
            contract_url = $12, terms_url = $13, claim_form_url = $14, annexure_url = $15
         WHERE id = $1
         RETURNING {POLICY_COLUMNS}"
    );

    let updated = sqlx::query_as::<_, Policy>(&query)
        .bind(policy.id)
        .bind(&policy.policy_number)
        .bind(&policy.policy_name)
        .bind(&policy.policy_type)
        .bind(&policy.provider_name)
        .bind(policy.coverage_amount)
        .bind(policy.monthly_premium)
        .bind(policy.start_date)
        .bind(policy.renewal_date)
        .bind(&policy.policy_status)
        .bind(&policy.policy_description)
        .bind(&policy.contract_url)
        .bind(&policy.terms_url)
        .bind(&policy.claim_form_url)
        .bind(&policy.annexure_url)
        .fetch_one(executor)
        .await?;

    Ok(updated)
}

pub async fn find_policy<'e>(
    executor: impl PgExecutor<'e>,
    id: i64,
) -> Result<Option<Policy>, DatabaseError> {
    let query = format!("SELECT {POLICY_COLUMNS} FROM policies WHERE id = $1");

    let policy = sqlx::query_as::<_, Policy>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(policy)
}

pub async fn list_policies<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Policy>, DatabaseError> {
    let query = format!("SELECT {POLICY_COLUMNS} FROM policies ORDER BY id");

    let policies = sqlx::query_as::<_, Policy>(&query)
        .fetch_all(executor)
        .await?;

    Ok(policies)
}

pub async fn list_policies_by_status<'e>(
    executor: impl PgExecutor<'e>,
    status: &str,
) -> Result<Vec<Policy>, DatabaseError> {
    let query = format!("SELECT {POLICY_COLUMNS} FROM policies WHERE policy_status = $1 ORDER BY id");

    let policies = sqlx::query_as::<_, Policy>(&query)
        .bind(status)
        .fetch_all(executor)
        .await?;

    Ok(policies)
}

/// Delete a policy row. Returns whether a row was removed.
pub async fn delete_policy<'e>(
    executor: impl PgExecutor<'e>,
    id: i64,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM policies WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
