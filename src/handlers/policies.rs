use axum::{
    extract::{Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::policy::PolicyInput;
use crate::error::ApiError;
use crate::services::policy_service::{DocumentUpload, PolicyDocuments, PolicyError, PolicyService};
use crate::services::storage::SupabaseStorage;

async fn policy_service() -> Result<PolicyService<SupabaseStorage>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    Ok(PolicyService::new(pool, SupabaseStorage::from_config()))
}

/// Pull the policy JSON (field `policy`) and any document slots out of a
/// multipart body. Unknown fields are ignored.
async fn read_policy_multipart(
    multipart: &mut Multipart,
) -> Result<(Option<PolicyInput>, PolicyDocuments), ApiError> {
    let mut input: Option<PolicyInput> = None;
    let mut documents = PolicyDocuments::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "policy" {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Unreadable policy field: {}", e)))?;
            input = Some(
                serde_json::from_str(&text)
                    .map_err(|e| ApiError::invalid_json(format!("Invalid policy JSON: {}", e)))?,
            );
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Unreadable file field '{}': {}", name, e)))?
            .to_vec();

        documents.insert(&name, DocumentUpload { file_name, bytes });
    }

    Ok((input, documents))
}

/// POST /admin/policies - Create a policy together with its documents
///
/// Multipart body: required `policy` JSON field plus optional file fields
/// `contract`, `terms`, `claim_form`, `annexure`. The whole operation is
/// all-or-nothing for the policy record.
pub async fn create_policy(mut multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let (input, documents) = read_policy_multipart(&mut multipart).await?;
    let input = input.ok_or_else(|| ApiError::bad_request("Missing 'policy' field"))?;

    let service = policy_service().await?;
    let policy = service.create_policy_with_documents(input, documents).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": policy })),
    ))
}

/// POST /admin/policies/:id/documents - Attach documents to an existing policy
pub async fn upload_documents(
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let (_, documents) = read_policy_multipart(&mut multipart).await?;
    if documents.is_empty() {
        return Err(ApiError::bad_request("No document fields provided"));
    }

    let service = policy_service().await?;
    let policy = service.upload_documents(id, documents).await?;

    Ok(Json(json!({ "success": true, "data": policy })))
}

/// GET /policies - List all policies
pub async fn list_policies() -> Result<Json<Value>, ApiError> {
    let service = policy_service().await?;
    let policies = service.get_all_policies().await?;
    Ok(Json(json!({ "success": true, "data": policies })))
}

/// GET /policies/active - List policies with status "Active"
pub async fn active_policies() -> Result<Json<Value>, ApiError> {
    let service = policy_service().await?;
    let policies = service.get_active_policies().await?;
    Ok(Json(json!({ "success": true, "data": policies })))
}

/// GET /policies/:id - Fetch one policy
pub async fn get_policy(Path(id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let service = policy_service().await?;
    let policy = service.get_policy(id).await?;
    Ok(Json(json!({ "success": true, "data": policy })))
}

/// PUT /admin/policies/:id - Replace a policy's business fields
pub async fn update_policy(
    Path(id): Path<i64>,
    Json(input): Json<PolicyInput>,
) -> Result<Json<Value>, ApiError> {
    let service = policy_service().await?;
    let policy = service.update_policy(id, input).await?;
    Ok(Json(json!({ "success": true, "data": policy })))
}

/// DELETE /admin/policies/:id
pub async fn delete_policy(Path(id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let service = policy_service().await?;
    match service.delete_policy(id).await {
        Ok(()) => Ok(Json(json!({ "success": true }))),
        Err(PolicyError::NotFound(id)) => Err(ApiError::not_found(format!(
            "Policy not found with id {}",
            id
        ))),
        Err(other) => Err(other.into()),
    }
}
