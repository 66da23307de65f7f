use axum::response::Json;
use serde_json::{json, Value};

use crate::database::accounts::PgAccountStore;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::services::user_management::{UpdateStatusRequest, UserManagementService};

/// PUT /admin/users/status - Change an account's lifecycle status
///
/// Body: `{ "role": "EMPLOYEE" | "AGENT" | "HR", "id": 7, "status": "SUSPENDED" }`
///
/// The role label routes to the matching account collection; terminated
/// accounts reject every change.
pub async fn update_status(
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let service = UserManagementService::new(PgAccountStore::new(pool));

    service.update_user_status(&request).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "id": request.id,
            "status": request.status
        }
    })))
}
