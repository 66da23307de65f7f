use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::database::accounts::AccountStore;
use crate::database::manager::DatabaseError;
use crate::database::models::account::{Role, UserStatus};

#[derive(Debug, Error)]
pub enum UserManagementError {
    #[error("{role} not found with id: {id}")]
    UserNotFound { role: String, id: i64 },

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid status transition: {0}")]
    InvalidStatusTransition(String),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Status change request as received from the admin surface:
/// role label + account id + desired status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub role: String,
    pub id: i64,
    pub status: UserStatus,
}

/// Decide whether a status change is legal given the current status.
///
/// TERMINATED is absorbing: a terminated account rejects every requested
/// status, including TERMINATED itself. Any other current status may move
/// to any member of the enumeration, including back to itself.
pub fn validate_transition(
    current: UserStatus,
    _requested: UserStatus,
) -> Result<(), UserManagementError> {
    if current == UserStatus::Terminated {
        return Err(UserManagementError::InvalidStatusTransition(
            "terminated accounts are immutable".to_string(),
        ));
    }
    Ok(())
}

/// Role dispatcher: routes a status change to the account collection of the
/// matching role and applies the guarded transition.
pub struct UserManagementService<S: AccountStore> {
    accounts: S,
}

impl<S: AccountStore> UserManagementService<S> {
    pub fn new(accounts: S) -> Self {
        Self { accounts }
    }

    /// Apply a guarded status change to exactly one account.
    ///
    /// Fails without touching the store when the role label is unknown, the
    /// account is absent, or the account is terminated. Re-applying an
    /// already-held status is allowed and re-persists the record.
    pub async fn update_user_status(
        &self,
        request: &UpdateStatusRequest,
    ) -> Result<(), UserManagementError> {
        let role = Role::from_label(&request.role)
            .ok_or_else(|| UserManagementError::InvalidRole(request.role.to_uppercase()))?;

        let mut account = self
            .accounts
            .find_by_id(role, request.id)
            .await?
            .ok_or_else(|| UserManagementError::UserNotFound {
                role: role.as_str().to_string(),
                id: request.id,
            })?;

        validate_transition(account.status, request.status)?;

        account.status = request.status;
        self.accounts.save(role, &account).await?;

        info!(
            "Updated {} id={} status to {:?}",
            role, request.id, request.status
        );
        Ok(())
    }
}
