use tracing::{info, instrument, warn};

use crate::error::StoreResult;
use crate::state::AppState;
use crate::users::{NewUser, UserAccount, UserPatch};

/// Creates the account and makes it the current session.
#[instrument(skip(state, new), fields(username = %new.username))]
pub async fn signup(state: &AppState, new: NewUser) -> StoreResult<UserAccount> {
    let user = state.users.create_user(new).await?;
    state.session.set_current_user(&user).await?;
    info!(user_id = %user.id, "signed up");
    Ok(user)
}

/// Returns `None` when no account matches; the session is left as it was.
#[instrument(skip(state, password))]
pub async fn login(
    state: &AppState,
    identifier: &str,
    password: &str,
) -> StoreResult<Option<UserAccount>> {
    let Some(user) = state.users.get_user_by_credentials(identifier, password).await else {
        warn!("invalid credentials");
        return Ok(None);
    };
    state.session.set_current_user(&user).await?;
    info!(user_id = %user.id, "logged in");
    Ok(Some(user))
}

#[instrument(skip(state))]
pub async fn logout(state: &AppState) -> StoreResult<()> {
    state.session.clear_current_user().await?;
    info!("logged out");
    Ok(())
}

pub async fn current_user(state: &AppState) -> Option<UserAccount> {
    state.session.get_current_user().await
}

/// Updates the account and refreshes the session snapshot when it belongs to
/// the same account.
#[instrument(skip(state, patch))]
pub async fn update_profile(
    state: &AppState,
    user_id: &str,
    patch: UserPatch,
) -> StoreResult<UserAccount> {
    let user = state.users.update_user(user_id, patch).await?;
    if let Some(current) = state.session.get_current_user().await {
        if current.id == user.id {
            state.session.set_current_user(&user).await?;
        }
    }
    Ok(user)
}
