//! Identity Commands

use crate::state::AppState;
use crate::utils::error::AppResult;

/// This device's identity token
pub fn whoami(state: &AppState) -> AppResult<String> {
    Ok(state.identity())
}
