#[cfg(test)]
#[path = "relogin_test.rs"]
mod tests;

use std::future::Future;

use anyhow::Result;

use crate::domain::models::ApiError;

pub const MAX_LOGIN_ATTEMPTS: usize = 3;

pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    return matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::Unauthorized(_))
    );
}

/// Runs `op`, and when the server rejects the session runs `login` and tries
/// again. Other errors, and rejections past [`MAX_LOGIN_ATTEMPTS`], are
/// returned as is.
pub async fn retry_after_login<T, Op, OpFut, Login, LoginFut>(
    mut op: Op,
    mut login: Login,
) -> Result<T>
where
    Op: FnMut() -> OpFut,
    OpFut: Future<Output = Result<T>>,
    Login: FnMut() -> LoginFut,
    LoginFut: Future<Output = Result<()>>,
{
    let mut attempts = 0;
    loop {
        match op().await {
            Err(err) if is_unauthorized(&err) && attempts < MAX_LOGIN_ATTEMPTS => {
                attempts += 1;
                tracing::info!(attempts = attempts, "Session rejected, logging in again");
                login().await?;
            }
            res => return res,
        }
    }
}
