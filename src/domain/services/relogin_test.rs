use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use anyhow::bail;
use anyhow::Result;
use serde_json::json;

use super::is_unauthorized;
use super::retry_after_login;
use super::MAX_LOGIN_ATTEMPTS;
use crate::configuration::ClientSettings;
use crate::domain::models::ApiError;
use crate::domain::services::UserStore;
use crate::infrastructure::api::ApiManager;

#[tokio::test]
async fn it_logs_in_again_when_an_order_query_is_rejected() -> Result<()> {
    let mut server = mockito::Server::new();
    let rejected = server
        .mock("POST", "/api/order/query-order")
        .match_header("authorization", "Bearer expired")
        .with_status(401)
        .create();
    let accepted = server
        .mock("POST", "/api/order/query-order")
        .match_header("authorization", "Bearer fresh")
        .with_status(200)
        .with_body(
            json!({
                "code": 0,
                "message": "success",
                "data": { "order_id": "order-1", "status": 502 }
            })
            .to_string(),
        )
        .create();

    let settings = ClientSettings {
        api_url: server.url(),
        ..ClientSettings::default()
    };
    let user = UserStore::default();
    user.init("expired");
    let api = ApiManager::get(&settings, user.clone());
    let logins = AtomicUsize::new(0);

    let api_ref = &api;
    let user_ref = &user;
    let logins_ref = &logins;
    let order = retry_after_login(
        move || return api_ref.query_order("order-1"),
        move || {
            return async move {
                logins_ref.fetch_add(1, Ordering::SeqCst);
                user_ref.init("fresh");
                return Ok(());
            };
        },
    )
    .await?;

    rejected.assert();
    accepted.assert();
    assert!(order.is_paid());
    assert_eq!(logins.load(Ordering::SeqCst), 1);
    assert_eq!(user.token(), "fresh");

    return Ok(());
}

#[tokio::test]
async fn it_passes_other_errors_through() {
    let logins = AtomicUsize::new(0);
    let logins_ref = &logins;

    let res: Result<()> = retry_after_login(
        || {
            return async {
                bail!("boom");
            };
        },
        move || {
            return async move {
                logins_ref.fetch_add(1, Ordering::SeqCst);
                return Ok(());
            };
        },
    )
    .await;

    assert!(res.is_err());
    assert!(!is_unauthorized(&res.unwrap_err()));
    assert_eq!(logins.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn it_gives_up_after_repeated_rejections() {
    let logins = AtomicUsize::new(0);
    let logins_ref = &logins;

    let res: Result<()> = retry_after_login(
        || {
            return async {
                bail!(ApiError::Unauthorized("401 Unauthorized".to_string()));
            };
        },
        move || {
            return async move {
                logins_ref.fetch_add(1, Ordering::SeqCst);
                return Ok(());
            };
        },
    )
    .await;

    assert!(is_unauthorized(&res.unwrap_err()));
    assert_eq!(logins.load(Ordering::SeqCst), MAX_LOGIN_ATTEMPTS);
}
