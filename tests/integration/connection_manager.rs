//! Connect-and-test and per-request acquisition against a live server

use crate::common::{acquire, connected_session, test_credentials, test_target};
use healthtrack::DbError;
use healthtrack::db::ConnectionManager;
use healthtrack::session::SessionState;

#[tokio::test]
async fn test_connect_and_test_stores_credentials() {
    let Some((_, session)) = connected_session().await else {
        return;
    };
    let (user, _) = test_credentials();
    assert!(session.is_connected());
    assert_eq!(session.db_user(), Some(user.as_str()));
}

#[tokio::test]
async fn test_wrong_password_clears_session() {
    if connected_session().await.is_none() {
        return;
    }
    let manager = ConnectionManager::new(test_target());
    let (user, pass) = test_credentials();
    let mut session = SessionState::connected(user.as_str(), pass.as_str());

    let result = manager
        .connect_and_test(&mut session, &user, "definitely-not-the-password")
        .await;
    assert!(matches!(result, Err(DbError::ConnectionFailed(_))));
    assert!(!session.is_connected());
    assert_eq!(session.db_user(), None);
}

#[tokio::test]
async fn test_each_request_gets_its_own_connection() {
    let Some((manager, session)) = connected_session().await else {
        return;
    };
    let first = manager.acquire_for(&session).await.unwrap();
    let second = manager.acquire_for(&session).await.unwrap();
    assert!(first.is_connected().await);
    assert!(second.is_connected().await);

    first.close();
    assert!(second.is_connected().await);
}

#[tokio::test]
async fn test_acquire_handle_is_live() {
    let Some(handle) = acquire().await else {
        return;
    };
    assert!(handle.is_connected().await);
}
