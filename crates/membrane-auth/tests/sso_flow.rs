//! End-to-end handshake against keys stored on disk.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Harness, NOW, token_param};
use membrane_auth::prelude::*;
use url::Url;

const TTL: Duration = Duration::from_secs(600);

fn crm_claims() -> TokenClaims {
    TokenClaims::new()
        .with("app_id", "crm")
        .with("redirect_url", "https://crm.example/callback")
        .with("exp", NOW + 300)
}

#[test]
fn client_login_redirects_to_frontend() {
    let h = Harness::new();
    let token = h.client_token(&crm_claims());
    let frontend = Url::parse("https://sso.example/login").unwrap();

    let target = h.verifier.login_redirect(&token, &frontend).unwrap();
    assert_eq!(target.host_str(), Some("sso.example"));
    assert_eq!(token_param(&target), token);
}

#[test]
fn client_with_unregistered_app_id() {
    let h = Harness::new();
    let token = h.client_token(&crm_claims().with("app_id", "billing"));

    assert!(matches!(
        h.verifier.verify(&token),
        Err(SsoError::PublicKeyNotFound { .. })
    ));
}

#[test]
fn client_app_id_cannot_escape_key_directory() {
    let h = Harness::new();
    // The server public key lives one level up from the client directory.
    let token = h.client_token(&crm_claims().with("app_id", "../server/public"));

    assert!(matches!(
        h.verifier.verify(&token),
        Err(SsoError::PublicKeyNotFound { .. })
    ));
}

#[test]
fn client_token_signed_by_server_key_is_rejected() {
    let h = Harness::new();
    let token = TokenCodec::new(common::token_config())
        .encode(&crm_claims(), &common::server_keys().private_key)
        .unwrap();

    let err = h.verifier.verify_for_login(&token).unwrap_err();
    assert!(matches!(err, SsoError::InvalidClientToken { .. }));
    assert!(matches!(err.root_cause(), SsoError::InvalidToken { .. }));
}

#[test]
fn client_tokens_are_reusable() {
    let h = Harness::new();
    let token = h.client_token(&crm_claims());

    assert!(h.verifier.verify(&token).is_ok());
    assert!(h.verifier.verify(&token).is_ok());
}

#[tokio::test]
async fn email_flow_consumes_token_once() {
    let h = Harness::new();
    let link = h
        .email
        .issue("user@example.com", "https://crm.example/welcome", TTL)
        .unwrap();
    assert_eq!(link.path(), "/authenticate");
    let token = token_param(&link);

    let target = h.email.verify_and_consume(&token).await.unwrap();
    assert_eq!(target.path(), "/welcome");
    assert_eq!(token_param(&target), token);
    assert_eq!(h.blacklist.len().await.unwrap(), 1);

    assert!(matches!(
        h.email.verify_and_consume(&token).await,
        Err(SsoError::BlacklistedToken)
    ));
}

#[tokio::test]
async fn email_token_expires_after_ttl() {
    let h = Harness::new();
    let token = h
        .email
        .issue_token("user@example.com", "https://crm.example/welcome", TTL)
        .unwrap();

    h.clock.advance(TTL.as_secs() as i64 + 1);
    let err = h.email.verify_with_fallback(&token).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_email_token");
    assert!(matches!(err.root_cause(), SsoError::TokenExpired { .. }));
}

#[tokio::test]
async fn client_token_is_not_an_email_token() {
    let h = Harness::new();
    let token = h.client_token(&crm_claims());

    let err = h.email.verify_with_fallback(&token).await.unwrap_err();
    assert!(matches!(err.root_cause(), SsoError::InvalidToken { .. }));
    assert_eq!(h.blacklist.len().await.unwrap(), 0);
}

#[tokio::test]
async fn second_click_restarts_sign_in() {
    let h = Harness::new();
    let token = h
        .email
        .issue_token("user@example.com", "https://crm.example/welcome", TTL)
        .unwrap();

    let first = h.email.verify_with_fallback(&token).await.unwrap();
    assert!(first.is_verified());

    let second = h.email.verify_with_fallback(&token).await.unwrap();
    assert_eq!(
        second,
        EmailRedirect::Restart(Url::parse("https://crm.example/welcome").unwrap())
    );
    assert_eq!(h.blacklist.len().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_consumption_has_single_winner() {
    let h = Harness::new();
    let token = h
        .email
        .issue_token("user@example.com", "https://crm.example/welcome", TTL)
        .unwrap();
    let email = Arc::new(h.email);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let email = email.clone();
            let token = token.clone();
            tokio::spawn(async move { email.verify_and_consume(&token).await })
        })
        .collect();

    let mut verified = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => verified += 1,
            Err(SsoError::BlacklistedToken) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(verified, 1);
    assert_eq!(h.blacklist.len().await.unwrap(), 1);
}

#[tokio::test]
async fn missing_server_key_is_reported() {
    let h = Harness::new();
    std::fs::remove_file(h.keys.store.server_private_key_path()).unwrap();

    assert!(matches!(
        h.email
            .issue_token("user@example.com", "https://crm.example/welcome", TTL),
        Err(SsoError::PrivateKeyNotFound { .. })
    ));
}
