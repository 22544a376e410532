//! Token lifecycle tests driven by a fixed clock.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use mbrew::{Clock, MinibrewClient, Token};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    fn at(secs: i64) -> Arc<Self> {
        Arc::new(Self(Mutex::new(timestamp(secs))))
    }

    fn set(&self, secs: i64) {
        *self.0.lock().unwrap() = timestamp(secs);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

async fn token_server(expected_calls: u64) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/token/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("fixtures/token_success.json")),
        )
        .expect(expected_calls)
        .mount(&mock_server)
        .await;
    mock_server
}

#[test]
fn test_token_validity_follows_clock() {
    let clock = FixedClock::at(1000);
    let mut client = MinibrewClient::new("test_user", "test_password").with_clock(clock.clone());

    client
        .set_token(Token::new("mock_token", timestamp(2000)))
        .unwrap();
    assert!(client.is_token_valid(), "Token should be valid.");

    clock.set(3000);
    assert!(!client.is_token_valid(), "Token should be expired.");
}

#[tokio::test]
async fn test_valid_token_is_not_renewed() {
    let mock_server = token_server(0).await;
    let clock = FixedClock::at(1000);
    let mut client =
        MinibrewClient::new_with_base_url("test_user", "test_password", mock_server.uri())
            .with_clock(clock.clone());
    client
        .set_token(Token::new("cached_token", timestamp(2000)))
        .unwrap();

    client.ensure_valid_token().await.unwrap();

    assert_eq!(client.auth_header(), Some("Bearer cached_token"));
}

#[tokio::test]
async fn test_expired_token_is_renewed_once() {
    let mock_server = token_server(1).await;
    let clock = FixedClock::at(1000);
    let mut client =
        MinibrewClient::new_with_base_url("test_user", "test_password", mock_server.uri())
            .with_clock(clock.clone());
    client
        .set_token(Token::new("cached_token", timestamp(2000)))
        .unwrap();

    clock.set(3000);
    client.ensure_valid_token().await.unwrap();

    assert_eq!(client.auth_header(), Some("Bearer mock_token"));
    assert_eq!(client.token().unwrap().expires_at(), timestamp(3000 + 3600));

    // Renewed token is valid again, no further exchange
    client.ensure_valid_token().await.unwrap();
}

#[tokio::test]
async fn test_absent_then_expired_token_renews_each_time() {
    let mock_server = token_server(2).await;
    let clock = FixedClock::at(1000);
    let mut client =
        MinibrewClient::new_with_base_url("test_user", "test_password", mock_server.uri())
            .with_clock(clock.clone());

    client.ensure_valid_token().await.unwrap();
    assert_eq!(client.token().unwrap().expires_at(), timestamp(4600));

    clock.set(4600);
    assert!(!client.is_token_valid());
    client.ensure_valid_token().await.unwrap();
    assert_eq!(client.token().unwrap().expires_at(), timestamp(8200));
}
