//! Integration tests for the Cloudflare zone provider.
//!
//! These tests require valid Cloudflare credentials and are ignored by default.
//! To run them:
//!
//! 1. Create a `.env` file in the project root (see `.env.example`)
//!
//! 2. Run with: `cargo test --features cloudflare -- --ignored --test-threads=1`
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |----------|----------|-------------|
//! | `CF_TOKEN` | Yes | Cloudflare API token with `Zone:Edit` permission |
//! | `CF_ACCOUNT_ID` | No | Account new zones are created under |
//!
//! The lifecycle test creates and deletes the zones for `1-qr.me` and
//! `gitpages.dev`, so the account must not already hold them.

use crate::common::constants::*;

use cfzones::cloudflare::{CloudflareProvider, Credentials};
use cfzones::{
    CreateZone, CreateZoneError, DeleteZone, DeleteZoneError, InitializeError, Provider, Zone,
};

/// Loads credentials from `.env` or the environment.
/// Returns None if credentials are not available.
fn get_credentials() -> Option<Credentials> {
    // Load .env file if present (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();
    let _ = env_logger::builder().is_test(true).try_init();

    Credentials::from_env()
}

async fn get_test_session() -> Option<CloudflareProvider> {
    let credentials = get_credentials()?;
    Some(
        CloudflareProvider::from_credentials(&credentials)
            .await
            .expect("Failed to initialize Cloudflare session"),
    )
}

/// Deletes a zone left over from an earlier run.
async fn cleanup_zone(session: &CloudflareProvider, name: &str) {
    match session.delete_zone(&Zone::new(name)).await {
        Ok(zone) => println!("  Cleaned up leftover zone: {} (ID: {})", zone.name(), zone.id),
        Err(DeleteZoneError::NotFound) => {}
        Err(e) => println!("  Cleanup of {} failed: {:?}", name, e),
    }
}

/// Test that we can authenticate and list zones.
#[tokio::test]
#[ignore = "requires CF_TOKEN in .env"]
async fn test_initialize_and_list_zones() {
    let Some(session) = get_test_session().await else {
        println!("CF_TOKEN not set, skipping");
        return;
    };

    let zones = session.list_zones().await.expect("Failed to list zones");
    println!("Found {} zones", zones.len());
    for zone in &zones {
        println!("  - {} (ID: {}, {})", zone.name(), zone.id, zone.status);
    }
}

/// Test that authentication failure is handled properly.
#[tokio::test]
async fn test_invalid_token() {
    let result = CloudflareProvider::initialize("invalid_api_token").await;

    // Offline runs fail with a transport error instead
    assert!(result.is_err(), "Expected error with invalid token");
    if let Err(InitializeError::Custom(e)) = &result {
        println!("Token check did not reach Cloudflare: {}", e);
    }
}

/// Create, duplicate, refuse, list and delete against the live account.
#[tokio::test]
#[ignore = "requires CF_TOKEN in .env"]
async fn test_zone_lifecycle() {
    let Some(session) = get_test_session().await else {
        println!("CF_TOKEN not set, skipping");
        return;
    };

    cleanup_zone(&session, REAL_DOMAIN_1).await;
    cleanup_zone(&session, REAL_DOMAIN_2).await;

    let first = session
        .create_zone(&Zone::new(REAL_DOMAIN_1))
        .await
        .expect("Failed to create first zone");
    println!("Created {} (ID: {})", first.name(), first.id);

    let duplicate = session.create_zone(&Zone::new(REAL_DOMAIN_1)).await;
    assert!(
        matches!(duplicate, Err(CreateZoneError::AlreadyExists)),
        "Expected AlreadyExists, got {:?}",
        duplicate
    );

    let fake = session.create_zone(&Zone::new(FAKE_DOMAIN)).await;
    assert!(
        matches!(fake, Err(CreateZoneError::InvalidDomainName)),
        "Expected InvalidDomainName, got {:?}",
        fake
    );

    let second = session
        .create_zone(&Zone::new(REAL_DOMAIN_2))
        .await
        .expect("Failed to create second zone");

    let names = session
        .list_zones()
        .await
        .expect("Failed to list zones")
        .name_set();
    assert!(names.contains(REAL_DOMAIN_1));
    assert!(names.contains(REAL_DOMAIN_2));
    assert!(!names.contains(FAKE_DOMAIN));

    session
        .delete_zone(&Zone::new(REAL_DOMAIN_1))
        .await
        .expect("Failed to delete first zone");
    session
        .delete_zone(&second)
        .await
        .expect("Failed to delete second zone");

    let again = session.delete_zone(&Zone::new(REAL_DOMAIN_1)).await;
    assert!(
        matches!(again, Err(DeleteZoneError::NotFound)),
        "Expected NotFound, got {:?}",
        again
    );
}
