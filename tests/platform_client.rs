//! Platform helpers routed through the executor, against a mock server.

use bungie_netreq::platform::{ComponentType, PlatformClient};
use bungie_netreq::transport::HttpTransport;
use bungie_netreq::{Error, HttpConfig, RequestExecutor};
use mockito::{Matcher, Server, ServerGuard};
use std::sync::Arc;

fn client(server: &ServerGuard) -> PlatformClient {
    let exec = RequestExecutor::builder()
        .transport(Arc::new(HttpTransport::new(&HttpConfig::default()).unwrap()))
        .build()
        .unwrap();
    PlatformClient::new(Arc::new(exec), "test-key").with_root(format!("{}/", server.url()))
}

#[tokio::test]
async fn test_definitions_are_fetched_once() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/Destiny2/Manifest/DestinyActivityModifierDefinition/1234/")
        .match_header("x-api-key", "test-key")
        .with_status(200)
        .with_body(
            r#"{"Response": {"displayInNavMode": true, "displayProperties": {"name": "Match Game"}},
                "ErrorCode": 1, "ErrorStatus": "Success", "Message": "Ok"}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let api = client(&server);
    for _ in 0..3 {
        let def = api
            .entity_definition("DestinyActivityModifierDefinition", 1234)
            .await
            .unwrap();
        assert_eq!(def["displayProperties"]["name"], "Match Game");
    }
    mock.assert_async().await;
    assert_eq!(api.executor().cache().len(), 1);
}

#[tokio::test]
async fn test_search_is_never_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/Destiny2/SearchDestinyPlayerByBungieName/-1/")
        .match_body(Matcher::Json(
            serde_json::json!({"displayName": "Tom", "displayNameCode": 2842}),
        ))
        .with_status(200)
        .with_body(
            r#"{"Response": [{"membershipType": 3, "membershipId": "4611686018467", "displayName": "Tom",
                "bungieGlobalDisplayName": "Tom", "bungieGlobalDisplayNameCode": 2842}],
                "ErrorCode": 1}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let api = client(&server);
    for _ in 0..2 {
        let players = api.search_player("Tom", 2842).await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].membership_type, 3);
        assert_eq!(players[0].membership_id, "4611686018467");
        assert_eq!(players[0].bungie_global_display_name_code, Some(2842));
    }
    mock.assert_async().await;
    assert!(api.executor().cache().is_empty());
}

#[tokio::test]
async fn test_profile_requests_components_and_bypasses_cache() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/Destiny2/3/Profile/4611686018467/")
        .match_query(Matcher::UrlEncoded("components".into(), "100,200".into()))
        .match_header("authorization", "Bearer access")
        .with_status(200)
        .with_body(r#"{"Response": {"characters": {"data": {}}}, "ErrorCode": 1}"#)
        .expect(2)
        .create_async()
        .await;

    let api = client(&server).with_bearer("access");
    for _ in 0..2 {
        let profile = api
            .profile(
                3,
                "4611686018467",
                &[ComponentType::Profiles, ComponentType::Characters],
            )
            .await
            .unwrap();
        assert!(profile["characters"]["data"].is_object());
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_envelope_becomes_remote_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/Destiny2/Milestones/")
        .with_status(200)
        .with_body(
            r#"{"ErrorCode": 5, "ThrottleSeconds": 0, "ErrorStatus": "SystemDisabled",
                "Message": "This system is temporarily disabled for maintenance."}"#,
        )
        .create_async()
        .await;

    let api = client(&server);
    match api.milestones().await.unwrap_err() {
        Error::Remote {
            status,
            error_code,
            error_status,
            ..
        } => {
            assert_eq!(status, 200);
            assert_eq!(error_code, 5);
            assert_eq!(error_status, "SystemDisabled");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_vendor_path_shape() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/Destiny2/3/Profile/1/Character/2/Vendors/")
        .match_query(Matcher::UrlEncoded("components".into(), "400,402".into()))
        .with_status(200)
        .with_body(r#"{"Response": {"sales": {}}, "ErrorCode": 1}"#)
        .create_async()
        .await;

    let api = client(&server);
    let vendors = api
        .character_vendors(3, "1", "2", &[ComponentType::Vendors, ComponentType::VendorSales])
        .await
        .unwrap();
    assert!(vendors["sales"].is_object());
    mock.assert_async().await;
}
