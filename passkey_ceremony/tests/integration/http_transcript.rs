use axum::http::StatusCode;
use passkey_ceremony::{
    AssertionResponseJson, AttestationResponseJson, AuthenticationFinishRequest, CeremonyError,
    HttpTranscriptClient, Passkey, PasskeyDirectory, RegistrationFinishRequest, TranscriptClient,
};
use serde_json::json;
use std::time::Duration;

use crate::common::mock_portal::closed_port_url;
use crate::common::{MockPortal, init_test_environment, login_begin_body, register_begin_body};

fn client_for(base_url: &str) -> HttpTranscriptClient {
    HttpTranscriptClient::new(base_url, Duration::from_secs(5)).unwrap()
}

fn assertion_request() -> AuthenticationFinishRequest {
    AuthenticationFinishRequest {
        identifier: "alice".to_string(),
        id: "BAUG".to_string(),
        raw_id: "BAUG".to_string(),
        type_: "public-key".to_string(),
        authenticator_attachment: Some("platform".to_string()),
        response: AssertionResponseJson {
            authenticator_data: "BAUG".to_string(),
            client_data_json: "e30".to_string(),
            signature: "AQID".to_string(),
            user_handle: None,
        },
    }
}

fn attestation_request(name: &str) -> RegistrationFinishRequest {
    RegistrationFinishRequest {
        name: name.to_string(),
        id: "cred-new".to_string(),
        type_: "public-key".to_string(),
        authenticator_attachment: None,
        response: AttestationResponseJson {
            attestation_object: "oA".to_string(),
            client_data_json: "e30".to_string(),
        },
    }
}

#[tokio::test]
async fn test_begin_authentication_sends_identifier_as_text() {
    init_test_environment();
    let portal = MockPortal::new();
    portal.respond_json("/login/passkey/begin", &login_begin_body("AQID"));
    let client = client_for(&portal.start().await);

    let options = client.begin_authentication("alice").await.unwrap();

    // The envelope is unwrapped and fields arrive untouched
    assert_eq!(options.challenge, "AQID");
    assert_eq!(options.allow_credentials.len(), 1);
    assert_eq!(options.rp_id.as_deref(), Some("localhost"));

    let requests = portal.requests_to("/login/passkey/begin");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, axum::http::Method::POST);
    assert_eq!(requests[0].body, "alice");
    let content_type = requests[0].content_type.clone().unwrap_or_default();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_begin_authentication_rejected() {
    init_test_environment();
    let portal = MockPortal::new();
    portal.respond(
        "/login/passkey/begin",
        StatusCode::BAD_REQUEST,
        "unknown identifier",
    );
    let client = client_for(&portal.start().await);

    let result = client.begin_authentication("mallory").await;

    assert_eq!(
        result,
        Err(CeremonyError::ServerRejected("unknown identifier".into()))
    );
}

#[tokio::test]
async fn test_begin_with_malformed_json_is_validation() {
    init_test_environment();
    let portal = MockPortal::new();
    let numeric_challenge = r#"{"challenge":42}"#;
    portal.respond("/login/passkey/begin", StatusCode::OK, numeric_challenge);
    portal.respond("/passkey/add/begin", StatusCode::OK, "definitely not json");
    let client = client_for(&portal.start().await);

    let login = client.begin_authentication("alice").await;
    let register = client.begin_registration().await;

    assert!(matches!(login, Err(CeremonyError::Validation(_))));
    assert!(matches!(register, Err(CeremonyError::Validation(_))));
}

#[tokio::test]
async fn test_unreachable_portal_is_transport() {
    init_test_environment();
    let client = client_for(&closed_port_url().await);

    let result = client.begin_authentication("alice").await;

    assert!(matches!(result, Err(CeremonyError::Transport(_))));
}

#[tokio::test]
async fn test_finish_authentication_posts_json() {
    init_test_environment();
    let portal = MockPortal::new();
    portal.respond("/login/passkey/finish", StatusCode::OK, "");
    let client = client_for(&portal.start().await);

    client
        .finish_authentication(&assertion_request())
        .await
        .unwrap();

    let requests = portal.requests_to("/login/passkey/finish");
    assert_eq!(requests.len(), 1);
    let content_type = requests[0].content_type.as_deref();
    assert_eq!(content_type, Some("application/json"));
    assert_eq!(
        requests[0].json(),
        json!({
            "identifier": "alice",
            "id": "BAUG",
            "rawId": "BAUG",
            "type": "public-key",
            "authenticatorAttachment": "platform",
            "response": {
                "authenticatorData": "BAUG",
                "clientDataJSON": "e30",
                "signature": "AQID"
            }
        })
    );
}

#[tokio::test]
async fn test_finish_authentication_rejected() {
    init_test_environment();
    let portal = MockPortal::new();
    portal.respond(
        "/login/passkey/finish",
        StatusCode::BAD_REQUEST,
        "Invalid credential",
    );
    let client = client_for(&portal.start().await);

    let result = client.finish_authentication(&assertion_request()).await;

    assert_eq!(
        result,
        Err(CeremonyError::ServerRejected("Invalid credential".into()))
    );
}

#[tokio::test]
async fn test_registration_round_trip() {
    init_test_environment();
    let portal = MockPortal::new();
    portal
        .respond_json("/passkey/add/begin", &register_begin_body("AQID", "BwgJ"))
        .respond_json(
            "/passkey/add/finish",
            &json!({ "id": "p1", "name": "Laptop", "discoverable": true }),
        );
    let client = client_for(&portal.start().await);

    let options = client.begin_registration().await.unwrap();
    assert_eq!(options.user.id, "BwgJ");
    assert_eq!(options.pub_key_cred_params.len(), 2);

    let passkey = client
        .finish_registration(&attestation_request("Laptop"))
        .await
        .unwrap();

    assert_eq!(
        passkey,
        Passkey {
            id: "p1".to_string(),
            name: "Laptop".to_string()
        }
    );
    let begin = &portal.requests_to("/passkey/add/begin")[0];
    assert_eq!(begin.method, axum::http::Method::POST);
    assert!(begin.body.is_empty());
    let finish = portal.requests_to("/passkey/add/finish")[0].json();
    assert_eq!(finish["name"], "Laptop");
    assert_eq!(finish["response"]["attestationObject"], "oA");
}

#[tokio::test]
async fn test_finish_registration_without_name_uses_submitted_name() {
    init_test_environment();
    let portal = MockPortal::new();
    portal.respond_json("/passkey/add/finish", &json!({ "id": "p1" }));
    let client = client_for(&portal.start().await);

    let passkey = client
        .finish_registration(&attestation_request("Phone"))
        .await
        .unwrap();

    assert_eq!(passkey.name, "Phone");
}

#[tokio::test]
async fn test_list_and_remove_passkeys() {
    init_test_environment();
    let portal = MockPortal::new();
    portal
        .respond_json(
            "/passkey/list",
            &json!([
                { "id": "a", "name": "Laptop" },
                { "id": "b", "name": "Phone" }
            ]),
        )
        .respond("/passkey/remove", StatusCode::OK, "");
    let client = client_for(&portal.start().await);

    let passkeys = client.list_passkeys().await.unwrap();
    assert_eq!(passkeys.len(), 2);
    assert_eq!(passkeys[1].name, "Phone");

    client.remove_passkey("b").await.unwrap();

    let list = &portal.requests_to("/passkey/list")[0];
    assert_eq!(list.method, axum::http::Method::GET);
    let remove = &portal.requests_to("/passkey/remove")[0];
    assert_eq!(remove.json(), json!("b"));
}

#[tokio::test]
async fn test_list_with_wrong_shape_is_validation() {
    init_test_environment();
    let portal = MockPortal::new();
    portal.respond_json("/passkey/list", &json!([{ "id": 1 }]));
    let client = client_for(&portal.start().await);

    let result = client.list_passkeys().await;

    assert!(matches!(result, Err(CeremonyError::Validation(_))));
}
