#![allow(clippy::unwrap_used, clippy::expect_used)]

use http::Extensions;
use verified_actor::{
    Action, AuthError, Claims, ErrorClass, actor_from_claims, get_action,
    get_authenticated_action, with_action,
};

const METHOD: &str = "/orders.Service/Get";

fn derive(header: &str) -> Result<Action, AuthError> {
    let claims = Claims::from_json(header.as_bytes())?;
    let actor = actor_from_claims(&claims)?;
    Ok(Action::authenticated(actor, METHOD))
}

#[test]
fn verified_header_becomes_an_action() {
    let header = r#"{
        "jti": "0d6e3c2a-8a5b-4a0e-9d0e-8b1f3f4c2a11",
        "iss": "edge",
        "sub": "user/3fa85f64-5717-4562-b3fc-2c963f66afa6",
        "aud": ["orders", "billing"],
        "iat": 1700000000,
        "scopes": ["read"],
        "claims.pentops.com/tenant": "org",
        "claims.pentops.com/tenantid": "tenant-1",
        "claims.pentops.com/realmid": "realm-1"
    }"#;

    let ext = with_action(Extensions::new(), derive(header).unwrap());
    let action = get_authenticated_action(&ext).unwrap();
    let actor = action.actor.as_ref().unwrap();

    assert_eq!(action.method, METHOD);
    assert_eq!(actor.subject_type, "user");
    assert_eq!(
        actor.subject_id.to_string(),
        "3fa85f64-5717-4562-b3fc-2c963f66afa6"
    );
    assert_eq!(actor.claim.scopes, vec!["read"]);
    assert_eq!(actor.claim.tenant_type, "org");
    assert_eq!(actor.claim.tenant_id, "tenant-1");
    assert_eq!(actor.claim.realm_id, "realm-1");
}

#[test]
fn invalid_subject_never_produces_an_action() {
    let err = derive(r#"{"jti":"t","sub":"not-a-valid-subject","scopes":["read"]}"#).unwrap_err();

    assert!(matches!(err, AuthError::InvalidSubject { ref subject, .. } if subject == "not-a-valid-subject"));
    assert_eq!(err.class(), ErrorClass::InvalidArgument);
}

#[test]
fn malformed_header_is_a_decoding_error() {
    let err = derive(r#"{"jti":"t","sub":"#).unwrap_err();

    assert!(matches!(err, AuthError::Decoding(_)));
    assert_eq!(err.class(), ErrorClass::InvalidArgument);
}

#[test]
fn reading_an_unpopulated_scope_is_safe() {
    let ext = Extensions::new();

    assert!(get_action(&ext).is_none());
    let err = get_authenticated_action(&ext).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Internal);

    let ext = with_action(ext, Action::unauthenticated(METHOD));
    let err = get_authenticated_action(&ext).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Unauthenticated);
}

#[test]
fn null_optional_claims_are_accepted() {
    let header = r#"{
        "jti": "token-1",
        "sub": "user/3fa85f64-5717-4562-b3fc-2c963f66afa6",
        "aud": null,
        "scopes": null,
        "claims.pentops.com/actortags": null
    }"#;

    let action = derive(header).unwrap();
    let actor = action.actor.unwrap();
    assert!(actor.claim.scopes.is_empty());
    assert!(actor.actor_tags.is_empty());
}

#[test]
fn empty_token_id_is_rejected() {
    let err = derive(r#"{"jti":"","sub":"user/3fa85f64-5717-4562-b3fc-2c963f66afa6"}"#).unwrap_err();

    assert!(matches!(err, AuthError::Decoding(_)));
    assert_eq!(err.class(), ErrorClass::InvalidArgument);
}
