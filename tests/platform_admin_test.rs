//! Integration tests for operator administration and member removal.

use axum::Router;
use serde_json::{Value, json};

use bulkhead::model::User;
use bulkhead::store::{MembershipStore, OrganizationStore, SessionStore};
use bulkhead::testing::{self, TestUser, membership, organization};
use bulkhead::{AppState, Config, ErrorCode, InMemoryStore, OrgRole};

async fn operator_app() -> (InMemoryStore, Router, String) {
    let store = InMemoryStore::new();
    let app = bulkhead::router(AppState::new(store.clone(), Config::default()));
    let operator = TestUser::builder().operator().build();
    store.insert_user(operator.clone()).await;
    let token = store.issue_session(&operator.id).await.token;
    (store, app, token)
}

async fn signed_in(store: &InMemoryStore, user: &User) -> String {
    store.insert_user(user.clone()).await;
    store.issue_session(&user.id).await.token
}

// =============================================================================
// Organizations
// =============================================================================

#[tokio::test]
async fn test_organization_crud() {
    let (store, app, token) = operator_app().await;
    let founder = TestUser::builder().build();
    store.insert_user(founder.clone()).await;

    let response = testing::post(app.clone(), "/platform/organizations")
        .bearer_token(&token)
        .json_body(&json!({"name": "Acme Inc.", "ownerId": founder.id}))
        .execute()
        .await
        .assert_created()
        .response();
    let location = response.headers().get("location").unwrap().to_str().unwrap().to_string();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let org: Value = serde_json::from_slice(&bytes).unwrap();
    let org_id = org["id"].as_str().unwrap().to_string();
    assert_eq!(org["slug"], "acme-inc");
    assert_eq!(location, format!("/platform/organizations/{org_id}"));

    let owner = store.find_membership(&org_id, &founder.id).await.unwrap().unwrap();
    assert_eq!(owner.role, OrgRole::Owner);

    testing::post(app.clone(), "/platform/organizations")
        .bearer_token(&token)
        .json_body(&json!({"name": "ACME inc"}))
        .execute()
        .await
        .assert_conflict()
        .assert_error_code(ErrorCode::SlugExists)
        .await;

    let uri = format!("/platform/organizations/{org_id}");
    testing::get(app.clone(), &uri)
        .bearer_token(&token)
        .execute()
        .await
        .assert_ok()
        .assert_json_field("memberCount", json!(1))
        .await;

    testing::patch(app.clone(), &uri)
        .bearer_token(&token)
        .json_body(&json!({"name": "Acme Holdings", "metadata": {"tier": "gold"}}))
        .execute()
        .await
        .assert_ok()
        .assert_json_field("metadata.tier", json!("gold"))
        .await
        .assert_json_field("slug", json!("acme-inc"))
        .await;

    testing::delete(app.clone(), &uri)
        .bearer_token(&token)
        .execute()
        .await
        .assert_ok()
        .assert_json_field("success", json!(true))
        .await;

    assert!(store.find_organization(&org_id).await.unwrap().is_none());
    testing::get(app.clone(), &uri)
        .bearer_token(&token)
        .execute()
        .await
        .assert_not_found()
        .assert_error_code(ErrorCode::OrgNotFound)
        .await;
}

#[tokio::test]
async fn test_delete_clears_active_organization() {
    let (store, app, token) = operator_app().await;
    let member = TestUser::builder().build();
    let member_token = signed_in(&store, &member).await;
    let org = organization("acme");
    store.insert_organization(org.clone()).await;
    store.insert_membership(membership(&org.id, &member.id, OrgRole::User)).await;

    testing::post(app.clone(), &format!("/organizations/{}/activate", org.id))
        .bearer_token(&member_token)
        .execute()
        .await
        .assert_ok();

    testing::delete(app.clone(), &format!("/platform/organizations/{}", org.id))
        .bearer_token(&token)
        .execute()
        .await
        .assert_ok();

    let session = store.find_session(&member_token).await.unwrap().unwrap();
    assert_eq!(session.active_organization_id, None);
}

#[tokio::test]
async fn test_create_organization_validation() {
    let (_, app, token) = operator_app().await;

    testing::post(app.clone(), "/platform/organizations")
        .bearer_token(&token)
        .json_body(&json!({"name": "Acme", "slug": "Bad Slug"}))
        .execute()
        .await
        .assert_bad_request()
        .assert_error_code(ErrorCode::InvalidSlug)
        .await;

    testing::post(app.clone(), "/platform/organizations")
        .bearer_token(&token)
        .json_body(&json!({"name": "Acme", "ownerId": "ghost"}))
        .execute()
        .await
        .assert_not_found()
        .assert_error_code(ErrorCode::UserNotFound)
        .await;

    testing::post(app.clone(), "/platform/organizations")
        .bearer_token(&token)
        .json_body(&json!({"name": "   ", "slug": "acme"}))
        .execute()
        .await
        .assert_bad_request()
        .assert_error_code(ErrorCode::InvalidRequest)
        .await;
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_user_administration() {
    let (_, app, token) = operator_app().await;

    let user: Value = testing::post(app.clone(), "/platform/users")
        .bearer_token(&token)
        .json_body(&json!({"email": "Grace@Example.com", "name": "Grace"}))
        .execute()
        .await
        .assert_created()
        .json()
        .await;
    assert_eq!(user["email"], "grace@example.com");
    assert_eq!(user["platformRole"], "STANDARD");
    let uri = format!("/platform/users/{}", user["id"].as_str().unwrap());

    testing::post(app.clone(), "/platform/users")
        .bearer_token(&token)
        .json_body(&json!({"email": "grace@example.com", "name": "Again"}))
        .execute()
        .await
        .assert_conflict()
        .assert_error_code(ErrorCode::EmailExists)
        .await;

    testing::patch(app.clone(), &uri)
        .bearer_token(&token)
        .json_body(&json!({"emailVerified": true}))
        .execute()
        .await
        .assert_ok()
        .assert_json_field("emailVerified", json!(true))
        .await;

    testing::post(app.clone(), &format!("{uri}/ban"))
        .bearer_token(&token)
        .execute()
        .await
        .assert_ok()
        .assert_json_field("banned", json!(true))
        .await
        .assert_json_field("banReason", Value::Null)
        .await;

    testing::patch(app.clone(), &uri)
        .bearer_token(&token)
        .json_body(&json!({"name": "Grace Hopper"}))
        .execute()
        .await
        .assert_ok()
        .assert_json_field("name", json!("Grace Hopper"))
        .await
        .assert_json_field("banned", json!(true))
        .await;

    testing::post(app.clone(), &format!("{uri}/activate"))
        .bearer_token(&token)
        .execute()
        .await
        .assert_ok()
        .assert_json_field("banned", json!(false))
        .await;

    testing::get(app.clone(), "/platform/users/ghost")
        .bearer_token(&token)
        .execute()
        .await
        .assert_not_found()
        .assert_error_code(ErrorCode::UserNotFound)
        .await;
}

// =============================================================================
// Member removal
// =============================================================================

#[tokio::test]
async fn test_last_owner_cannot_be_removed() {
    let store = InMemoryStore::new();
    let app = bulkhead::router(AppState::new(store.clone(), Config::default()));

    let first = TestUser::builder().build();
    let second = TestUser::builder().build();
    let admin = TestUser::builder().build();
    let admin_token = signed_in(&store, &admin).await;
    store.insert_user(first.clone()).await;
    store.insert_user(second.clone()).await;

    let org = organization("acme");
    store.insert_organization(org.clone()).await;
    let first_owner = membership(&org.id, &first.id, OrgRole::Owner);
    let second_owner = membership(&org.id, &second.id, OrgRole::Owner);
    store.insert_membership(first_owner.clone()).await;
    store.insert_membership(second_owner.clone()).await;
    store.insert_membership(membership(&org.id, &admin.id, OrgRole::Admin)).await;

    let members_uri = format!("/organizations/{}/members", org.id);

    testing::delete(app.clone(), &format!("{members_uri}/{}", first_owner.id))
        .bearer_token(&admin_token)
        .execute()
        .await
        .assert_ok()
        .assert_json_field("userId", json!(first.id))
        .await;

    testing::delete(app.clone(), &format!("{members_uri}/{}", second_owner.id))
        .bearer_token(&admin_token)
        .execute()
        .await
        .assert_bad_request()
        .assert_error_code(ErrorCode::LastOwner)
        .await;

    assert!(store.find_membership(&org.id, &second.id).await.unwrap().is_some());

    testing::delete(app.clone(), &format!("{members_uri}/missing"))
        .bearer_token(&admin_token)
        .execute()
        .await
        .assert_not_found()
        .assert_error_code(ErrorCode::MemberNotFound)
        .await;
}
