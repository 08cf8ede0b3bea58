//! Operator-only administration endpoints under `/platform`.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use tracing::info;

use super::json::ApiJson;
use super::response::{CreatedResponse, MessageResponse};
use super::routes::RouteModule;
use crate::admin::{BanUser, CreateUser, UpdateUser};
use crate::app::AppState;
use crate::auth::PlatformOperator;
use crate::error::Result;
use crate::model::{Invitation, Organization, OrganizationDetails, User};
use crate::organizations::{CreateInvitation, CreateOrganization, UpdateOrganization};
use crate::store::IdentityStore;

pub struct PlatformRoutes;

impl<S: IdentityStore> RouteModule<S> for PlatformRoutes {
    fn routes(&self) -> Router<AppState<S>> {
        Router::new()
            .route("/organizations", post(create_organization::<S>))
            .route(
                "/organizations/{org_id}",
                get(get_organization::<S>)
                    .patch(update_organization::<S>)
                    .delete(delete_organization::<S>),
            )
            .route(
                "/organizations/{org_id}/invitations",
                post(invite_to_organization::<S>),
            )
            .route("/users", post(create_user::<S>))
            .route(
                "/users/{user_id}",
                get(get_user::<S>).patch(update_user::<S>),
            )
            .route("/users/{user_id}/ban", post(ban_user::<S>))
            .route("/users/{user_id}/activate", post(activate_user::<S>))
    }

    fn prefix(&self) -> Option<&str> {
        Some("/platform")
    }
}

async fn create_organization<S: IdentityStore>(
    State(state): State<AppState<S>>,
    PlatformOperator(operator): PlatformOperator,
    ApiJson(request): ApiJson<CreateOrganization>,
) -> Result<CreatedResponse<Organization>> {
    let org = state.organizations().create(request).await?;
    info!(operator_id = %operator.identity.id, org_id = %org.id, "Operator created organization");

    let location = format!("/platform/organizations/{}", org.id);
    Ok(CreatedResponse::new(org, location))
}

async fn get_organization<S: IdentityStore>(
    State(state): State<AppState<S>>,
    _: PlatformOperator,
    Path(org_id): Path<String>,
) -> Result<Json<OrganizationDetails>> {
    Ok(Json(state.organizations().details(&org_id).await?))
}

async fn update_organization<S: IdentityStore>(
    State(state): State<AppState<S>>,
    _: PlatformOperator,
    Path(org_id): Path<String>,
    ApiJson(request): ApiJson<UpdateOrganization>,
) -> Result<Json<Organization>> {
    Ok(Json(state.organizations().update(&org_id, request).await?))
}

async fn delete_organization<S: IdentityStore>(
    State(state): State<AppState<S>>,
    PlatformOperator(operator): PlatformOperator,
    Path(org_id): Path<String>,
) -> Result<MessageResponse> {
    state.organizations().delete(&org_id).await?;
    info!(operator_id = %operator.identity.id, org_id = %org_id, "Operator deleted organization");
    Ok(MessageResponse::success("Organization deleted"))
}

/// Invite on behalf of the platform rather than a member.
async fn invite_to_organization<S: IdentityStore>(
    State(state): State<AppState<S>>,
    _: PlatformOperator,
    Path(org_id): Path<String>,
    ApiJson(request): ApiJson<CreateInvitation>,
) -> Result<CreatedResponse<Invitation>> {
    let invitation = state
        .invitations()
        .create_as_operator(&org_id, request)
        .await?;

    let location = format!("/organizations/{}/invitations/{}", org_id, invitation.id);
    Ok(CreatedResponse::new(invitation, location))
}

async fn create_user<S: IdentityStore>(
    State(state): State<AppState<S>>,
    _: PlatformOperator,
    ApiJson(request): ApiJson<CreateUser>,
) -> Result<CreatedResponse<User>> {
    let user = state.admin().create_user(request).await?;
    let location = format!("/platform/users/{}", user.id);
    Ok(CreatedResponse::new(user, location))
}

async fn get_user<S: IdentityStore>(
    State(state): State<AppState<S>>,
    _: PlatformOperator,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.admin().get_user(&user_id).await?))
}

async fn update_user<S: IdentityStore>(
    State(state): State<AppState<S>>,
    _: PlatformOperator,
    Path(user_id): Path<String>,
    ApiJson(request): ApiJson<UpdateUser>,
) -> Result<Json<User>> {
    Ok(Json(state.admin().update_user(&user_id, request).await?))
}

/// The body is optional; without one the ban carries no reason.
async fn ban_user<S: IdentityStore>(
    State(state): State<AppState<S>>,
    _: PlatformOperator,
    Path(user_id): Path<String>,
    request: Option<ApiJson<BanUser>>,
) -> Result<Json<User>> {
    let request = request.map(|ApiJson(r)| r).unwrap_or_default();
    Ok(Json(state.admin().ban_user(&user_id, request).await?))
}

async fn activate_user<S: IdentityStore>(
    State(state): State<AppState<S>>,
    _: PlatformOperator,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.admin().activate_user(&user_id).await?))
}
