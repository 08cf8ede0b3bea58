//! Organization-scoped endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};

use super::json::ApiJson;
use super::response::CreatedResponse;
use super::routes::RouteModule;
use crate::app::AppState;
use crate::auth::{Authenticated, OrgMember, OwnerOrAdmin};
use crate::error::Result;
use crate::model::{
    Invitation, InvitationView, MemberView, Membership, Organization, OrganizationDetails,
    OrganizationSummary,
};
use crate::organizations::{CreateInvitation, UpdateOrganization};
use crate::store::IdentityStore;

/// Routes under `/organizations/{org_id}` plus invitation acceptance.
pub struct OrganizationRoutes;

impl<S: IdentityStore> RouteModule<S> for OrganizationRoutes {
    fn routes(&self) -> Router<AppState<S>> {
        Router::new()
            .route("/organizations/{org_id}/activate", post(activate::<S>))
            .route(
                "/organizations/{org_id}",
                get(get_organization::<S>).patch(update_organization::<S>),
            )
            .route(
                "/organizations/{org_id}/invitations",
                get(list_invitations::<S>).post(create_invitation::<S>),
            )
            .route(
                "/organizations/{org_id}/invitations/{invitation_id}",
                delete(cancel_invitation::<S>),
            )
            .route(
                "/organizations/{org_id}/invitations/{invitation_id}/resend",
                post(resend_invitation::<S>),
            )
            .route("/organizations/{org_id}/members", get(list_members::<S>))
            .route(
                "/organizations/{org_id}/members/{member_id}",
                delete(remove_member::<S>),
            )
            .route(
                "/invitations/{invitation_id}/accept",
                post(accept_invitation::<S>),
            )
    }
}

/// Make the organization the active one for the presented session.
async fn activate<S: IdentityStore>(
    State(state): State<AppState<S>>,
    Authenticated(principal): Authenticated,
    Path(org_id): Path<String>,
) -> Result<Json<OrganizationSummary>> {
    let summary = state
        .binder()
        .switch(&principal.identity, Some(&principal.session.token), &org_id)
        .await?;
    Ok(Json(summary))
}

async fn get_organization<S: IdentityStore>(
    State(state): State<AppState<S>>,
    OrgMember(access, _): OrgMember<OwnerOrAdmin>,
) -> Result<Json<OrganizationDetails>> {
    let details = state.organizations().details(&access.organization.id).await?;
    Ok(Json(details))
}

async fn update_organization<S: IdentityStore>(
    State(state): State<AppState<S>>,
    OrgMember(access, _): OrgMember<OwnerOrAdmin>,
    ApiJson(request): ApiJson<UpdateOrganization>,
) -> Result<Json<Organization>> {
    let org = state
        .organizations()
        .update(&access.organization.id, request)
        .await?;
    Ok(Json(org))
}

async fn list_invitations<S: IdentityStore>(
    State(state): State<AppState<S>>,
    OrgMember(access, _): OrgMember<OwnerOrAdmin>,
) -> Result<Json<Vec<InvitationView>>> {
    let invitations = state.invitations().list(&access.organization.id).await?;
    Ok(Json(invitations))
}

async fn create_invitation<S: IdentityStore>(
    State(state): State<AppState<S>>,
    OrgMember(access, _): OrgMember<OwnerOrAdmin>,
    ApiJson(request): ApiJson<CreateInvitation>,
) -> Result<CreatedResponse<Invitation>> {
    let org_id = &access.organization.id;
    let invitation = state
        .invitations()
        .create(org_id, request, &access.principal.identity.id)
        .await?;

    let location = format!("/organizations/{}/invitations/{}", org_id, invitation.id);
    Ok(CreatedResponse::new(invitation, location))
}

async fn resend_invitation<S: IdentityStore>(
    State(state): State<AppState<S>>,
    OrgMember(access, _): OrgMember<OwnerOrAdmin>,
    Path((_, invitation_id)): Path<(String, String)>,
) -> Result<Json<Invitation>> {
    let invitation = state
        .invitations()
        .resend(&access.organization.id, &invitation_id)
        .await?;
    Ok(Json(invitation))
}

async fn cancel_invitation<S: IdentityStore>(
    State(state): State<AppState<S>>,
    OrgMember(access, _): OrgMember<OwnerOrAdmin>,
    Path((_, invitation_id)): Path<(String, String)>,
) -> Result<Json<Invitation>> {
    let invitation = state
        .invitations()
        .cancel(&access.organization.id, &invitation_id)
        .await?;
    Ok(Json(invitation))
}

async fn list_members<S: IdentityStore>(
    State(state): State<AppState<S>>,
    OrgMember(access, _): OrgMember<OwnerOrAdmin>,
) -> Result<Json<Vec<MemberView>>> {
    let members = state.members().list(&access.organization.id).await?;
    Ok(Json(members))
}

async fn remove_member<S: IdentityStore>(
    State(state): State<AppState<S>>,
    OrgMember(access, _): OrgMember<OwnerOrAdmin>,
    Path((_, member_id)): Path<(String, String)>,
) -> Result<Json<Membership>> {
    let removed = state
        .members()
        .remove(&access.organization.id, &member_id)
        .await?;
    Ok(Json(removed))
}

/// Accept an invitation addressed to the caller's email.
async fn accept_invitation<S: IdentityStore>(
    State(state): State<AppState<S>>,
    Authenticated(principal): Authenticated,
    Path(invitation_id): Path<String>,
) -> Result<Json<Membership>> {
    let membership = state
        .invitations()
        .accept(&invitation_id, &principal.identity)
        .await?;
    Ok(Json(membership))
}
