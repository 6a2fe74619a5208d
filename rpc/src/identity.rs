//! The acting user, as forwarded by the upstream auth gateway.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use shamba_types::{Requester, Role, UserId};

use crate::RpcError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Extracts a [`Requester`] from the identity headers. A missing role
/// header means a farmer.
#[derive(Clone, Copy, Debug)]
pub struct Identity(pub Requester);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = RpcError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = header(parts, USER_ID_HEADER)?
            .ok_or_else(|| RpcError::Unauthenticated(format!("{USER_ID_HEADER} is required")))?
            .parse::<UserId>()
            .map_err(|e| RpcError::Unauthenticated(e.to_string()))?;
        let role = match header(parts, USER_ROLE_HEADER)? {
            Some(role) => role
                .parse::<Role>()
                .map_err(|e| RpcError::Unauthenticated(e.to_string()))?,
            None => Role::Farmer,
        };
        Ok(Identity(Requester { user, role }))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, RpcError> {
    parts
        .headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| RpcError::Unauthenticated(format!("{name} is not valid text")))
        })
        .transpose()
}
