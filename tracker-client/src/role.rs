//! Role resolution
//!
//! The admin presentation is granted only by a verified credential. The
//! launch-time selector is applied afterwards and can only narrow it.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use shared::{RoleClaims, ViewRole, ViewSelector};

use crate::{ClientConfig, ClientError, ClientResult};

/// Verifies a role credential and returns its claims
pub trait RoleVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> ClientResult<RoleClaims>;
}

/// HS256 JWT verifier
#[derive(Clone)]
pub struct JwtRoleVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtRoleVerifier {
    pub fn hs256(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Also require the `iss` claim to match
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }
}

impl std::fmt::Debug for JwtRoleVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtRoleVerifier").finish_non_exhaustive()
    }
}

impl RoleVerifier for JwtRoleVerifier {
    fn verify(&self, credential: &str) -> ClientResult<RoleClaims> {
        decode::<RoleClaims>(credential, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => ClientError::Role("credential expired".to_string()),
                ErrorKind::InvalidSignature => ClientError::Role("invalid signature".to_string()),
                _ => ClientError::Role(e.to_string()),
            })
    }
}

/// Resolve the presentation role
///
/// No credential, no verifier or a rejected credential all resolve to the
/// customer view.
pub fn resolve_role(
    verifier: Option<&dyn RoleVerifier>,
    credential: Option<&str>,
    hint: ViewSelector,
) -> ViewRole {
    let verified = match (verifier, credential) {
        (Some(verifier), Some(credential)) => match verifier.verify(credential) {
            Ok(claims) => {
                tracing::debug!(sub = %claims.sub, role = %claims.role, "Role credential verified");
                claims.role
            }
            Err(e) => {
                tracing::warn!("{}, using customer view", e);
                ViewRole::Customer
            }
        },
        (None, Some(_)) => {
            tracing::warn!(
                "Role credential present but no verifier configured, using customer view"
            );
            ViewRole::Customer
        }
        _ => ViewRole::Customer,
    };

    verified.narrowed_by(hint)
}

/// Resolve the role from `role_token` / `role_secret` / `view_hint`
pub fn resolve_from_config(config: &ClientConfig) -> ViewRole {
    let verifier = config
        .role_secret
        .as_deref()
        .map(|secret| JwtRoleVerifier::hs256(secret.as_bytes()));
    resolve_role(
        verifier.as_ref().map(|v| v as &dyn RoleVerifier),
        config.role_token.as_deref(),
        config.view_hint,
    )
}
