use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::{Claims, TokenKind};
use crate::{error::AppError, state::AppState};

/// Signing material and token lifetimes, derived from config per request.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let cfg = &state.config.jwt;
        let mut validation = Validation::default();
        validation.set_audience(&[cfg.audience.as_str()]);
        validation.set_issuer(&[cfg.issuer.as_str()]);
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes.max(0)),
            refresh_ttl: Duration::minutes(cfg.refresh_ttl_minutes.max(0)),
        }
    }
}

impl JwtKeys {
    fn issue(&self, user_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims::new(
            user_id,
            kind,
            OffsetDateTime::now_utc(),
            ttl,
            &self.issuer,
            &self.audience,
        );
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%user_id, ?kind, "token issued");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.issue(user_id, TokenKind::Access)
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.issue(user_id, TokenKind::Refresh)
    }

    /// Checks signature, expiry, issuer and audience.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }

    fn verify_kind(&self, token: &str, kind: TokenKind) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        anyhow::ensure!(claims.kind == kind, "expected a {kind:?} token");
        Ok(claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        self.verify_kind(token, TokenKind::Refresh)
    }
}

/// Caller id from an `Authorization: Bearer <access token>` header.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;
        let token = header
            .split_once(' ')
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, t)| t.trim())
            .ok_or_else(|| AppError::Unauthorized("malformed authorization header".into()))?;

        let claims = JwtKeys::from_ref(state)
            .verify_kind(token, TokenKind::Access)
            .map_err(|e| {
                warn!(error = %e, "access token rejected");
                AppError::Unauthorized("invalid or expired token".into())
            })?;
        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, JwtConfig};
    use axum::http::Request;
    use std::sync::Arc;

    fn state_with(issuer: &str, audience: &str) -> AppState {
        let base = AppState::fake();
        let config = AppConfig {
            jwt: JwtConfig {
                secret: "shared-secret".into(),
                issuer: issuer.into(),
                audience: audience.into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            ..(*base.config).clone()
        };
        AppState::from_parts(base.db.clone(), Arc::new(config), base.llm.clone())
    }

    async fn extract(state: &AppState, auth: Option<String>) -> Result<Uuid, AppError> {
        let mut req = Request::get("/");
        if let Some(v) = auth {
            req = req.header(AUTHORIZATION, v);
        }
        let (mut parts, _) = req.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, state).await.map(|u| u.0)
    }

    #[tokio::test]
    async fn access_token_round_trips_through_extractor() {
        let state = state_with("fitcoach", "app");
        let user = Uuid::new_v4();
        let token = JwtKeys::from_ref(&state).sign_access(user).unwrap();
        assert_eq!(extract(&state, Some(format!("Bearer {token}"))).await.unwrap(), user);
        assert_eq!(extract(&state, Some(format!("bearer {token}"))).await.unwrap(), user);
    }

    #[tokio::test]
    async fn extractor_rejects_missing_malformed_and_refresh_tokens() {
        let state = state_with("fitcoach", "app");
        let refresh = JwtKeys::from_ref(&state).sign_refresh(Uuid::new_v4()).unwrap();
        for auth in [None, Some("Token abc".to_string()), Some(format!("Bearer {refresh}"))] {
            let err = extract(&state, auth).await.unwrap_err();
            assert!(matches!(err, AppError::Unauthorized(_)));
        }
    }

    #[tokio::test]
    async fn refresh_verification_requires_refresh_kind() {
        let keys = JwtKeys::from_ref(&state_with("fitcoach", "app"));
        let user = Uuid::new_v4();
        let refresh = keys.sign_refresh(user).unwrap();
        assert_eq!(keys.verify_refresh(&refresh).unwrap().sub, user);
        let access = keys.sign_access(user).unwrap();
        assert!(keys.verify_refresh(&access).is_err());
    }

    #[tokio::test]
    async fn tokens_from_another_issuer_are_rejected() {
        let ours = JwtKeys::from_ref(&state_with("fitcoach", "app"));
        let theirs = JwtKeys::from_ref(&state_with("someone-else", "other"));
        let token = theirs.sign_access(Uuid::new_v4()).unwrap();
        assert!(ours.verify(&token).is_err());
    }
}
