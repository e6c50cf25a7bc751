// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, LoginResponse, Profile},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, token_ttl: Duration) -> Self {
        Self { user_repo, jwt_secret, token_ttl }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let user = self.user_repo
            .find_auth_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        // Identidade sem perfil não entra em nenhuma das áreas
        let profile = self.user_repo
            .find_profile(user.id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let token = issue_token(&self.jwt_secret, user.id, self.token_ttl)?;
        tracing::info!("🔑 Login de {} ({})", profile.email, profile.role.as_str());

        Ok(LoginResponse { token, role: profile.role, profile })
    }

    /// Valida o token (assinatura, validade e revogação) e carrega o perfil.
    pub async fn authenticate(&self, token: &str) -> Result<(Profile, Claims), AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;

        if self.user_repo.is_token_revoked(claims.jti).await? {
            return Err(AppError::InvalidToken);
        }

        // Identidade removida depois da emissão: o token deixa de valer
        let profile = self.user_repo
            .find_profile(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        Ok((profile, claims))
    }

    pub async fn logout(&self, claims: &Claims) -> Result<(), AppError> {
        let expires_at = DateTime::from_timestamp(claims.exp as i64, 0).unwrap_or_else(Utc::now);
        self.user_repo.revoke_token(claims.jti, expires_at).await
    }
}

pub fn issue_token(secret: &str, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + ttl;

    let claims = Claims {
        sub: user_id,
        jti: Uuid::new_v4(),
        exp: expires_at.timestamp().max(0) as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}
