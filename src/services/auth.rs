// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Token, User},
};

// =============================================================================
//  SENHAS (bcrypt fora do runtime async)
// =============================================================================

pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let hashed = hashed.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &hashed))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

// =============================================================================
//  TOKENS (JWT HS256, sem refresh)
// =============================================================================

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expire_minutes: i64,
}

impl TokenService {
    pub fn new(secret: String, expire_minutes: i64) -> Self {
        Self { secret, expire_minutes }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::minutes(self.expire_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?)
    }

    /// Devolve o id do usuário (`sub`). Assinatura, expiração ou sub inválidos -> 401.
    pub fn verify(&self, token: &str) -> Result<i64, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        token_data.claims.sub.parse::<i64>().map_err(|_| AppError::InvalidToken)
    }
}

// =============================================================================
//  LOGIN
// =============================================================================

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tokens: TokenService,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, tokens: TokenService, pool: PgPool) -> Self {
        Self { user_repo, tokens, pool }
    }

    /// `identifier` aceita e-mail ou username; precisa bater com exatamente um usuário.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Token, AppError> {
        let mut matches = self.user_repo.find_by_login(&self.pool, identifier).await?;
        if matches.len() != 1 {
            tracing::info!("🔑 Login recusado para '{}': identificador não encontrado", identifier);
            return Err(AppError::InvalidCredentials);
        }
        let user = matches.remove(0);

        if !verify_password(password, &user.hashed_password).await? {
            tracing::info!("🔑 Login recusado para '{}': senha incorreta", identifier);
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::info!("🔑 Login recusado para '{}': usuário inativo", identifier);
            return Err(AppError::InactiveUser);
        }

        tracing::info!("✅ Usuário {} autenticado", user.id);
        Ok(Token::bearer(self.tokens.issue(user.id)?))
    }

    /// Usado pelo auth_guard em toda requisição protegida.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let user_id = self.tokens.verify(token)?;

        let user = self
            .user_repo
            .find_by_id(&self.pool, user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !user.is_active {
            return Err(AppError::InactiveUser);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_carries_the_user_id() {
        let tokens = TokenService::new("segredo".into(), 60);
        let token = tokens.issue(42).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), 42);
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let token = TokenService::new("outra-chave".into(), 60).issue(42).unwrap();
        let err = TokenService::new("segredo".into(), 60).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new("segredo".into(), -10);
        let token = tokens.issue(42).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn garbage_is_not_a_token() {
        let tokens = TokenService::new("segredo".into(), 60);
        assert!(matches!(tokens.verify("abc.def.ghi"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hashed = hash_password("s3nh4-forte").await.unwrap();
        assert_ne!(hashed, "s3nh4-forte");
        assert!(verify_password("s3nh4-forte", &hashed).await.unwrap());
        assert!(!verify_password("errada", &hashed).await.unwrap());
    }
}
