use log::{debug, info};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::{
        error,
        pagination::{PageQuery, Paginated},
    },
    configs::CacheStore,
    constants::{REFRESH_TOKEN_PREFIX, USER_CACHE_PREFIX, USER_CACHE_TTL},
    modules::user::{
        model::{normalize_email, InsertUser, SignInModel, SignUpModel, UserResponse},
        repository::UserRepository,
    },
    utils::{hash_password, verify_password, Claims, TokenConfig, TokenType},
};

/// Access token plus the refresh token that goes into the cookie.
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheStore>,
    tokens: TokenConfig,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository>,
        cache: Arc<dyn CacheStore>,
        tokens: TokenConfig,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache, tokens }
    }

    pub fn token_config(&self) -> &TokenConfig {
        &self.tokens
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = format!("{USER_CACHE_PREFIX}{id}");
        if let Some(cached_user) = self.cache.get::<UserResponse>(&key).await? {
            debug!("User {} found in cache", id);
            return Ok(cached_user);
        }

        let entity = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        let user = UserResponse::from(entity);
        self.cache.set(&key, &user, USER_CACHE_TTL).await?;
        debug!("User {} cached", id);
        Ok(user)
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<UserResponse, error::SystemError> {
        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            id: Uuid::now_v7(),
            email: normalize_email(&user.email),
            hash_password,
            first_name: user.first_name.trim().to_string(),
            last_name: user.last_name.trim().to_string(),
        };

        let created = self.repo.create(&new_user).await?;
        info!("User {} signed up", created.id);
        Ok(UserResponse::from(created))
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<TokenPair, error::SystemError> {
        let invalid = || error::SystemError::unauthorized("Invalid email or password");

        let user_entity = self.repo.find_by_email(user.email.trim()).await?.ok_or_else(invalid)?;

        if !user_entity.is_active || !verify_password(&user_entity.hash_password, &user.password)? {
            return Err(invalid());
        }

        info!("User {} signed in", user_entity.id);
        self.issue_tokens(&user_entity.id).await
    }

    /// Exchanges a refresh token for a new pair. Each refresh token is accepted once.
    pub async fn refresh(&self, refresh_token: Option<String>) -> Result<TokenPair, error::SystemError> {
        let invalid = || error::SystemError::unauthorized("Refresh token invalid or expired");

        let token = refresh_token.ok_or_else(invalid)?;
        let claims =
            Claims::decode(&token, self.tokens.secret.as_bytes()).map_err(|_| invalid())?;

        let jti = match (claims.typ, claims.jti) {
            (TokenType::Refresh, Some(jti)) => jti,
            _ => return Err(invalid()),
        };

        if !self.cache.delete(&format!("{REFRESH_TOKEN_PREFIX}{jti}")).await? {
            return Err(invalid());
        }

        match self.repo.find_by_id(&claims.sub).await? {
            Some(user) if user.is_active => self.issue_tokens(&user.id).await,
            _ => Err(invalid()),
        }
    }

    pub async fn sign_out(&self, refresh_token: Option<String>) -> Result<(), error::SystemError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        if let Ok(Claims { jti: Some(jti), typ: TokenType::Refresh, sub, .. }) =
            Claims::decode(&token, self.tokens.secret.as_bytes())
        {
            self.cache.delete(&format!("{REFRESH_TOKEN_PREFIX}{jti}")).await?;
            info!("User {} signed out", sub);
        }

        Ok(())
    }

    /// An `@` in the keyword selects exact email lookup, anything else searches names.
    pub async fn search(
        &self,
        keyword: &str,
        page: &PageQuery,
    ) -> Result<Paginated<UserResponse>, error::SystemError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Paginated::empty(page));
        }

        if keyword.contains('@') {
            let found: Vec<UserResponse> = self
                .repo
                .find_by_email(keyword)
                .await?
                .filter(|u| u.is_active)
                .map(UserResponse::from)
                .into_iter()
                .collect();
            let total = found.len() as i64;
            let items = if page.offset() == 0 { found } else { Vec::new() };
            return Ok(Paginated::new(items, total, page));
        }

        let (users, total) = tokio::try_join!(
            self.repo.search_by_name(keyword, page.limit(), page.offset()),
            self.repo.count_by_name(keyword),
        )?;

        Ok(Paginated::new(users.into_iter().map(UserResponse::from).collect(), total, page))
    }

    async fn issue_tokens(&self, user_id: &Uuid) -> Result<TokenPair, error::SystemError> {
        let secret = self.tokens.secret.as_bytes();

        let access_token =
            Claims::new(user_id, TokenType::Access, self.tokens.access_ttl).encode(secret)?;

        let jti = Uuid::now_v7();
        let refresh_token = Claims::new(user_id, TokenType::Refresh, self.tokens.refresh_ttl)
            .with_jti(jti)
            .encode(secret)?;

        self.cache
            .set(&format!("{REFRESH_TOKEN_PREFIX}{jti}"), user_id, self.tokens.refresh_ttl)
            .await?;

        Ok(TokenPair { access_token, refresh_token })
    }
}
