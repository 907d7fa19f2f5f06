use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::configs::RedisCache;
use crate::modules::user::{model::UserResponse, repository::UserRepository, schema::UserEntity};

pub type DynUserRepository = Arc<dyn UserRepository + Send + Sync>;

/// Resolves an authenticated token subject to a live user. A token whose user has
/// disappeared is treated exactly like a bad token.
pub async fn authenticate(
    repo: &DynUserRepository,
    user_id: Uuid,
) -> Result<UserEntity, error::SystemError> {
    repo.find_by_id(&user_id).await?.ok_or_else(|| error::SystemError::unauthorized("Unauthorized!"))
}

#[derive(Clone)]
pub struct UserService {
    repo: DynUserRepository,
    cache: Arc<RedisCache>,
    cache_ttl: u64,
}

impl UserService {
    pub fn with_dependencies(repo: DynUserRepository, cache: Arc<RedisCache>, cache_ttl: u64) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache, cache_ttl }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = format!("user:{}", user_id);
        if let Some(cached_user) = self.cache.get::<UserResponse>(&key).await? {
            info!("User {} found in cache", user_id);
            return Ok(cached_user);
        }

        let entity = authenticate(&self.repo, user_id).await?;
        let response = UserResponse::from(entity);
        self.cache.set(&key, &response, self.cache_ttl).await?;
        info!("User {} cached", user_id);

        Ok(response)
    }
}
