use log::info;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::notification::{
    model::NewNotification, schema::NotificationExtra, service::NotificationService,
};
use crate::modules::theater::repository::TheaterRepository;
use crate::modules::user::service::{authenticate, DynUserRepository};
use crate::utils::parse_id;

pub type DynTheaterRepository = Arc<dyn TheaterRepository + Send + Sync>;

#[derive(Clone)]
pub struct TheaterService {
    repo: DynTheaterRepository,
    user_repo: DynUserRepository,
    notifications: NotificationService,
}

impl TheaterService {
    pub fn with_dependencies(
        repo: DynTheaterRepository,
        user_repo: DynUserRepository,
        notifications: NotificationService,
    ) -> Self {
        info!("TheaterService initialized with dependencies");
        TheaterService { repo, user_repo, notifications }
    }

    /// Stores one invite notification per existing invitee, then pushes to each of them.
    /// Malformed ids, duplicates and the theater owner are dropped from the list.
    pub async fn invite(
        &self,
        caller_id: Uuid,
        theater_id: &str,
        friend_ids: &[String],
    ) -> Result<Vec<Uuid>, error::SystemError> {
        let caller = authenticate(&self.user_repo, caller_id).await?;
        let theater_id = parse_id(theater_id, "Invalid theater id!")?;
        let theater = self
            .repo
            .find_by_id(&theater_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Could not find theater!"))?;

        let mut seen = HashSet::new();
        let candidates: Vec<Uuid> = friend_ids
            .iter()
            .filter_map(|raw| Uuid::parse_str(raw.trim()).ok())
            .filter(|id| *id != theater.user_id && seen.insert(*id))
            .collect();

        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let existing: HashSet<Uuid> =
            self.user_repo.find_by_ids(&candidates).await?.into_iter().map(|u| u.id).collect();

        let batch: Vec<NewNotification> = candidates
            .into_iter()
            .filter(|id| existing.contains(id))
            .map(|to_user_id| NewNotification {
                from_user_id: caller.id,
                to_user_id,
                extra: NotificationExtra::Theater(theater.id),
            })
            .collect();

        if batch.is_empty() {
            return Ok(vec![]);
        }

        let created = self.notifications.record_many(&batch).await?;
        for notification in &created {
            self.notifications.notify_new(notification);
        }

        info!("User {} invited {} users to theater {}", caller.id, created.len(), theater.id);
        Ok(created.into_iter().map(|n| n.to_user_id).collect())
    }
}
