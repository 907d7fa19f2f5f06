use futures_util::future::join_all;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::service::DynFriendRequestRepository;
use crate::modules::notification::{
    model::{
        parse_extra_id, CreateNotificationBody, CreatedNotification, NewNotification,
        NotificationData, NotificationList, NotificationQuery, NotificationResponse,
        PageCursor, DEFAULT_PAGE_SIZE,
    },
    repository::NotificationRepository,
    schema::{NotificationEntity, NotificationExtra},
};
use crate::modules::theater::{model::TheaterResponse, service::DynTheaterRepository};
use crate::modules::user::{
    model::PublicUser,
    service::{authenticate, DynUserRepository},
};
use crate::modules::websocket::{dispatcher::EventDispatcher, message::ServerMessage};
use crate::utils::parse_id;

pub type DynNotificationRepository = Arc<dyn NotificationRepository + Send + Sync>;

#[derive(Clone)]
pub struct NotificationService {
    repo: DynNotificationRepository,
    user_repo: DynUserRepository,
    friend_repo: DynFriendRequestRepository,
    theater_repo: DynTheaterRepository,
    dispatcher: EventDispatcher,
}

impl NotificationService {
    pub fn with_dependencies(
        repo: DynNotificationRepository,
        user_repo: DynUserRepository,
        friend_repo: DynFriendRequestRepository,
        theater_repo: DynTheaterRepository,
        dispatcher: EventDispatcher,
    ) -> Self {
        info!("NotificationService initialized with dependencies");
        NotificationService { repo, user_repo, friend_repo, theater_repo, dispatcher }
    }

    pub async fn record(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationEntity, error::SystemError> {
        self.repo.create(&notification).await
    }

    pub async fn record_many(
        &self,
        notifications: &[NewNotification],
    ) -> Result<Vec<NotificationEntity>, error::SystemError> {
        self.repo.create_many(notifications).await
    }

    /// Best-effort live hint that a stored notification is waiting.
    pub fn notify_new(&self, notification: &NotificationEntity) {
        self.dispatcher.dispatch(
            notification.to_user_id,
            ServerMessage::NewNotification {
                notification_id: notification.id,
                kind: notification.kind,
            },
        );
    }

    pub async fn mark_read_by_extra(
        &self,
        extra: &Uuid,
        to_user_id: &Uuid,
    ) -> Result<u64, error::SystemError> {
        self.repo.mark_read_by_extra(extra, to_user_id).await
    }

    pub async fn create_notification(
        &self,
        caller_id: Uuid,
        body: CreateNotificationBody,
    ) -> Result<CreatedNotification, error::SystemError> {
        let caller = authenticate(&self.user_repo, caller_id).await?;
        let to_user_id = parse_id(&body.to_user_id, "Invalid recipient id!")?;

        if self.user_repo.find_by_id(&to_user_id).await?.is_none() {
            return Err(error::SystemError::bad_request("Recipient does not exist!"));
        }

        let extra_id = parse_extra_id(&body.extra)
            .ok_or_else(|| error::SystemError::bad_request("Invalid notification extra!"))?;
        let extra = NotificationExtra::from_parts(body.kind, extra_id);

        if !self.extra_is_valid(caller.id, extra).await? {
            return Err(error::SystemError::bad_request("Invalid notification extra!"));
        }

        let created = self
            .record(NewNotification { from_user_id: caller.id, to_user_id, extra })
            .await?;
        self.notify_new(&created);

        Ok(CreatedNotification {
            id: created.id,
            kind: created.kind,
            from_user_id: created.from_user_id,
            to_user_id: created.to_user_id,
            extra: created.extra,
            read: created.read,
            created_at: created.created_at,
        })
    }

    async fn extra_is_valid(
        &self,
        caller_id: Uuid,
        extra: NotificationExtra,
    ) -> Result<bool, error::SystemError> {
        let valid = match extra {
            NotificationExtra::FriendRequest(id) => {
                self.friend_repo.find_by_id(&id).await?.is_some_and(|r| r.involves(caller_id))
            }
            NotificationExtra::Theater(id) => self.theater_repo.find_by_id(&id).await?.is_some(),
        };
        Ok(valid)
    }

    pub async fn get_notifications(
        &self,
        caller_id: Uuid,
        query: NotificationQuery,
    ) -> Result<NotificationList, error::SystemError> {
        let caller = authenticate(&self.user_repo, caller_id).await?;

        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let before = match query.cursor.as_deref() {
            Some(cursor) => Some(
                PageCursor::parse(cursor)
                    .ok_or_else(|| error::SystemError::bad_request("Invalid cursor!"))?,
            ),
            None => None,
        };

        let (mut rows, unread_count) = tokio::try_join!(
            self.repo.find_by_recipient(&caller.id, before, limit + 1),
            self.repo.count_unread(&caller.id),
        )?;

        let has_more = rows.len() > limit as usize;
        rows.truncate(limit as usize);
        let next_cursor = if has_more {
            rows.last().map(|n| PageCursor { created_at: n.created_at, id: n.id }.encode())
        } else {
            None
        };

        let mut sender_ids: Vec<Uuid> = rows.iter().map(|n| n.from_user_id).collect();
        sender_ids.sort();
        sender_ids.dedup();
        let senders: HashMap<Uuid, PublicUser> = self
            .user_repo
            .find_by_ids(&sender_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, PublicUser::from(u)))
            .collect();

        let resolved = join_all(rows.into_iter().map(|n| self.resolve(n, &senders))).await;
        let notifications = resolved.into_iter().flatten().collect();

        Ok(NotificationList { notifications, unread_count, next_cursor })
    }

    /// `None` when the sender or the related entity can no longer be found.
    async fn resolve(
        &self,
        notification: NotificationEntity,
        senders: &HashMap<Uuid, PublicUser>,
    ) -> Option<NotificationResponse> {
        let Some(from_user) = senders.get(&notification.from_user_id).cloned() else {
            warn!("Skipping notification {}: sender is gone", notification.id);
            return None;
        };

        let data = match self.resolve_extra(notification.extra()).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Skipping notification {}: {}", notification.id, e);
                return None;
            }
        };

        Some(NotificationResponse {
            id: notification.id,
            kind: notification.kind,
            read: notification.read,
            read_at: notification.read_at,
            from_user,
            data,
            created_at: notification.created_at,
            updated_at: notification.updated_at,
        })
    }

    pub async fn resolve_extra(
        &self,
        extra: NotificationExtra,
    ) -> Result<NotificationData, error::SystemError> {
        match extra {
            NotificationExtra::FriendRequest(id) => self
                .friend_repo
                .find_by_id(&id)
                .await?
                .map(NotificationData::FriendRequest)
                .ok_or_else(|| error::SystemError::not_found("Friend request no longer exists")),
            NotificationExtra::Theater(id) => self
                .theater_repo
                .find_by_id(&id)
                .await?
                .map(|t| NotificationData::Theater(TheaterResponse::from(t)))
                .ok_or_else(|| error::SystemError::not_found("Theater no longer exists")),
        }
    }

    pub async fn read_all(&self, caller_id: Uuid) -> Result<u64, error::SystemError> {
        let caller = authenticate(&self.user_repo, caller_id).await?;
        let updated = self.repo.mark_all_read(&caller.id).await?;
        info!("Marked {} notifications read for user {}", updated, caller.id);
        Ok(updated)
    }
}
