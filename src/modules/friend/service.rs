use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::{
    model::PendingFriendRequest, repository::FriendRequestRepository,
    schema::FriendRequestEntity,
};
use crate::modules::notification::{
    model::NewNotification, schema::NotificationExtra, service::NotificationService,
};
use crate::modules::user::{
    model::PublicUser,
    service::{authenticate, DynUserRepository},
};
use crate::modules::websocket::{dispatcher::EventDispatcher, message::ServerMessage};
use crate::utils::parse_id;

pub type DynFriendRequestRepository = Arc<dyn FriendRequestRepository + Send + Sync>;

#[derive(Clone)]
pub struct FriendService {
    friend_repo: DynFriendRequestRepository,
    user_repo: DynUserRepository,
    notifications: NotificationService,
    dispatcher: EventDispatcher,
}

impl FriendService {
    pub fn with_dependencies(
        friend_repo: DynFriendRequestRepository,
        user_repo: DynUserRepository,
        notifications: NotificationService,
        dispatcher: EventDispatcher,
    ) -> Self {
        info!("FriendService initialized with dependencies");
        FriendService { friend_repo, user_repo, notifications, dispatcher }
    }

    /// Creates a pending request and its companion notification.
    ///
    /// The pair `{caller, target}` is unordered: a request already sent in either
    /// direction is a `Conflict`. The pre-insert count gives the usual answer and the
    /// unique index on the canonical pair catches two concurrent senders. Nothing is
    /// rolled back if the notification insert fails after the request was stored.
    pub async fn send_friend_request(
        &self,
        caller_id: Uuid,
        friend_id: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let caller = authenticate(&self.user_repo, caller_id).await?;
        let target_id = parse_id(friend_id, "Invalid friend id!")?;

        if target_id == caller.id {
            return Err(error::SystemError::bad_request("Cannot send a friend request to yourself!"));
        }

        if self.friend_repo.count_between(&caller.id, &target_id).await? > 0 {
            return Err(error::SystemError::conflict("Friend request sent already!"));
        }

        if self.user_repo.find_by_id(&target_id).await?.is_none() {
            return Err(error::SystemError::not_found("Could not find user!"));
        }

        let request = self.friend_repo.create(&caller.id, &target_id).await?;

        let notification = self
            .notifications
            .record(NewNotification {
                from_user_id: caller.id,
                to_user_id: target_id,
                extra: NotificationExtra::FriendRequest(request.id),
            })
            .await?;
        self.notifications.notify_new(&notification);

        info!("User {} sent friend request {} to {}", caller.id, request.id, target_id);
        Ok(request)
    }

    /// One-way `Pending -> Accepted`. Either participant may accept.
    pub async fn accept_friend_request(
        &self,
        caller_id: Uuid,
        request_id: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let caller = authenticate(&self.user_repo, caller_id).await?;
        let request_id = parse_id(request_id, "Invalid friend request id!")?;

        let mut request = self
            .friend_repo
            .find_for_participant(&request_id, &caller.id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Could not find friend request!"))?;

        if request.accepted {
            return Err(error::SystemError::bad_request("Friend request is not valid anymore!"));
        }

        if let Err(e) = self.notifications.mark_read_by_extra(&request.id, &caller.id).await {
            warn!("Could not mark notification for request {} read: {}", request.id, e);
        }

        let updated = self.friend_repo.mark_accepted(&request.id).await?;
        if updated != 1 {
            return Err(error::SystemError::internal(format!(
                "accepting friend request {} changed {} rows",
                request.id, updated
            )));
        }
        request.accepted = true;

        let other_id = request.other_participant(caller.id);
        self.dispatcher.dispatch(
            caller.id,
            ServerMessage::SelfFriendRequestAccepted { request_id: request.id, friend_id: other_id },
        );
        self.dispatcher.dispatch(
            other_id,
            ServerMessage::FriendRequestAccepted {
                request_id: request.id,
                friend: PublicUser::from(caller),
            },
        );

        Ok(request)
    }

    /// A missing user and a user that is not a friend look the same to the caller.
    pub async fn get_friend(
        &self,
        caller_id: Uuid,
        username: &str,
    ) -> Result<PublicUser, error::SystemError> {
        let caller = authenticate(&self.user_repo, caller_id).await?;

        let friend = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Could not find friend!"))?;

        self.friend_repo
            .find_accepted_between(&caller.id, &friend.id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Could not find friend!"))?;

        Ok(PublicUser::from(friend))
    }

    pub async fn get_friend_request(
        &self,
        caller_id: Uuid,
        request_id: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let caller = authenticate(&self.user_repo, caller_id).await?;
        let request_id = parse_id(request_id, "Invalid friend request id!")?;

        self.friend_repo
            .find_for_participant(&request_id, &caller.id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Could not find friend request!"))
    }

    pub async fn get_pending_friend_requests(
        &self,
        caller_id: Uuid,
    ) -> Result<Vec<PendingFriendRequest>, error::SystemError> {
        let caller = authenticate(&self.user_repo, caller_id).await?;

        let requests = self.friend_repo.find_pending_to_user(&caller.id).await.map_err(|e| {
            log::error!("Pending friend requests query failed: {}", e);
            error::SystemError::not_found("Could not find pending friends!")
        })?;

        let requester_ids: Vec<Uuid> = requests.iter().map(|r| r.user_id).collect();
        let mut requesters: HashMap<Uuid, PublicUser> = self
            .user_repo
            .find_by_ids(&requester_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, PublicUser::from(u)))
            .collect();

        let pending = requests
            .into_iter()
            .filter_map(|r| {
                let friend = requesters.remove(&r.user_id)?;
                Some(PendingFriendRequest { request_id: r.id, friend, created_at: r.created_at })
            })
            .collect();

        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::notification::model::NotificationQuery;
    use crate::modules::notification::schema::NotificationKind;
    use crate::test::Harness;

    fn all() -> NotificationQuery {
        NotificationQuery { limit: None, cursor: None }
    }

    #[actix_web::test]
    async fn send_stores_request_notification_and_push() {
        let mut h = Harness::new();
        let a = h.store.add_user("alice");
        let b = h.store.add_user("bob");

        let request = h.friends.send_friend_request(a, &b.to_string()).await.unwrap();
        assert_eq!((request.user_id, request.friend_id, request.accepted), (a, b, false));

        let inbox = h.notifications.get_notifications(b, all()).await.unwrap();
        assert_eq!(inbox.notifications.len(), 1);
        assert_eq!(inbox.notifications[0].kind, NotificationKind::NewFriend);
        assert_eq!(inbox.notifications[0].from_user.id, a);

        let events = h.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            (to, ServerMessage::NewNotification { kind: NotificationKind::NewFriend, .. }) if *to == b
        ));
    }

    #[actix_web::test]
    async fn second_request_in_either_direction_conflicts() {
        let h = Harness::new();
        let a = h.store.add_user("alice");
        let b = h.store.add_user("bob");

        h.friends.send_friend_request(a, &b.to_string()).await.unwrap();

        let again = h.friends.send_friend_request(a, &b.to_string()).await;
        assert!(matches!(again, Err(error::SystemError::Conflict(m)) if m == "Friend request sent already!"));
        let reverse = h.friends.send_friend_request(b, &a.to_string()).await;
        assert!(matches!(reverse, Err(error::SystemError::Conflict(_))));

        assert_eq!(h.store.request_count(), 1);
    }

    #[actix_web::test]
    async fn concurrent_senders_leave_one_request() {
        let h = Harness::new();
        let a = h.store.add_user("alice");
        let b = h.store.add_user("bob");
        let (a_str, b_str) = (a.to_string(), b.to_string());

        let (first, second) = futures_util::join!(
            h.friends.send_friend_request(a, &b_str),
            h.friends.send_friend_request(b, &a_str),
        );

        assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(h.store.request_count(), 1);
    }

    #[actix_web::test]
    async fn send_rejects_bad_targets() {
        let h = Harness::new();
        let a = h.store.add_user("alice");

        let res = h.friends.send_friend_request(a, "not-a-uuid").await;
        assert!(matches!(res, Err(error::SystemError::BadRequest(_))));
        let res = h.friends.send_friend_request(a, &a.to_string()).await;
        assert!(matches!(res, Err(error::SystemError::BadRequest(_))));
        let res = h.friends.send_friend_request(a, &Uuid::now_v7().to_string()).await;
        assert!(matches!(res, Err(error::SystemError::NotFound(_))));
        let res = h.friends.send_friend_request(Uuid::now_v7(), &a.to_string()).await;
        assert!(matches!(res, Err(error::SystemError::Unauthorized(_))));

        assert_eq!(h.store.request_count(), 0);
    }

    #[actix_web::test]
    async fn failed_notification_keeps_the_request() {
        let h = Harness::new();
        let a = h.store.add_user("alice");
        let b = h.store.add_user("bob");
        h.store.fail_notification_writes(true);

        let res = h.friends.send_friend_request(a, &b.to_string()).await;
        assert!(matches!(res, Err(error::SystemError::InternalError(_))));
        assert_eq!(h.store.request_count(), 1);
        assert_eq!(h.store.notification_count(), 0);
    }

    #[actix_web::test]
    async fn closed_push_queue_does_not_fail_the_call() {
        let mut h = Harness::new();
        let a = h.store.add_user("alice");
        let b = h.store.add_user("bob");
        h.close_push_queue();

        h.friends.send_friend_request(a, &b.to_string()).await.unwrap();
        assert_eq!(h.store.notification_count(), 1);
    }

    #[actix_web::test]
    async fn accept_is_one_way() {
        let h = Harness::new();
        let a = h.store.add_user("alice");
        let b = h.store.add_user("bob");
        let request = h.friends.send_friend_request(a, &b.to_string()).await.unwrap();

        let accepted = h.friends.accept_friend_request(b, &request.id.to_string()).await.unwrap();
        assert!(accepted.accepted);

        let again = h.friends.accept_friend_request(b, &request.id.to_string()).await;
        assert!(matches!(again, Err(error::SystemError::BadRequest(m)) if m == "Friend request is not valid anymore!"));
        let by_sender = h.friends.accept_friend_request(a, &request.id.to_string()).await;
        assert!(matches!(by_sender, Err(error::SystemError::BadRequest(_))));

        let stored = h.friends.get_friend_request(a, &request.id.to_string()).await.unwrap();
        assert!(stored.accepted);
    }

    #[actix_web::test]
    async fn only_participants_can_see_or_accept() {
        let h = Harness::new();
        let a = h.store.add_user("alice");
        let b = h.store.add_user("bob");
        let c = h.store.add_user("carol");
        let request = h.friends.send_friend_request(a, &b.to_string()).await.unwrap();
        let id = request.id.to_string();

        let res = h.friends.accept_friend_request(c, &id).await;
        assert!(matches!(res, Err(error::SystemError::NotFound(_))));
        let res = h.friends.get_friend_request(c, &id).await;
        assert!(matches!(res, Err(error::SystemError::NotFound(_))));
        let res = h.friends.accept_friend_request(b, "xyz").await;
        assert!(matches!(res, Err(error::SystemError::BadRequest(_))));

        assert!(h.friends.get_friend_request(b, &id).await.is_ok());
    }

    #[actix_web::test]
    async fn accept_pushes_to_both_participants() {
        let mut h = Harness::new();
        let a = h.store.add_user("alice");
        let b = h.store.add_user("bob");
        let request = h.friends.send_friend_request(a, &b.to_string()).await.unwrap();
        h.drain_events();

        h.friends.accept_friend_request(b, &request.id.to_string()).await.unwrap();

        let events = h.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            (b, ServerMessage::SelfFriendRequestAccepted { request_id: request.id, friend_id: a })
        );
        assert!(matches!(
            &events[1],
            (to, ServerMessage::FriendRequestAccepted { request_id, friend })
                if *to == a && *request_id == request.id && friend.id == b
        ));
    }

    #[actix_web::test]
    async fn request_accept_and_befriend_scenario() {
        let h = Harness::new();
        let a = h.store.add_user("alice");
        let b = h.store.add_user("bob");

        h.friends.send_friend_request(a, &b.to_string()).await.unwrap();

        let pending = h.friends.get_pending_friend_requests(b).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].friend.id, a);
        assert!(h.friends.get_pending_friend_requests(a).await.unwrap().is_empty());

        let res = h.friends.get_friend(a, "bob").await;
        assert!(matches!(res, Err(error::SystemError::NotFound(_))));

        h.friends.accept_friend_request(b, &pending[0].request_id.to_string()).await.unwrap();

        assert_eq!(h.friends.get_friend(a, "bob").await.unwrap().id, b);
        assert_eq!(h.friends.get_friend(b, "alice").await.unwrap().id, a);
        assert!(h.friends.get_pending_friend_requests(b).await.unwrap().is_empty());

        let inbox = h.notifications.get_notifications(b, all()).await.unwrap();
        assert_eq!(inbox.unread_count, 0);
        assert!(inbox.notifications[0].read);
        assert!(inbox.notifications[0].read_at.is_some());
    }

    #[actix_web::test]
    async fn lost_accept_update_is_internal_and_pushes_nothing() {
        let mut h = Harness::new();
        let a = h.store.add_user("alice");
        let b = h.store.add_user("bob");
        let request = h.friends.send_friend_request(a, &b.to_string()).await.unwrap();
        let id = request.id.to_string();
        h.drain_events();

        h.store.skip_accept_updates(true);
        let lost = h.friends.accept_friend_request(b, &id).await;
        assert!(matches!(lost, Err(error::SystemError::InternalError(_))));
        assert!(h.drain_events().is_empty());
        assert!(!h.friends.get_friend_request(b, &id).await.unwrap().accepted);

        h.store.skip_accept_updates(false);
        h.friends.accept_friend_request(b, &id).await.unwrap();
        let events = h.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].1, ServerMessage::SelfFriendRequestAccepted { .. }));
        assert!(matches!(events[1].1, ServerMessage::FriendRequestAccepted { .. }));
    }

    #[actix_web::test]
    async fn friend_lookup_matches_username_exactly() {
        let h = Harness::new();
        let a = h.store.add_user("alice");
        let upper = h.store.add_user("Bob");
        let lower = h.store.add_user("bob");
        let request = h.friends.send_friend_request(a, &lower.to_string()).await.unwrap();
        h.friends.accept_friend_request(lower, &request.id.to_string()).await.unwrap();

        assert_eq!(h.friends.get_friend(a, "bob").await.unwrap().id, lower);
        let res = h.friends.get_friend(a, "Bob").await;
        assert!(matches!(res, Err(error::SystemError::NotFound(_))));
        assert_ne!(upper, lower);
    }

    #[actix_web::test]
    async fn unknown_user_and_stranger_look_the_same() {
        let h = Harness::new();
        let a = h.store.add_user("alice");
        h.store.add_user("bob");

        let stranger = h.friends.get_friend(a, "bob").await;
        let missing = h.friends.get_friend(a, "nobody").await;
        assert!(matches!(stranger, Err(error::SystemError::NotFound(ref m)) if m == "Could not find friend!"));
        assert!(matches!(missing, Err(error::SystemError::NotFound(ref m)) if m == "Could not find friend!"));
    }

    #[actix_web::test]
    async fn pending_requests_come_back_oldest_first() {
        let h = Harness::new();
        let me = h.store.add_user("me");
        let first = h.store.add_user("first");
        let second = h.store.add_user("second");

        h.friends.send_friend_request(first, &me.to_string()).await.unwrap();
        h.friends.send_friend_request(second, &me.to_string()).await.unwrap();

        let pending = h.friends.get_pending_friend_requests(me).await.unwrap();
        let from: Vec<Uuid> = pending.iter().map(|p| p.friend.id).collect();
        assert_eq!(from, vec![first, second]);
    }
}
