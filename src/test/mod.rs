//! In-memory repositories and sinks for exercising the services without Postgres or live sockets.
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, LazyLock, Mutex, MutexGuard, Once,
};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::{
    repository::FriendRequestRepository,
    schema::{canonical_pair, FriendRequestEntity},
    service::FriendService,
};
use crate::modules::notification::{
    model::{NewNotification, PageCursor},
    repository::NotificationRepository, schema::NotificationEntity,
    service::NotificationService,
};
use crate::modules::theater::{
    repository::TheaterRepository, schema::TheaterEntity, service::TheaterService,
};
use crate::modules::user::{
    repository::UserRepository,
    schema::{UserEntity, UserState},
};
use crate::modules::websocket::{
    dispatcher::{EventDispatcher, EventSink, PushError, PushTask},
    message::ServerMessage,
};

type Timestamp = chrono::DateTime<chrono::Utc>;

/// Fills the required variables with local defaults so handlers can read `ENV`.
pub fn init_env() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        for (key, value) in [
            ("SECRET_KEY", "test-secret"),
            ("DATABASE_URL", "postgres://localhost/watchparty_test"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
        ] {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    });
    LazyLock::force(&crate::ENV);
}

#[derive(Default)]
struct State {
    users: Vec<UserEntity>,
    theaters: Vec<TheaterEntity>,
    requests: Vec<FriendRequestEntity>,
    notifications: Vec<NotificationEntity>,
    ticks: i64,
    frozen: bool,
}

impl State {
    /// Strictly increasing timestamps so ordering by `created_at` is deterministic.
    fn now(&mut self) -> Timestamp {
        if !self.frozen {
            self.ticks += 1;
        }
        chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap()
            + chrono::Duration::milliseconds(self.ticks)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    fail_notification_writes: Arc<AtomicBool>,
    skip_accept_updates: Arc<AtomicBool>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_user(&self, username: &str) -> Uuid {
        let mut state = self.lock();
        let now = state.now();
        let id = Uuid::now_v7();
        state.users.push(UserEntity {
            id,
            username: username.to_string(),
            fullname: username.to_uppercase(),
            avatar: None,
            email: format!("{username}@example.com"),
            state: UserState::Online,
            activity_id: None,
            activity: None,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_theater(&self, owner: Uuid, title: &str) -> Uuid {
        let mut state = self.lock();
        let now = state.now();
        let id = Uuid::now_v7();
        state.theaters.push(TheaterEntity {
            id,
            user_id: owner,
            title: title.to_string(),
            hash: id.simple().to_string(),
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn remove_theater(&self, id: Uuid) {
        self.lock().theaters.retain(|t| t.id != id);
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn notification_count(&self) -> usize {
        self.lock().notifications.len()
    }

    pub fn fail_notification_writes(&self, fail: bool) {
        self.fail_notification_writes.store(fail, Ordering::SeqCst);
    }

    /// `mark_accepted` reports zero changed rows, as when another accept won the update.
    pub fn skip_accept_updates(&self, skip: bool) {
        self.skip_accept_updates.store(skip, Ordering::SeqCst);
    }

    /// Every write from now on gets the same timestamp.
    pub fn freeze_clock(&self) {
        self.lock().frozen = true;
    }

    fn check_notification_writes(&self) -> Result<(), error::SystemError> {
        if self.fail_notification_writes.load(Ordering::SeqCst) {
            return Err(error::SystemError::internal("notification store unavailable"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.lock().users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let state = self.lock();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError> {
        Ok(self.lock().users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }
}

#[async_trait::async_trait]
impl TheaterRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<TheaterEntity>, error::SystemError> {
        Ok(self.lock().theaters.iter().find(|t| t.id == *id).cloned())
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for MemoryStore {
    async fn count_between(&self, a: &Uuid, b: &Uuid) -> Result<i64, error::SystemError> {
        let pair = canonical_pair(*a, *b);
        let state = self.lock();
        let count =
            state.requests.iter().filter(|r| canonical_pair(r.user_id, r.friend_id) == pair).count();
        Ok(count as i64)
    }

    async fn find_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        Ok(self.lock().requests.iter().find(|r| r.id == *request_id).cloned())
    }

    async fn find_for_participant(
        &self,
        request_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let state = self.lock();
        Ok(state.requests.iter().find(|r| r.id == *request_id && r.involves(*user_id)).cloned())
    }

    async fn find_accepted_between(
        &self,
        a: &Uuid,
        b: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let pair = canonical_pair(*a, *b);
        let state = self.lock();
        Ok(state
            .requests
            .iter()
            .find(|r| r.accepted && canonical_pair(r.user_id, r.friend_id) == pair)
            .cloned())
    }

    async fn find_pending_to_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let state = self.lock();
        Ok(state.requests.iter().filter(|r| r.friend_id == *user_id && !r.accepted).cloned().collect())
    }

    async fn create(
        &self,
        user_id: &Uuid,
        friend_id: &Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let pair = canonical_pair(*user_id, *friend_id);
        let mut state = self.lock();
        if state.requests.iter().any(|r| canonical_pair(r.user_id, r.friend_id) == pair) {
            return Err(error::SystemError::conflict("Friend request sent already!"));
        }

        let now = state.now();
        let request = FriendRequestEntity {
            id: Uuid::now_v7(),
            user_id: *user_id,
            friend_id: *friend_id,
            accepted: false,
            created_at: now,
            updated_at: now,
        };
        state.requests.push(request.clone());
        Ok(request)
    }

    async fn mark_accepted(&self, request_id: &Uuid) -> Result<u64, error::SystemError> {
        if self.skip_accept_updates.load(Ordering::SeqCst) {
            return Ok(0);
        }
        let mut state = self.lock();
        let now = state.now();
        let mut updated = 0;
        for request in state.requests.iter_mut().filter(|r| r.id == *request_id && !r.accepted) {
            request.accepted = true;
            request.updated_at = now;
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait::async_trait]
impl NotificationRepository for MemoryStore {
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationEntity, error::SystemError> {
        let mut created = self.create_many(std::slice::from_ref(notification)).await?;
        created.pop().ok_or_else(|| error::SystemError::internal("nothing inserted"))
    }

    async fn create_many(
        &self,
        notifications: &[NewNotification],
    ) -> Result<Vec<NotificationEntity>, error::SystemError> {
        self.check_notification_writes()?;

        let mut state = self.lock();
        let mut created = Vec::with_capacity(notifications.len());
        for n in notifications {
            let now = state.now();
            let entity = NotificationEntity {
                id: Uuid::now_v7(),
                kind: n.extra.kind(),
                read: false,
                from_user_id: n.from_user_id,
                to_user_id: n.to_user_id,
                extra: n.extra.id(),
                read_at: None,
                created_at: now,
                updated_at: now,
            };
            state.notifications.push(entity.clone());
            created.push(entity);
        }
        Ok(created)
    }

    async fn find_by_recipient(
        &self,
        to_user_id: &Uuid,
        before: Option<PageCursor>,
        limit: i64,
    ) -> Result<Vec<NotificationEntity>, error::SystemError> {
        let state = self.lock();
        let mut rows: Vec<NotificationEntity> = state
            .notifications
            .iter()
            .filter(|n| n.to_user_id == *to_user_id)
            .filter(|n| before.map_or(true, |c| (n.created_at, n.id) < (c.created_at, c.id)))
            .cloned()
            .collect();
        rows.sort_by(|x, y| y.created_at.cmp(&x.created_at).then(y.id.cmp(&x.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn count_unread(&self, to_user_id: &Uuid) -> Result<i64, error::SystemError> {
        let state = self.lock();
        let count =
            state.notifications.iter().filter(|n| n.to_user_id == *to_user_id && !n.read).count();
        Ok(count as i64)
    }

    async fn mark_read_by_extra(
        &self,
        extra: &Uuid,
        to_user_id: &Uuid,
    ) -> Result<u64, error::SystemError> {
        self.check_notification_writes()?;
        Ok(self.mark_read(|n| n.extra == *extra && n.to_user_id == *to_user_id))
    }

    async fn mark_all_read(&self, to_user_id: &Uuid) -> Result<u64, error::SystemError> {
        self.check_notification_writes()?;
        Ok(self.mark_read(|n| n.to_user_id == *to_user_id))
    }
}

impl MemoryStore {
    fn mark_read(&self, matches: impl Fn(&NotificationEntity) -> bool) -> u64 {
        let mut state = self.lock();
        let now = state.now();
        let mut updated = 0;
        for n in state.notifications.iter_mut().filter(|n| !n.read && matches(n)) {
            n.read = true;
            n.read_at = Some(now);
            n.updated_at = now;
            updated += 1;
        }
        updated
    }
}

/// Remembers every event handed to it.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<(Uuid, ServerMessage)>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(Uuid, ServerMessage)> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn push(&self, user_id: Uuid, message: ServerMessage) -> Result<(), PushError> {
        self.events.lock().unwrap().push((user_id, message));
        Ok(())
    }
}

/// Rejects every event, counting the attempts.
#[derive(Clone, Default)]
pub struct FailingSink {
    attempts: Arc<AtomicUsize>,
}

impl FailingSink {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl EventSink for FailingSink {
    fn push(&self, _user_id: Uuid, _message: ServerMessage) -> Result<(), PushError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PushError::Disconnected)
    }
}

/// Services wired to one `MemoryStore`, with the push queue left undrained so
/// tests can inspect exactly what was dispatched.
pub struct Harness {
    pub store: MemoryStore,
    pub friends: FriendService,
    pub notifications: NotificationService,
    pub theaters: TheaterService,
    rx: mpsc::Receiver<PushTask>,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::default();
        let (dispatcher, rx) = EventDispatcher::channel(64);

        let notifications = NotificationService::with_dependencies(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            dispatcher.clone(),
        );
        let friends = FriendService::with_dependencies(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            notifications.clone(),
            dispatcher,
        );
        let theaters = TheaterService::with_dependencies(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            notifications.clone(),
        );

        Harness { store, friends, notifications, theaters, rx }
    }

    pub fn drain_events(&mut self) -> Vec<(Uuid, ServerMessage)> {
        let mut events = vec![];
        while let Ok(task) = self.rx.try_recv() {
            events.push((task.user_id, task.message));
        }
        events
    }

    /// Simulates a stopped dispatcher worker.
    pub fn close_push_queue(&mut self) {
        self.rx.close();
    }
}
