//! In-memory stand-ins for Postgres, Redis and the wall clock, plus an app builder for
//! handler tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse},
    http::StatusCode,
    test, web, App,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    api::error::{self, DbErrorMeta},
    configs::CacheStore,
    modules::{
        self,
        friend::{
            model::{FriendResponse, NewFriendRequest, ReceivedFriendRequest},
            rate_limit::{SentWindow, SlidingWindow},
            repository::{FriendRepository, FriendRequestRepository, PENDING_PAIR_CONSTRAINT},
            schema::{FriendRequestEntity, FriendRequestStatus},
            service::FriendService,
        },
        user::{
            model::{InsertUser, UserResponse},
            repository::UserRepository,
            schema::UserEntity,
            service::UserService,
        },
    },
    utils::{Claims, Clock, TokenConfig, TokenType},
};

const TEST_SECRET: &str = "test-secret-key";

fn unique_violation(constraint: &str) -> error::SystemError {
    error::SystemError::UniqueViolation(Some(DbErrorMeta {
        code: Some("23505".into()),
        constraint: Some(constraint.into()),
        message: format!("duplicate key value violates unique constraint \"{constraint}\""),
    }))
}

/// Whether the request is between `a` and `b`, in either direction.
fn involves(request: &FriendRequestEntity, a: &Uuid, b: &Uuid) -> bool {
    (request.from_user_id == *a && request.to_user_id == *b)
        || (request.from_user_id == *b && request.to_user_id == *a)
}

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items.into_iter().skip(offset.max(0) as usize).take(limit.max(0) as usize).collect()
}

/// Users and friend requests held in memory, following the SQL repositories' semantics.
#[derive(Default)]
pub struct MemoryDb {
    users: Mutex<Vec<UserEntity>>,
    requests: Mutex<Vec<FriendRequestEntity>>,
    hide_pending: Mutex<bool>,
}

impl MemoryDb {
    pub fn seed_user(&self, email: &str, first_name: &str, last_name: &str) -> UserEntity {
        let now = Utc::now();
        let user = UserEntity {
            id: Uuid::now_v7(),
            email: email.to_string(),
            hash_password: String::new(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn deactivate(&self, id: &Uuid) {
        if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.id == *id) {
            user.is_active = false;
        }
    }

    /// Makes `find_pending_between` miss so the pair constraint is what rejects a duplicate.
    pub fn hide_pending_from_lookups(&self, hide: bool) {
        *self.hide_pending.lock().unwrap() = hide;
    }

    fn user(&self, id: &Uuid) -> Option<UserEntity> {
        self.users.lock().unwrap().iter().find(|u| u.id == *id).cloned()
    }

    fn name_matches(&self, term: &str) -> Vec<UserEntity> {
        let term = term.to_lowercase();
        let mut found: Vec<UserEntity> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.is_active)
            .filter(|u| {
                u.first_name.to_lowercase().contains(&term)
                    || u.last_name.to_lowercase().contains(&term)
                    || format!("{} {}", u.first_name, u.last_name).to_lowercase().contains(&term)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            (&a.first_name, &a.last_name, a.id).cmp(&(&b.first_name, &b.last_name, b.id))
        });
        found
    }

    fn friends(&self, user_id: &Uuid) -> Vec<FriendResponse> {
        let mut since: HashMap<Uuid, Option<DateTime<Utc>>> = HashMap::new();
        for r in self.requests.lock().unwrap().iter() {
            if r.status != FriendRequestStatus::Accepted {
                continue;
            }
            let other = if r.from_user_id == *user_id {
                r.to_user_id
            } else if r.to_user_id == *user_id {
                r.from_user_id
            } else {
                continue;
            };
            let entry = since.entry(other).or_insert(None);
            if let Some(at) = r.responded_at {
                *entry = Some(entry.map_or(at, |current| current.min(at)));
            }
        }

        let mut friends: Vec<FriendResponse> = since
            .into_iter()
            .filter_map(|(id, friends_since)| {
                self.user(&id).map(|u| FriendResponse {
                    id: u.id,
                    email: u.email,
                    first_name: u.first_name,
                    last_name: u.last_name,
                    friends_since,
                })
            })
            .collect();
        friends.sort_by(|a, b| {
            (&a.first_name, &a.last_name, a.id).cmp(&(&b.first_name, &b.last_name, b.id))
        });
        friends
    }

    fn received_pending(&self, user_id: &Uuid) -> Vec<FriendRequestEntity> {
        let mut pending: Vec<FriendRequestEntity> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.to_user_id == *user_id && r.status == FriendRequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        pending
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryDb {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.user(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let email = email.to_lowercase();
        Ok(self.users.lock().unwrap().iter().find(|u| u.email.to_lowercase() == email).cloned())
    }

    async fn create(&self, user: &InsertUser) -> Result<UserEntity, error::SystemError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email.to_lowercase() == user.email.to_lowercase()) {
            return Err(unique_violation("users_unique_email"));
        }

        let now = Utc::now();
        let entity = UserEntity {
            id: user.id,
            email: user.email.clone(),
            hash_password: user.hash_password.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        users.push(entity.clone());
        Ok(entity)
    }

    async fn search_by_name(
        &self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        Ok(page(self.name_matches(term), limit, offset))
    }

    async fn count_by_name(&self, term: &str) -> Result<i64, error::SystemError> {
        Ok(self.name_matches(term).len() as i64)
    }
}

#[async_trait::async_trait]
impl FriendRepository for MemoryDb {
    async fn are_friends(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError> {
        Ok(self.requests.lock().unwrap().iter().any(|r| {
            r.status == FriendRequestStatus::Accepted && involves(r, user_id_a, user_id_b)
        }))
    }

    async fn find_friends(
        &self,
        user_id: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        Ok(page(self.friends(user_id), limit, offset))
    }

    async fn count_friends(&self, user_id: &Uuid) -> Result<i64, error::SystemError> {
        Ok(self.friends(user_id).len() as i64)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for MemoryDb {
    async fn find_friend_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        Ok(self.requests.lock().unwrap().iter().find(|r| r.id == *request_id).cloned())
    }

    async fn find_pending_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        if *self.hide_pending.lock().unwrap() {
            return Ok(None);
        }
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.status == FriendRequestStatus::Pending && involves(r, user_id_a, user_id_b))
            .cloned())
    }

    async fn find_received_pending(
        &self,
        user_id: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReceivedFriendRequest>, error::SystemError> {
        let received = page(self.received_pending(user_id), limit, offset)
            .into_iter()
            .filter_map(|r| {
                self.user(&r.from_user_id).map(|u| ReceivedFriendRequest {
                    id: r.id,
                    from_user: UserResponse::from(u),
                    status: r.status,
                    created_at: r.created_at,
                })
            })
            .collect();
        Ok(received)
    }

    async fn count_received_pending(&self, user_id: &Uuid) -> Result<i64, error::SystemError> {
        Ok(self.received_pending(user_id).len() as i64)
    }

    async fn sent_since(
        &self,
        sender_id: &Uuid,
        since: DateTime<Utc>,
    ) -> Result<SentWindow, error::SystemError> {
        let requests = self.requests.lock().unwrap();
        let sent: Vec<DateTime<Utc>> = requests
            .iter()
            .filter(|r| r.from_user_id == *sender_id && r.created_at >= since)
            .map(|r| r.created_at)
            .collect();

        Ok(SentWindow { count: sent.len() as i64, oldest: sent.into_iter().min() })
    }

    async fn create_friend_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut requests = self.requests.lock().unwrap();
        if requests.iter().any(|r| {
            r.status == FriendRequestStatus::Pending
                && involves(r, &request.from_user_id, &request.to_user_id)
        }) {
            return Err(unique_violation(PENDING_PAIR_CONSTRAINT));
        }

        let entity = FriendRequestEntity {
            id: request.id,
            from_user_id: request.from_user_id,
            to_user_id: request.to_user_id,
            status: FriendRequestStatus::Pending,
            created_at: request.created_at,
            responded_at: None,
        };
        requests.push(entity.clone());
        Ok(entity)
    }

    async fn resolve_pending(
        &self,
        request_id: &Uuid,
        status: FriendRequestStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let mut requests = self.requests.lock().unwrap();
        let Some(request) = requests
            .iter_mut()
            .find(|r| r.id == *request_id && r.status == FriendRequestStatus::Pending)
        else {
            return Ok(None);
        };

        request.status = status;
        request.responded_at = Some(responded_at);
        Ok(Some(request.clone()))
    }
}

/// Expiry is ignored; entries live until deleted.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryCache {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        _expiration: u64,
    ) -> Result<(), error::SystemError> {
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, error::SystemError> {
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        let start = Utc.with_ymd_and_hms(2024, 10, 18, 12, 0, 0).unwrap();
        Self { now: Mutex::new(start) }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn token_config() -> TokenConfig {
    TokenConfig { secret: TEST_SECRET.to_string(), access_ttl: 900, refresh_ttl: 3600 }
}

pub fn memory_user_service() -> (UserService, Arc<MemoryDb>, Arc<MemoryCache>) {
    let db = Arc::new(MemoryDb::default());
    let cache = Arc::new(MemoryCache::default());
    let svc = UserService::with_dependencies(db.clone(), cache.clone(), token_config());
    (svc, db, cache)
}

pub fn memory_friend_service() -> (FriendService, Arc<MemoryDb>, Arc<ManualClock>) {
    let db = Arc::new(MemoryDb::default());
    let clock = Arc::new(ManualClock::default());
    let svc = FriendService::with_dependencies(
        db.clone(),
        db.clone(),
        SlidingWindow::default(),
        clock.clone(),
    );
    (svc, db, clock)
}

/// Both services over one shared store.
pub struct TestContext {
    pub db: Arc<MemoryDb>,
    pub cache: Arc<MemoryCache>,
    pub clock: Arc<ManualClock>,
    pub user_service: UserService,
    pub friend_service: FriendService,
}

impl TestContext {
    pub fn new() -> Self {
        let db = Arc::new(MemoryDb::default());
        let cache = Arc::new(MemoryCache::default());
        let clock = Arc::new(ManualClock::default());

        let user_service = UserService::with_dependencies(db.clone(), cache.clone(), token_config());
        let friend_service = FriendService::with_dependencies(
            db.clone(),
            db.clone(),
            SlidingWindow::default(),
            clock.clone(),
        );

        Self { db, cache, clock, user_service, friend_service }
    }
}

pub fn test_app(
    ctx: &TestContext,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ctx.user_service.clone()))
        .app_data(web::Data::new(ctx.friend_service.clone()))
        .app_data(web::Data::new(token_config()))
        .configure(modules::configure)
}

/// `Authorization` header carrying a fresh access token for `user_id`.
pub fn bearer(user_id: &Uuid) -> (&'static str, String) {
    let token = Claims::new(user_id, TokenType::Access, 900)
        .encode(TEST_SECRET.as_bytes())
        .unwrap();
    ("Authorization", format!("Bearer {token}"))
}

/// Calls the service and returns status plus JSON body; middleware errors become responses.
pub async fn send<S, R, B>(app: &S, req: R) -> (StatusCode, serde_json::Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, bytes) = match test::try_call_service(app, req).await {
        Ok(res) => {
            let status = res.status();
            (status, test::read_body(res).await)
        }
        Err(err) => {
            let res = err.error_response();
            let status = res.status();
            let bytes = actix_web::body::to_bytes(res.into_body()).await.unwrap_or_default();
            (status, bytes)
        }
    };

    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}
