// ==========================
// crates/auth-lib/tests/auth_flow.rs
// ==========================
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use user_auth::{
    auth::{
        AuthService, CredentialHasher, DefaultAuth, HashAlgorithm, TokenGenerator,
        MAX_TOKEN_ATTEMPTS,
    },
    config::{HasherSettings, Settings, StoreBackend},
    error::{AuthError, StoreError},
    storage::{FlatFileUserStore, MemoryUserStore, UserFilter, UserStore, UserUpdate},
    AppState, User, UserId,
};

fn low_cost_settings() -> Settings {
    Settings {
        hasher: HasherSettings::low_cost(),
        ..Settings::default()
    }
}

fn memory_service() -> (Arc<MemoryUserStore>, DefaultAuth) {
    let store = Arc::new(MemoryUserStore::new());
    let auth = DefaultAuth::from_settings(store.clone(), &low_cost_settings()).unwrap();
    (store, auth)
}

#[tokio::test]
async fn test_register_then_login() {
    let (_store, auth) = memory_service();

    let cases = [
        ("alice@example.com", "correct horse battery staple"),
        ("bob@example.com", ""),
        ("carol@example.com", "pässwörd ✓"),
    ];
    for (email, password) in cases {
        auth.register_user(email, password).await.unwrap();
        assert!(auth.valid_login(email, password).await.unwrap(), "{email}");
    }
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let (_store, auth) = memory_service();
    auth.register_user("alice@example.com", "right").await.unwrap();

    for wrong in ["wrong", "Right", "right ", ""] {
        assert!(!auth.valid_login("alice@example.com", wrong).await.unwrap());
    }
}

#[tokio::test]
async fn test_unknown_email_is_false() {
    let (_store, auth) = memory_service();
    auth.register_user("alice@example.com", "pw").await.unwrap();

    assert!(!auth.valid_login("mallory@example.com", "pw").await.unwrap());
    assert!(!auth.valid_login("mallory@example.com", "").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_registration_keeps_first_password() {
    let (store, auth) = memory_service();

    let first = auth.register_user("alice@example.com", "first").await.unwrap();
    let err = auth
        .register_user("alice@example.com", "second")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AlreadyExists(ref e) if e == "alice@example.com"));

    let stored = store
        .find_user_by(&UserFilter::by_email("alice@example.com"))
        .await
        .unwrap();
    assert_eq!(stored.hashed_password, first.hashed_password);
    assert!(auth.valid_login("alice@example.com", "first").await.unwrap());
    assert!(!auth.valid_login("alice@example.com", "second").await.unwrap());
}

#[tokio::test]
async fn test_create_session_overwrites() {
    let (store, auth) = memory_service();
    let user = auth.register_user("alice@example.com", "pw").await.unwrap();
    assert_eq!(user.session_id, None);

    let t1 = auth.create_session("alice@example.com").await.unwrap();
    let t2 = auth.create_session("alice@example.com").await.unwrap();
    assert!(!t1.is_empty());
    assert_ne!(t1, t2);

    let stored = store.find_user_by(&UserFilter::by_id(user.id)).await.unwrap();
    assert_eq!(stored.session_id.as_deref(), Some(t2.as_str()));

    // The old token no longer resolves
    assert!(auth.get_user_from_session_id(&t1).await.unwrap().is_none());
    assert_eq!(
        auth.get_user_from_session_id(&t2).await.unwrap().unwrap().id,
        user.id
    );
}

#[tokio::test]
async fn test_create_session_unknown_email() {
    let (_store, auth) = memory_service();

    let err = auth.create_session("ghost@example.com").await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound(ref e) if e == "ghost@example.com"));

    assert!(matches!(
        auth.create_session("not an email").await,
        Err(AuthError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_password_is_stored_hashed() {
    let (store, auth) = memory_service();
    auth.register_user("alice@example.com", "pw").await.unwrap();
    auth.register_user("bob@example.com", "pw").await.unwrap();

    let alice = store.find_user_by(&UserFilter::by_id(1)).await.unwrap();
    let bob = store.find_user_by(&UserFilter::by_id(2)).await.unwrap();
    assert_ne!(alice.hashed_password, "pw");
    assert_ne!(alice.hashed_password, bob.hashed_password);
}

/// Memory store that yields after every lookup, so concurrent callers
/// interleave between their existence check and their write
struct YieldingStore(MemoryUserStore);

#[async_trait]
impl UserStore for YieldingStore {
    async fn find_user_by(&self, filter: &UserFilter) -> Result<User, StoreError> {
        let found = self.0.find_user_by(filter).await;
        tokio::task::yield_now().await;
        found
    }

    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        self.0.add_user(email, hashed_password).await
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<(), StoreError> {
        self.0.update_user(id, update).await
    }
}

/// Hands out the same token every time
struct FixedToken(&'static str);

impl TokenGenerator for FixedToken {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

#[tokio::test]
async fn test_concurrent_registration_single_winner() {
    let store = Arc::new(YieldingStore(MemoryUserStore::new()));
    let auth = DefaultAuth::from_settings(store.clone(), &low_cost_settings()).unwrap();

    // Both calls pass the existence check before either inserts
    let (r1, r2) = tokio::join!(
        auth.register_user("race@example.com", "pw-1"),
        auth.register_user("race@example.com", "pw-2"),
    );

    let (winner, loser) = match (r1, r2) {
        (Ok(user), Err(e)) => (user, (e, "pw-2")),
        (Err(e), Ok(user)) => (user, (e, "pw-1")),
        other => panic!("expected exactly one winner, got {other:?}"),
    };
    assert!(matches!(loser.0, AuthError::AlreadyExists(ref e) if e == "race@example.com"));
    assert_eq!(store.0.len(), 1);

    let stored = store
        .find_user_by(&UserFilter::by_email("race@example.com"))
        .await
        .unwrap();
    assert_eq!(stored.hashed_password, winner.hashed_password);
    assert!(!auth.valid_login("race@example.com", loser.1).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_sessions_never_share_a_token() {
    let store = Arc::new(YieldingStore(MemoryUserStore::new()));
    let auth = DefaultAuth::from_settings(store.clone(), &low_cost_settings())
        .unwrap()
        .with_token_generator(Arc::new(FixedToken("dup")));

    let alice = auth.register_user("alice@example.com", "pw").await.unwrap();
    let bob = auth.register_user("bob@example.com", "pw").await.unwrap();

    let (ra, rb) = tokio::join!(
        auth.create_session("alice@example.com"),
        auth.create_session("bob@example.com"),
    );

    let (holder, other) = match (ra, rb) {
        (Ok(token), Err(e)) => {
            assert_eq!(token, "dup");
            assert!(matches!(e, AuthError::TokenCollision(MAX_TOKEN_ATTEMPTS)));
            (alice.id, bob.id)
        }
        (Err(e), Ok(token)) => {
            assert_eq!(token, "dup");
            assert!(matches!(e, AuthError::TokenCollision(MAX_TOKEN_ATTEMPTS)));
            (bob.id, alice.id)
        }
        other => panic!("expected exactly one session, got {other:?}"),
    };

    let resolved = auth.get_user_from_session_id("dup").await.unwrap().unwrap();
    assert_eq!(resolved.id, holder);
    let other = store.find_user_by(&UserFilter::by_id(other)).await.unwrap();
    assert_eq!(other.session_id, None);
}

#[tokio::test]
async fn test_flat_file_flow_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let settings = low_cost_settings();

    let token = {
        let store = Arc::new(FlatFileUserStore::new(temp_dir.path()).unwrap());
        let auth = DefaultAuth::from_settings(store, &settings).unwrap();
        auth.register_user("alice@example.com", "pw").await.unwrap();
        auth.create_session("alice@example.com").await.unwrap()
    };

    let store = Arc::new(FlatFileUserStore::new(temp_dir.path()).unwrap());
    let auth = DefaultAuth::from_settings(store, &settings).unwrap();

    assert!(auth.valid_login("alice@example.com", "pw").await.unwrap());
    let user = auth.get_user_from_session_id(&token).await.unwrap().unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert!(matches!(
        auth.register_user("alice@example.com", "pw").await,
        Err(AuthError::AlreadyExists(_))
    ));
}

#[tokio::test]
async fn test_algorithm_change_keeps_existing_logins() {
    let store = Arc::new(MemoryUserStore::new());

    let scrypt_auth = DefaultAuth::from_settings(store.clone(), &low_cost_settings()).unwrap();
    scrypt_auth.register_user("alice@example.com", "pw").await.unwrap();

    let argon_settings = HasherSettings {
        algorithm: HashAlgorithm::Argon2id,
        ..HasherSettings::low_cost()
    };
    let argon_auth = DefaultAuth::new(store.clone())
        .with_hasher(CredentialHasher::new(&argon_settings).unwrap());

    assert!(argon_auth.valid_login("alice@example.com", "pw").await.unwrap());
    let bob = argon_auth.register_user("bob@example.com", "pw").await.unwrap();
    assert!(bob.hashed_password.starts_with("$argon2id$"));
    assert!(scrypt_auth.valid_login("bob@example.com", "pw").await.unwrap());
}

#[tokio::test]
async fn test_app_state_open() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = low_cost_settings();
    settings.store.backend = StoreBackend::File;
    settings.store.data_dir = temp_dir.path().join("data");

    let state = AppState::open(settings).unwrap();
    state.auth.register_user("alice@example.com", "pw").await.unwrap();
    assert!(temp_dir.path().join("data").join("users.json").exists());

    let found = state
        .store
        .find_user_by(&UserFilter::by_email("alice@example.com"))
        .await
        .unwrap();
    assert_eq!(found.id, 1);

    let mut settings = low_cost_settings();
    settings.store.backend = StoreBackend::Memory;
    let state = AppState::open(settings).unwrap();
    assert!(!state.auth.valid_login("alice@example.com", "pw").await.unwrap());
}
