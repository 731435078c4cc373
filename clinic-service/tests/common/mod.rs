use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use audit::LogConfig;
use audit::LogEntry;
use audit::LogRepository;
use audit::LogRepositoryError;
use audit::LogSink;
use auth::Authenticator;
use auth::PasswordHasher;
use chrono::Utc;
use clinic_service::domain::user::models::NewUser;
use clinic_service::domain::user::models::User;
use clinic_service::domain::user::models::UserId;
use clinic_service::domain::user::ports::UserRepository;
use clinic_service::domain::user::service::UserService;
use clinic_service::inbound::http::router::create_router;
use clinic_service::user::errors::UserError;
use tokio::sync::Mutex;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Account store backed by a vector, enforcing unique emails like the real table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        let created = User {
            id: UserId::new(users.len() as i64 + 1)?,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(created.clone());

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|user| user.email.as_str() == email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|user| user.id == *id).cloned())
    }
}

/// Audit storage that keeps every persisted entry.
#[derive(Default)]
pub struct RecordingLogRepository {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LogRepository for RecordingLogRepository {
    async fn prepare(&self) -> Result<(), LogRepositoryError> {
        Ok(())
    }

    async fn append(&self, entry: &LogEntry) -> Result<(), LogRepositoryError> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }
}

impl RecordingLogRepository {
    /// Wait until an entry matching `predicate` has been persisted.
    pub async fn wait_for<F>(&self, predicate: F) -> LogEntry
    where
        F: Fn(&LogEntry) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(entry) = self.entries.lock().await.iter().find(|e| predicate(e)) {
                    return entry.clone();
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Timed out waiting for log entry")
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
    pub logs: Arc<RecordingLogRepository>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let log_config = LogConfig {
            level: "DEBUG".to_string(),
            ..LogConfig::default()
        };
        let log = LogSink::with_output(&log_config, std::io::sink());
        let logs = Arc::new(RecordingLogRepository::default());
        log.set_persistence(Arc::clone(&logs)).await;

        // Cheapest valid Argon2id cost keeps the suite fast
        let authenticator = Arc::new(
            Authenticator::new(JWT_SECRET).with_password_hasher(
                PasswordHasher::with_cost(8, 1, 1).expect("Failed to build hasher"),
            ),
        );

        authenticator.warm_up().expect("Failed to build decoy digest");

        let user_repository = Arc::new(InMemoryUserRepository::default());
        let user_service = Arc::new(UserService::new(
            user_repository,
            Arc::clone(&authenticator),
            log.clone(),
        ));

        let router = create_router(user_service, Arc::clone(&authenticator), log);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            authenticator,
            logs,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register an account and return its token.
    pub async fn register(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/auth/register")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }
}
