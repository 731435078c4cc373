use async_trait::async_trait;
use audit::LogEntry;
use audit::LogRepository;
use audit::LogRepositoryError;
use sqlx::PgPool;

const CREATE_LOGS_TABLE: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS logs (
        id BIGSERIAL PRIMARY KEY,
        level VARCHAR(10) NOT NULL,
        message TEXT NOT NULL,
        file VARCHAR(255),
        function VARCHAR(255),
        user_id BIGINT,
        user_email VARCHAR(255),
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_logs_level ON logs (level)",
    "CREATE INDEX IF NOT EXISTS idx_logs_user_id ON logs (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_logs_user_email ON logs (user_email)",
    "CREATE INDEX IF NOT EXISTS idx_logs_created_at ON logs (created_at)",
];

/// Audit log storage in the `logs` table.
pub struct PostgresLogRepository {
    pool: PgPool,
}

impl PostgresLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogRepository for PostgresLogRepository {
    async fn prepare(&self) -> Result<(), LogRepositoryError> {
        for statement in CREATE_LOGS_TABLE {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| LogRepositoryError::Prepare(e.to_string()))?;
        }
        Ok(())
    }

    async fn append(&self, entry: &LogEntry) -> Result<(), LogRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO logs (level, message, file, function, user_id, user_email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.level.as_str())
        .bind(&entry.message)
        .bind(&entry.file)
        .bind(&entry.function)
        .bind(entry.user_id)
        .bind(entry.user_email.as_deref())
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| LogRepositoryError::Append(e.to_string()))?;

        Ok(())
    }
}
