pub mod log;
pub mod user;

pub use log::PostgresLogRepository;
pub use user::PostgresUserRepository;
