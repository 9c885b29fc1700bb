mod mysql;
mod tokio_postgres;

pub use self::in_memory_test::{
    InMemoryTestDriver, InMemoryTestResponseBuilder, RecordedCall, TestResponse,
};
pub use self::mysql::MySqlDriver;
pub use self::tokio_postgres::TokioPostgresDriver;
