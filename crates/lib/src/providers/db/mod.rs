pub mod pool;
pub mod sqlite;
pub mod storage;
