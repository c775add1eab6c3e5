//! # Bounded Connection Pool
//!
//! Hands out `turso` connections to at most `max_connections` callers at a time.
//! A checked-out connection is wrapped in a [`PooledConnection`] guard that puts
//! it back on the idle stack when dropped, so every exit path of a caller
//! (success, `?` early return, panic unwind) releases it.

use crate::{
    constants::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS},
    errors::BotError,
};
use std::{
    fmt,
    ops::Deref,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};
use turso::{Connection, Database};

/// Sizing and waiting behavior of a [`ConnectionPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Connections opened eagerly when the pool is created.
    pub min_connections: usize,
    /// Upper bound on connections checked out at once.
    pub max_connections: usize,
    /// How long `acquire` waits for a free slot before giving up.
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: DEFAULT_MIN_CONNECTIONS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

/// A point-in-time view of the pool's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub max_size: usize,
    /// Live connections, idle plus checked out.
    pub size: usize,
    pub idle: usize,
    pub in_use: usize,
}

struct PoolInner {
    db: Database,
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    in_use: AtomicUsize,
    config: PoolConfig,
}

impl PoolInner {
    // A poisoned lock still guards valid connections.
    fn lock_idle(&self) -> MutexGuard<'_, Vec<Connection>> {
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A bounded pool of connections to one database.
///
/// Cloning the pool is cheap and shares the same connections.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Creates a pool over `db`, opening `min_connections` up front.
    ///
    /// `max_connections` is raised to 1 if configured as 0, and
    /// `min_connections` is capped at `max_connections`.
    pub fn new(db: Database, config: PoolConfig) -> Result<Self, BotError> {
        let max_connections = config.max_connections.max(1);
        let config = PoolConfig {
            min_connections: config.min_connections.min(max_connections),
            max_connections,
            ..config
        };

        let mut idle = Vec::with_capacity(max_connections);
        for _ in 0..config.min_connections {
            idle.push(open_connection(&db)?);
        }
        debug!(
            min = config.min_connections,
            max = config.max_connections,
            "Connection pool initialized"
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                db,
                idle: Mutex::new(idle),
                permits: Arc::new(Semaphore::new(max_connections)),
                in_use: AtomicUsize::new(0),
                config,
            }),
        })
    }

    /// Checks out a connection, waiting up to `acquire_timeout` for a free slot.
    pub async fn acquire(&self) -> Result<PooledConnection, BotError> {
        let timeout = self.inner.config.acquire_timeout;
        let permit =
            match tokio::time::timeout(timeout, self.inner.permits.clone().acquire_owned()).await
            {
                Ok(Ok(permit)) => permit,
                Ok(Err(_)) => {
                    return Err(BotError::ConnectionUnavailable(
                        "connection pool is closed".to_string(),
                    ))
                }
                Err(_) => {
                    warn!(
                        max = self.inner.config.max_connections,
                        "Timed out waiting for a database connection"
                    );
                    return Err(BotError::ConnectionUnavailable(format!(
                        "all {} connections busy for {timeout:?}",
                        self.inner.config.max_connections
                    )));
                }
            };

        let reused = self.inner.lock_idle().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => open_connection(&self.inner.db)?,
        };

        self.inner.in_use.fetch_add(1, Ordering::SeqCst);
        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    pub fn status(&self) -> PoolStatus {
        let idle = self.inner.lock_idle().len();
        let in_use = self.inner.in_use.load(Ordering::SeqCst);
        PoolStatus {
            max_size: self.inner.config.max_connections,
            size: idle + in_use,
            idle,
            in_use,
        }
    }

    pub fn config(&self) -> PoolConfig {
        self.inner.config
    }

    /// Refuses further acquisitions. Connections already out are still returned normally.
    pub fn close(&self) {
        self.inner.permits.close();
    }

    pub fn database(&self) -> &Database {
        &self.inner.db
    }
}

impl fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("config", &self.inner.config)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

fn open_connection(db: &Database) -> Result<Connection, BotError> {
    db.connect()
        .map_err(|e| BotError::StorageConnection(e.to_string()))
}

/// A connection checked out of a [`ConnectionPool`].
pub struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<PoolInner>,
    // Released after `drop` has pushed the connection back.
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only `drop` takes the connection out.
        self.conn
            .as_ref()
            .unwrap_or_else(|| unreachable!("connection taken before drop"))
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.lock_idle().push(conn);
        }
        self.pool.in_use.fetch_sub(1, Ordering::SeqCst);
    }
}
