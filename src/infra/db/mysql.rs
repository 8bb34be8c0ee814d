use diesel::mysql::MysqlConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};
use diesel::RunQueryDsl;
use std::time::Duration;

pub type MySqlPool = Pool<ConnectionManager<MysqlConnection>>;
pub type MySqlPooledConnection = PooledConnection<ConnectionManager<MysqlConnection>>;

/// Initialize MySQL connection pool using r2d2 + diesel
pub fn make_mysql_pool(database_url: &str) -> Result<MySqlPool, PoolError> {
    let manager = ConnectionManager::<MysqlConnection>::new(database_url);

    // one run works one pair at a time, a handful of connections is plenty
    Pool::builder()
        .max_size(4)
        .min_idle(Some(1))
        .connection_timeout(Duration::from_secs(5))
        .idle_timeout(Some(Duration::from_secs(300)))
        .build(manager)
}

/// `SELECT 1` round trip, run before any work starts.
pub fn check_connection(pool: &MySqlPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    diesel::sql_query("SELECT 1").execute(&mut conn)?;
    Ok(())
}
