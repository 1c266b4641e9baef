//! Distributed lock primitive (§4.5): `SET NX PX` acquisition, Lua `EVAL`
//! CAS for refresh/release. Tokens are 128-bit random values, hex-encoded,
//! unique per process instance.

use crate::error::Result;
use rand::RngCore;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

/// Refreshes a lock's TTL only if the caller's token still owns it. Returns
/// 1 on success, 0 if the lock is held by someone else or expired.
const REFRESH_SCRIPT: &str = r#"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('pexpire', KEYS[1], ARGV[2])
else
    return 0
end
"#;

/// Deletes a lock only if the caller's token still owns it.
const RELEASE_SCRIPT: &str = r#"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
"#;

/// A random 128-bit token, hex-encoded, unique per process instance.
pub fn random_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// `SET key value PX ttl_ms NX`. Returns `true` iff the lock was acquired.
pub async fn try_acquire(
    conn: &mut ConnectionManager,
    key: &str,
    value: &str,
    ttl_ms: usize,
) -> Result<bool> {
    let result: Option<String> = redis::cmd("SET")
        .arg(key)
        .arg(value)
        .arg("PX")
        .arg(ttl_ms)
        .arg("NX")
        .query_async(conn)
        .await?;
    Ok(result.is_some())
}

/// CAS refresh: extends the TTL only if `value` still owns the lock.
pub async fn refresh(conn: &mut ConnectionManager, key: &str, value: &str, ttl_ms: usize) -> Result<bool> {
    let script = Script::new(REFRESH_SCRIPT);
    let result: i32 = script.key(key).arg(value).arg(ttl_ms).invoke_async(conn).await?;
    Ok(result == 1)
}

/// CAS release: deletes the key only if `value` still owns the lock.
pub async fn release(conn: &mut ConnectionManager, key: &str, value: &str) -> Result<bool> {
    let script = Script::new(RELEASE_SCRIPT);
    let result: i32 = script.key(key).arg(value).invoke_async(conn).await?;
    Ok(result == 1)
}

/// Plain, non-CAS read of a key's current value (e.g. to read the
/// orchestrator lock's owning PID for diagnostics).
pub async fn get(conn: &mut ConnectionManager, key: &str) -> Result<Option<String>> {
    Ok(conn.get(key).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_token_is_32_hex_chars() {
        let token = random_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_random_tokens_differ() {
        assert_ne!(random_token(), random_token());
    }
}
