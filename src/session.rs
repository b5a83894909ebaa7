//! Wallet session and the single durable key behind it.
//!
//! Only the last-used wallet address survives restarts. Balances are cached
//! in memory until the next successful wallet load.

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[cfg(feature = "native")]
use rusqlite::{params, Connection, OptionalExtension};

use crate::constants::session::WALLET_ADDRESS_KEY;

/// String key/value persistence
pub trait KeyStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-lifetime store, used by tests and when no database is available
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<BTreeMap<String, String>>,
}

impl KeyStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.lock().map_err(|_| anyhow::anyhow!("store poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.lock().map_err(|_| anyhow::anyhow!("store poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed store with one `kv` table
#[cfg(feature = "native")]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

#[cfg(feature = "native")]
impl SqliteStore {
    pub fn open(path: &std::path::Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("session db poisoned"))
    }
}

#[cfg(feature = "native")]
impl KeyStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let v = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(v)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Wallet identity plus the last balances fetched for it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletSession {
    pub address: Option<String>,
    pub cached_balances: BTreeMap<String, u64>,
}

impl WalletSession {
    /// Restore the remembered address. A read failure starts an empty session.
    pub fn restore(store: &dyn KeyStore) -> Self {
        let address = match store.get(WALLET_ADDRESS_KEY) {
            Ok(a) => a.filter(|a| !a.is_empty()),
            Err(e) => {
                log::warn!("could not read saved wallet address: {e:#}");
                None
            }
        };
        if let Some(a) = &address {
            log::info!("👛 restored wallet address {a}");
        }
        Self {
            address,
            cached_balances: BTreeMap::new(),
        }
    }

    /// Adopt a new address and persist it. The address is used as entered;
    /// the node is the one to reject it. Cached balances of the previous
    /// address are dropped.
    pub fn load_address(&mut self, store: &dyn KeyStore, address: &str) -> Result<()> {
        let address = address.trim();
        if self.address.as_deref() != Some(address) {
            self.cached_balances.clear();
        }
        self.address = Some(address.to_string());
        store.set(WALLET_ADDRESS_KEY, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_survives_restore() {
        let store = MemoryStore::default();
        assert_eq!(WalletSession::restore(&store).address, None);

        let mut s = WalletSession::default();
        s.load_address(&store, "  alice ").unwrap();
        assert_eq!(s.address.as_deref(), Some("alice"));

        assert_eq!(WalletSession::restore(&store).address.as_deref(), Some("alice"));
    }

    #[test]
    fn switching_address_drops_cached_balances() {
        let store = MemoryStore::default();
        let mut s = WalletSession::default();
        s.load_address(&store, "alice").unwrap();
        s.cached_balances.insert("COMPASS".into(), 5);

        s.load_address(&store, "alice").unwrap();
        assert_eq!(s.cached_balances.len(), 1);

        s.load_address(&store, "bob").unwrap();
        assert!(s.cached_balances.is_empty());
    }

    #[cfg(feature = "native")]
    #[test]
    fn sqlite_store_upserts() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    }
}
