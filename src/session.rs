//! Per-request session context and the server-side session table.
//!
//! The browser only ever holds an opaque random token. The table maps a
//! keyed hash of that token to the signed-in user id and any pending flash
//! notices. A request works on its own [`SessionContext`] copy, which is
//! written back once the response is ready.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use zeroize::Zeroizing;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "strokecare_session";

/// Sessions are swept once the table grows past this size.
const CLEANUP_THRESHOLD: usize = 1000;

/// Hard cap on the table; the least recently seen records go first.
pub const MAX_SESSIONS: usize = 10_000;

/// Lifetime of a session that carries only notices for an anonymous visitor.
pub const ANONYMOUS_TTL: Duration = Duration::from_secs(5 * 60);

// ═══════════════════════════════════════════════════════════
// Flash notices
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// One-shot notice shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Flashes raised while building a response, merged into the session afterwards.
#[derive(Debug, Clone, Default)]
pub struct FlashBag(pub Vec<Flash>);

// ═══════════════════════════════════════════════════════════
// SessionContext: one per request
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct SessionData {
    token: Option<String>,
    user_id: Option<i64>,
    flashes: Vec<Flash>,
    /// Identity changed: the token must be replaced on save.
    rotate: bool,
}

/// Session state for a single request.
///
/// Cloning shares the same state, so middleware and handlers see each
/// other's changes.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<Mutex<SessionData>>,
}

impl SessionContext {
    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_user_id(&self) -> Option<i64> {
        self.lock().user_id
    }

    /// Bind the session to `user_id` and issue a fresh token.
    pub fn set_user_id(&self, user_id: i64) {
        let mut data = self.lock();
        data.user_id = Some(user_id);
        data.rotate = true;
    }

    /// Drop the identity and any pending notices.
    pub fn clear(&self) {
        let mut data = self.lock();
        data.user_id = None;
        data.flashes.clear();
        data.rotate = true;
    }

    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        self.lock().flashes.push(Flash::new(level, message));
    }

    pub fn extend_flashes(&self, flashes: impl IntoIterator<Item = Flash>) {
        self.lock().flashes.extend(flashes);
    }

    /// Remove and return pending notices (they are shown once).
    pub fn take_flashes(&self) -> Vec<Flash> {
        std::mem::take(&mut self.lock().flashes)
    }
}

// ═══════════════════════════════════════════════════════════
// SessionStore: shared across requests
// ═══════════════════════════════════════════════════════════

#[derive(Debug)]
struct SessionRecord {
    user_id: Option<i64>,
    flashes: Vec<Flash>,
    last_seen: Instant,
}

/// In-memory session table keyed by `SHA-256(secret || token)`.
pub struct SessionStore {
    secret: Zeroizing<Vec<u8>>,
    idle_ttl: Duration,
    anonymous_ttl: Duration,
    max_records: usize,
    records: Mutex<HashMap<[u8; 32], SessionRecord>>,
}

impl SessionStore {
    pub fn new(secret: &str, idle_ttl: Duration) -> Self {
        Self {
            secret: Zeroizing::new(secret.as_bytes().to_vec()),
            idle_ttl,
            anonymous_ttl: idle_ttl.min(ANONYMOUS_TTL),
            max_records: MAX_SESSIONS,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Override the anonymous lifetime and the table cap.
    pub fn with_limits(mut self, anonymous_ttl: Duration, max_records: usize) -> Self {
        self.anonymous_ttl = anonymous_ttl.min(self.idle_ttl);
        self.max_records = max_records.max(1);
        self
    }

    fn ttl(&self, record: &SessionRecord) -> Duration {
        if record.user_id.is_some() {
            self.idle_ttl
        } else {
            self.anonymous_ttl
        }
    }

    fn records(&self) -> MutexGuard<'_, HashMap<[u8; 32], SessionRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key(&self, token: &str) -> [u8; 32] {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_slice());
        hasher.update(token.as_bytes());
        hasher.finalize().into()
    }

    /// Resolve a request token into a context. Unknown or idle-expired
    /// tokens yield an empty, anonymous context.
    pub fn load(&self, token: Option<&str>) -> SessionContext {
        let ctx = SessionContext::default();
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return ctx;
        };

        let key = self.key(token);
        let mut records = self.records();
        let expired = match records.get(&key) {
            Some(record) => record.last_seen.elapsed() >= self.ttl(record),
            None => return ctx,
        };
        if expired {
            records.remove(&key);
            tracing::debug!("Idle session expired");
            return ctx;
        }

        if let Some(record) = records.get_mut(&key) {
            record.last_seen = Instant::now();
            let mut data = ctx.lock();
            data.token = Some(token.to_string());
            data.user_id = record.user_id;
            data.flashes = std::mem::take(&mut record.flashes);
        }
        ctx
    }

    /// Persist the context. Returns a token when the client must receive a
    /// new cookie.
    pub fn save(&self, ctx: &SessionContext) -> Option<String> {
        let data = ctx.lock();
        let mut records = self.records();

        if records.len() > CLEANUP_THRESHOLD {
            records.retain(|_, record| record.last_seen.elapsed() < self.ttl(record));
        }

        let existing = data.token.as_deref().map(|t| self.key(t));
        if data.rotate {
            if let Some(key) = existing {
                records.remove(&key);
            }
        }

        if data.user_id.is_none() && data.flashes.is_empty() {
            if let Some(key) = existing {
                records.remove(&key);
            }
            return None;
        }

        let (key, issued) = match (existing, data.rotate) {
            (Some(key), false) => (key, None),
            _ => {
                let token = generate_token();
                (self.key(&token), Some(token))
            }
        };
        if !records.contains_key(&key) {
            evict_oldest(&mut records, self.max_records - 1);
        }
        records.insert(
            key,
            SessionRecord {
                user_id: data.user_id,
                flashes: data.flashes.clone(),
                last_seen: Instant::now(),
            },
        );
        issued
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop the least recently seen records until at most `keep` remain.
fn evict_oldest(records: &mut HashMap<[u8; 32], SessionRecord>, keep: usize) {
    let excess = records.len().saturating_sub(keep);
    if excess == 0 {
        return;
    }
    let mut by_age: Vec<([u8; 32], Instant)> =
        records.iter().map(|(key, record)| (*key, record.last_seen)).collect();
    by_age.sort_by_key(|(_, last_seen)| *last_seen);
    for (key, _) in by_age.into_iter().take(excess) {
        records.remove(&key);
    }
    tracing::debug!(evicted = excess, "Session table at capacity");
}

/// Generate a random session token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
