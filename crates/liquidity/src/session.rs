//! Per-session selections.
//!
//! The pipeline never reads this store on its own; callers look up a
//! session's state and turn it into a [`DashboardRequest`] explicitly.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use liquidity_core::{CentralBank, DashboardConfig, Symbol};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::dashboard::DashboardRequest;

/// Opaque session identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selections remembered for one session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Selected central bank.
    pub bank: CentralBank,
    /// Selected index; `None` means the bank's default index.
    pub symbol: Option<Symbol>,
    /// Selected dashboard settings.
    pub config: DashboardConfig,
}

impl SessionState {
    /// Index charted for this session.
    #[must_use]
    pub fn symbol(&self) -> Symbol {
        self.symbol
            .clone()
            .unwrap_or_else(|| self.bank.default_index())
    }

    /// Builds the request these selections describe.
    #[must_use]
    pub fn to_request(&self, as_of: NaiveDate) -> DashboardRequest {
        DashboardRequest::for_bank(self.bank, as_of)
            .with_symbol(self.symbol())
            .with_config(self.config.clone())
    }
}

/// In-memory map from session id to its selections.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionState>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state stored for `id`.
    pub async fn get(&self, id: &SessionId) -> Option<SessionState> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Stores `state` for `id`, returning the previous state.
    pub async fn put(&self, id: SessionId, state: SessionState) -> Option<SessionState> {
        debug!(session = %id, "Storing session state");
        self.sessions.write().await.insert(id, state)
    }

    /// Applies `f` to the state of `id`, starting from the default state.
    ///
    /// Returns the updated state.
    pub async fn update<F>(&self, id: &SessionId, f: F) -> SessionState
    where
        F: FnOnce(&mut SessionState) + Send,
    {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(id.clone()).or_default();
        f(state);
        state.clone()
    }

    /// Removes and returns the state of `id`.
    pub async fn remove(&self, id: &SessionId) -> Option<SessionState> {
        self.sessions.write().await.remove(id)
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns true if no session is stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquidity_core::{CandlePeriod, LiquiditySpec};

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let alice = SessionId::new("a");
        let bob = SessionId::new("b");

        store
            .update(&alice, |s| {
                s.bank = CentralBank::Boj;
                s.config.period = CandlePeriod::Weekly;
            })
            .await;

        assert_eq!(store.get(&alice).await.unwrap().bank, CentralBank::Boj);
        assert!(store.get(&bob).await.is_none());
        assert_eq!(store.len().await, 1);

        assert!(store.remove(&alice).await.is_some());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_returns_previous() {
        let store = SessionStore::new();
        let id = SessionId::new("s");

        assert!(store.put(id.clone(), SessionState::default()).await.is_none());
        let previous = store
            .put(
                id,
                SessionState {
                    bank: CentralBank::Ecb,
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(previous, Some(SessionState::default()));
    }

    #[test]
    fn test_state_to_request() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let state = SessionState {
            bank: CentralBank::Ecb,
            symbol: None,
            config: DashboardConfig::default().with_lookback_years(3),
        };

        let request = state.to_request(as_of);

        assert_eq!(request.symbol, Symbol::new("^STOXX50E"));
        assert_eq!(
            request.liquidity,
            LiquiditySpec::Single(liquidity_core::SeriesId::new("ECBASSETSW"))
        );
        assert_eq!(request.config.lookback_years, 3);
        assert_eq!(request.as_of, as_of);
    }
}
