use chrono::{DateTime, Utc};
use shared::TokenAccountView;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Identifies one discovery pass. Only the most recently issued token may publish results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PassToken(u64);

impl PassToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct BookState {
    owner: Option<String>,
    /// Ordered for display
    views: Vec<TokenAccountView>,
    /// mint -> positions in `views`
    index: HashMap<String, Vec<usize>>,
    /// Selected mints
    selected: HashSet<String>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl BookState {
    fn reindex(&mut self) {
        self.index.clear();
        for (position, view) in self.views.iter().enumerate() {
            self.index
                .entry(view.mint_address.clone())
                .or_default()
                .push(position);
        }
    }
}

/// Canonical account collection for one wallet session, together with the selection over it.
///
/// Writers: a completed discovery pass, a confirmed close and user toggles.
#[derive(Debug, Default)]
pub struct AccountBook {
    latest_pass: AtomicU64,
    state: RwLock<BookState>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new pass token, superseding every earlier one.
    pub fn begin_pass(&self) -> PassToken {
        let id = self.latest_pass.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Starting discovery pass {}", id);
        PassToken(id)
    }

    pub fn is_current(&self, token: PassToken) -> bool {
        self.latest_pass.load(Ordering::SeqCst) == token.0
    }

    /// Replace the collection with the results of a pass.
    ///
    /// Returns `false`, leaving the book untouched, when a newer pass has been issued since
    /// `token`. Selected mints that no longer appear are dropped; switching owner clears the
    /// selection entirely.
    pub async fn apply_pass(
        &self,
        token: PassToken,
        owner: String,
        views: Vec<TokenAccountView>,
    ) -> bool {
        let mut state = self.state.write().await;

        if !self.is_current(token) {
            info!(
                "Discarding results of superseded pass {} for {}",
                token.0, owner
            );
            return false;
        }

        if state.owner.as_deref() != Some(owner.as_str()) {
            state.selected.clear();
        }

        state.views = views;
        state.reindex();
        let BookState {
            index, selected, ..
        } = &mut *state;
        selected.retain(|mint| index.contains_key(mint));

        info!(
            "Pass {} applied for {}: {} accounts",
            token.0,
            owner,
            state.views.len()
        );
        state.owner = Some(owner);
        state.refreshed_at = Some(Utc::now());
        true
    }

    /// Snapshot of the ordered collection
    pub async fn views(&self) -> Vec<TokenAccountView> {
        self.state.read().await.views.clone()
    }

    /// First view holding `mint`, if any
    pub async fn view(&self, mint: &str) -> Option<TokenAccountView> {
        let state = self.state.read().await;
        let position = *state.index.get(mint)?.first()?;
        state.views.get(position).cloned()
    }

    pub async fn owner(&self) -> Option<String> {
        self.state.read().await.owner.clone()
    }

    pub async fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.refreshed_at
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.views.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.views.is_empty()
    }

    /// Add `mint` to the selection if absent, remove it if present.
    ///
    /// Returns whether the mint is selected afterwards. Mints not in the collection are ignored.
    pub async fn toggle(&self, mint: &str) -> bool {
        let mut state = self.state.write().await;

        if !state.index.contains_key(mint) {
            warn!("Ignoring toggle for unknown mint {}", mint);
            return false;
        }

        if state.selected.remove(mint) {
            debug!("Deselected {}", mint);
            false
        } else {
            debug!("Selected {}", mint);
            state.selected.insert(mint.to_string());
            true
        }
    }

    pub async fn is_selected(&self, mint: &str) -> bool {
        self.state.read().await.selected.contains(mint)
    }

    /// Selected views in display order
    pub async fn selection(&self) -> Vec<TokenAccountView> {
        let state = self.state.read().await;
        state
            .views
            .iter()
            .filter(|view| state.selected.contains(&view.mint_address))
            .cloned()
            .collect()
    }

    pub async fn selected_mints(&self) -> HashSet<String> {
        self.state.read().await.selected.clone()
    }

    /// Empty the selection. Also serves as the explicit cancel.
    pub async fn clear_selection(&self) {
        let mut state = self.state.write().await;
        if !state.selected.is_empty() {
            debug!("Clearing selection of {} mints", state.selected.len());
        }
        state.selected.clear();
    }

    /// Drop every view whose mint was closed, and deselect those mints.
    ///
    /// Supersedes every pass issued so far: their ledger reads may predate the close.
    /// Returns the number of views removed.
    pub async fn remove_closed(&self, closed_mints: &HashSet<String>) -> usize {
        let mut state = self.state.write().await;
        let superseded = self.latest_pass.fetch_add(1, Ordering::SeqCst);
        debug!("Close supersedes discovery passes up to {}", superseded);

        let before = state.views.len();
        state
            .views
            .retain(|view| !closed_mints.contains(&view.mint_address));
        state.selected.retain(|mint| !closed_mints.contains(mint));
        state.reindex();

        let removed = before - state.views.len();
        info!("Removed {} closed accounts from the book", removed);
        removed
    }
}
