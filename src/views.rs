//! View set and the router that moves between views.
//!
//! Exactly one view is active. Navigating marks the target active, updates
//! the title and fires that view's loader; there is no history stack.

use std::fmt;
use std::sync::Arc;

use crate::actions::Actions;
use crate::app::{App, InputOutcome};
use crate::loader::{LoadRequest, Loader};
use crate::rpc::RpcClient;
use crate::types::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Wallet,
    Explorer,
    Trading,
    Models,
    Settings,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Dashboard,
        View::Wallet,
        View::Explorer,
        View::Trading,
        View::Models,
        View::Settings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Wallet => "Wallet",
            View::Explorer => "Explorer",
            View::Trading => "Trading",
            View::Models => "Models",
            View::Settings => "Settings",
        }
    }

    pub fn index(&self) -> usize {
        View::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    /// 0-based tab index
    pub fn from_index(i: usize) -> Option<View> {
        View::ALL.get(i).copied()
    }

    pub fn next(&self) -> View {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }

    pub fn prev(&self) -> View {
        View::ALL[(self.index() + View::ALL.len() - 1) % View::ALL.len()]
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Routes navigation, refreshes and completed input to loaders and actions
pub struct Router {
    loader: Loader,
    actions: Actions,
}

impl Router {
    pub fn new(loader: Loader, actions: Actions) -> Self {
        Self { loader, actions }
    }

    pub fn client(&self) -> &Arc<RpcClient> {
        self.loader.client()
    }

    /// First paint: dashboard, plus the wallet when an address was restored
    pub fn start(&self, app: &mut App) {
        if app.wallet().address.is_some() {
            self.load(app, View::Wallet);
        }
        self.navigate(app, View::Dashboard);
    }

    pub fn navigate(&self, app: &mut App, view: View) {
        app.activate(view);
        self.load(app, view);
    }

    /// Fire the loader of `view` without changing the active view
    pub fn load(&self, app: &mut App, view: View) {
        let request = match view {
            View::Dashboard => LoadRequest::Dashboard,
            View::Wallet => match app.wallet().address.clone() {
                Some(address) => LoadRequest::Wallet { address },
                None => {
                    log::debug!("wallet view without address; prompting");
                    return;
                }
            },
            View::Explorer => LoadRequest::Explorer,
            View::Trading => LoadRequest::Trading,
            View::Models => LoadRequest::Models {
                owner: app.wallet().address.clone(),
            },
            View::Settings => return,
        };
        let generation = app.begin_load(view);
        log::debug!("load {view} gen={generation}");
        self.loader.spawn(generation, request);
    }

    pub fn refresh_active(&self, app: &mut App) {
        let view = app.active();
        self.load(app, view);
    }

    /// Apply one event and run whatever reload it calls for
    pub fn dispatch(&self, app: &mut App, ev: AppEvent) {
        if let Some(view) = app.on_event(ev) {
            self.load(app, view);
        }
    }

    /// Complete the open input form
    pub fn submit_input(&self, app: &mut App) {
        match app.submit_input() {
            InputOutcome::Nothing => {}
            InputOutcome::AddressLoaded => {
                self.load(app, View::Wallet);
                if app.active() == View::Models {
                    self.load(app, View::Models);
                }
            }
            InputOutcome::Endpoint(url) => match self.client().set_endpoint(&url) {
                Ok(()) => {
                    app.set_endpoint(url);
                    app.toast_success("RPC endpoint updated".into());
                    self.load(app, View::Dashboard);
                }
                Err(e) => app.toast_error(format!("{e:#}")),
            },
            InputOutcome::Transfer { to, amount } => self.actions.transfer(app, &to, amount),
            InputOutcome::LookupBlock(height) => {
                let generation = app.begin_block_lookup(height);
                self.loader.spawn_block_lookup(generation, height);
            }
        }
    }

    pub fn train_selected(&self, app: &mut App) {
        self.actions.train(app);
    }

    pub fn mint_selected(&self, app: &mut App) {
        self.actions.mint(app);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_order_wraps() {
        assert_eq!(View::Settings.next(), View::Dashboard);
        assert_eq!(View::Dashboard.prev(), View::Settings);
        assert_eq!(View::from_index(4), Some(View::Models));
        assert_eq!(View::from_index(6), None);
        assert_eq!(View::Trading.index(), 3);
    }
}
