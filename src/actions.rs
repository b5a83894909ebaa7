//! User-triggered calls: transfer, train, mint.
//!
//! Each runs on its own task and reports through [`AppEvent::ActionFinished`];
//! the app turns the outcome into a toast. At most one call per kind is in
//! flight.

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::App;
use crate::constants::assets::PRIMARY_ASSET;
use crate::metrics::mint_blocker;
use crate::rpc::methods::model_id_for;
use crate::rpc::RpcClient;
use crate::types::{ActionKind, ActionOutcome, AppEvent};

#[derive(Clone)]
pub struct Actions {
    client: Arc<RpcClient>,
    tx: UnboundedSender<AppEvent>,
}

impl Actions {
    pub fn new(client: Arc<RpcClient>, tx: UnboundedSender<AppEvent>) -> Self {
        Self { client, tx }
    }

    fn spawn<F>(&self, kind: ActionKind, fut: F)
    where
        F: std::future::Future<Output = Result<String, crate::rpc::ClientError>> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fut.await.map_err(|e| e.to_string());
            if let Err(e) = &result {
                log::warn!("⚠️ {kind:?} failed: {e}");
            }
            let _ = tx.send(AppEvent::ActionFinished(ActionOutcome { kind, result }));
        });
    }

    /// Send `amount` raw units of the primary asset from the session wallet
    pub fn transfer(&self, app: &mut App, to: &str, amount: u64) {
        let Some(from) = app.wallet().address.clone() else {
            app.toast_error("Load a wallet address first".into());
            return;
        };
        if !app.begin_action(ActionKind::Transfer) {
            return;
        }
        log::info!("💸 transfer {amount} {PRIMARY_ASSET} {from} -> {to}");
        let client = self.client.clone();
        let to = to.to_string();
        self.spawn(ActionKind::Transfer, async move {
            client
                .submit_transaction(&from, &to, amount, PRIMARY_ASSET)
                .await
                .map(|hash| format!("Transfer submitted: {hash}"))
        });
    }

    /// Start training the model of the selected ticker
    pub fn train(&self, app: &mut App) {
        let Some(ticker) = app.selected_ticker().map(str::to_string) else {
            return;
        };
        if !app.begin_action(ActionKind::Train) {
            return;
        }
        log::info!("🧠 train {ticker}");
        let client = self.client.clone();
        self.spawn(ActionKind::Train, async move { client.train_model(&ticker).await });
    }

    /// Mint the selected ticker's model, only once it is mintable
    pub fn mint(&self, app: &mut App) {
        let Some(owner) = app.wallet().address.clone() else {
            app.toast_error("Load a wallet address first".into());
            return;
        };
        let Some(ticker) = app.selected_ticker().map(str::to_string) else {
            return;
        };
        let Some(progress) = app.selected_progress().cloned() else {
            app.toast_error(format!("No epoch stats for {ticker} yet"));
            return;
        };
        if progress.nft_minted {
            app.toast_error(format!("{ticker} model already minted"));
            return;
        }
        if let Some(reason) = mint_blocker(&progress) {
            app.toast_error(format!("Cannot mint {ticker}: {reason}"));
            return;
        }
        let model_id = if progress.model_id.is_empty() {
            model_id_for(&ticker)
        } else {
            progress.model_id.clone()
        };
        if !app.begin_action(ActionKind::Mint) {
            return;
        }
        log::info!("🪙 mint {model_id} for {owner}");
        let client = self.client.clone();
        self.spawn(ActionKind::Mint, async move {
            client.mint_model_nft(&ticker, &model_id, &owner).await
        });
    }
}
