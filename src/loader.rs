//! Per-view data loaders.
//!
//! Every view names a fixed set of RPC calls. A load issues the whole set at
//! once and waits for all of them; each call owns its failure, so a failed
//! fetch leaves a [`Loadable::Failed`] slot next to its successful siblings.
//! Results go back to the app as one [`AppEvent::ViewLoaded`].

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::constants::app::MAX_DISPLAYED_BLOCKS;
use crate::constants::assets::PRIMARY_ASSET;
use crate::rpc::methods::model_id_for;
use crate::rpc::{ClientError, RpcClient};
use crate::types::{
    AppEvent, Block, ModelNft, ModelProgress, NodeInfo, PortfolioSummary, Signal, Trade,
    TradingStats,
};
use crate::views::View;

/// One fetch slot of a view
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn from_result(method: &str, r: Result<T, ClientError>) -> Self {
        match r {
            Ok(v) => Loadable::Ready(v),
            Err(e) => {
                log::warn!("⚠️ {method} failed: {e}");
                Loadable::Failed(e.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Loadable::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub height: Loadable<u64>,
    pub node_info: Loadable<NodeInfo>,
    pub peers: Loadable<Vec<String>>,
    pub blocks: Loadable<Vec<Block>>,
    pub prices: Loadable<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalletData {
    pub address: String,
    /// Raw primary-asset balance from `getBalance`
    pub primary: Loadable<u64>,
    /// Asset → raw amount across layers
    pub balances: Loadable<BTreeMap<String, u64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerData {
    pub blocks: Loadable<Vec<Block>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradingData {
    pub stats: Loadable<TradingStats>,
    pub history: Loadable<Vec<Trade>>,
    pub portfolio: Loadable<PortfolioSummary>,
    pub signals: Vec<(String, Loadable<Signal>)>,
}

/// Owner-scoped part of the models view; absent without a wallet
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedModels {
    pub owner: String,
    pub my_models: Loadable<Vec<ModelNft>>,
    pub progress: Vec<(String, Loadable<ModelProgress>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelsData {
    pub all_nfts: Loadable<Vec<ModelNft>>,
    pub owned: Option<OwnedModels>,
}

/// Result of one view load
#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Dashboard(DashboardData),
    Wallet(WalletData),
    Explorer(ExplorerData),
    Trading(TradingData),
    Models(ModelsData),
}

/// Some, but not all, fetches of one view load failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{view}: {} of {total} fetches failed ({})", .failed.len(), .failed.join(", "))]
pub struct PartialDataError {
    pub view: View,
    pub failed: Vec<String>,
    pub total: usize,
}

impl ViewData {
    pub fn view(&self) -> View {
        match self {
            ViewData::Dashboard(_) => View::Dashboard,
            ViewData::Wallet(_) => View::Wallet,
            ViewData::Explorer(_) => View::Explorer,
            ViewData::Trading(_) => View::Trading,
            ViewData::Models(_) => View::Models,
        }
    }

    /// (method, failed) for every slot of this load
    fn slots(&self) -> Vec<(String, bool)> {
        fn slot<T>(name: &str, l: &Loadable<T>) -> (String, bool) {
            (name.to_string(), l.is_failed())
        }
        match self {
            ViewData::Dashboard(d) => vec![
                slot("getChainHeight", &d.height),
                slot("getNodeInfo", &d.node_info),
                slot("getPeers", &d.peers),
                slot("getLatestBlocks", &d.blocks),
                slot("getOraclePrices", &d.prices),
            ],
            ViewData::Wallet(w) => vec![
                slot("getBalance", &w.primary),
                slot("getAccountBalances", &w.balances),
            ],
            ViewData::Explorer(e) => vec![slot("getLatestBlocks", &e.blocks)],
            ViewData::Trading(t) => {
                let mut v = vec![
                    slot("getPaperTradingStats", &t.stats),
                    slot("getPaperTradeHistory", &t.history),
                    slot("getPortfolioSummary", &t.portfolio),
                ];
                for (ticker, s) in &t.signals {
                    v.push(slot(&format!("getLatestSignal({ticker})"), s));
                }
                v
            }
            ViewData::Models(m) => {
                let mut v = vec![slot("getAllNFTs", &m.all_nfts)];
                if let Some(o) = &m.owned {
                    v.push(slot("getMyModels", &o.my_models));
                    for (ticker, p) in &o.progress {
                        v.push(slot(&format!("getModelEpochStats({ticker})"), p));
                    }
                }
                v
            }
        }
    }

    pub fn partial_error(&self) -> Option<PartialDataError> {
        let slots = self.slots();
        let failed: Vec<String> = slots
            .iter()
            .filter(|(_, f)| *f)
            .map(|(n, _)| n.clone())
            .collect();
        if failed.is_empty() || failed.len() == slots.len() {
            return None;
        }
        Some(PartialDataError {
            view: self.view(),
            failed,
            total: slots.len(),
        })
    }

    /// Every fetch of this load failed
    pub fn all_failed(&self) -> bool {
        self.slots().iter().all(|(_, f)| *f)
    }
}

pub async fn fetch_dashboard(client: &RpcClient) -> DashboardData {
    let (height, node_info, peers, blocks, prices) = futures::join!(
        client.get_chain_height(),
        client.get_node_info(),
        client.get_peers(),
        client.get_latest_blocks(MAX_DISPLAYED_BLOCKS),
        client.get_oracle_prices(),
    );
    DashboardData {
        height: Loadable::from_result("getChainHeight", height),
        node_info: Loadable::from_result("getNodeInfo", node_info),
        peers: Loadable::from_result("getPeers", peers),
        blocks: Loadable::from_result("getLatestBlocks", blocks),
        prices: Loadable::from_result("getOraclePrices", prices),
    }
}

pub async fn fetch_wallet(client: &RpcClient, address: &str) -> WalletData {
    let (primary, balances) = futures::join!(
        client.get_balance(address, PRIMARY_ASSET),
        client.get_account_balances(address),
    );
    WalletData {
        address: address.to_string(),
        primary: Loadable::from_result("getBalance", primary),
        balances: Loadable::from_result("getAccountBalances", balances),
    }
}

pub async fn fetch_explorer(client: &RpcClient) -> ExplorerData {
    let blocks = client.get_latest_blocks(MAX_DISPLAYED_BLOCKS).await;
    ExplorerData {
        blocks: Loadable::from_result("getLatestBlocks", blocks),
    }
}

pub async fn fetch_trading(client: &RpcClient, tickers: &[String]) -> TradingData {
    let signals = join_all(tickers.iter().map(|t| async move {
        let r = client.get_latest_signal(t).await;
        (t.clone(), Loadable::from_result("getLatestSignal", r))
    }));
    let (stats, history, portfolio, signals) = futures::join!(
        client.get_paper_trading_stats(),
        client.get_paper_trade_history(),
        client.get_portfolio_summary(),
        signals,
    );
    TradingData {
        stats: Loadable::from_result("getPaperTradingStats", stats),
        history: Loadable::from_result("getPaperTradeHistory", history),
        portfolio: Loadable::from_result("getPortfolioSummary", portfolio),
        signals,
    }
}

pub async fn fetch_models(
    client: &RpcClient,
    owner: Option<&str>,
    tickers: &[String],
) -> ModelsData {
    let Some(owner) = owner else {
        let all = client.get_all_nfts().await;
        return ModelsData {
            all_nfts: Loadable::from_result("getAllNFTs", all),
            owned: None,
        };
    };

    let progress = join_all(tickers.iter().map(|t| async move {
        let model_id = model_id_for(t);
        let r = client.get_model_epoch_stats(t, &model_id, owner).await;
        (t.clone(), Loadable::from_result("getModelEpochStats", r))
    }));
    let (all, mine, progress) = futures::join!(
        client.get_all_nfts(),
        client.get_my_models(owner),
        progress,
    );
    ModelsData {
        all_nfts: Loadable::from_result("getAllNFTs", all),
        owned: Some(OwnedModels {
            owner: owner.to_string(),
            my_models: Loadable::from_result("getMyModels", mine),
            progress,
        }),
    }
}

/// What a spawned load needs to know about the session
#[derive(Debug, Clone, PartialEq)]
pub enum LoadRequest {
    Dashboard,
    Wallet { address: String },
    Explorer,
    Trading,
    Models { owner: Option<String> },
}

/// Spawns view loads onto the runtime and reports back over the event channel
#[derive(Clone)]
pub struct Loader {
    client: Arc<RpcClient>,
    tx: UnboundedSender<AppEvent>,
    tickers: Arc<[String]>,
}

impl Loader {
    pub fn new(client: Arc<RpcClient>, tx: UnboundedSender<AppEvent>, tickers: &[String]) -> Self {
        Self {
            client,
            tx,
            tickers: tickers.into(),
        }
    }

    pub fn client(&self) -> &Arc<RpcClient> {
        &self.client
    }

    pub fn spawn(&self, generation: u64, request: LoadRequest) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let tickers = self.tickers.clone();
        tokio::spawn(async move {
            let data = match request {
                LoadRequest::Dashboard => ViewData::Dashboard(fetch_dashboard(&client).await),
                LoadRequest::Wallet { address } => {
                    ViewData::Wallet(fetch_wallet(&client, &address).await)
                }
                LoadRequest::Explorer => ViewData::Explorer(fetch_explorer(&client).await),
                LoadRequest::Trading => ViewData::Trading(fetch_trading(&client, &tickers).await),
                LoadRequest::Models { owner } => {
                    ViewData::Models(fetch_models(&client, owner.as_deref(), &tickers).await)
                }
            };
            if tx.send(AppEvent::ViewLoaded { generation, data }).is_err() {
                log::debug!("view load finished after shutdown");
            }
        });
    }

    pub fn spawn_block_lookup(&self, generation: u64, height: u64) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.get_block(height).await.map_err(|e| e.to_string());
            if let Err(e) = &result {
                log::warn!("⚠️ getBlock({height}) failed: {e}");
            }
            let _ = tx.send(AppEvent::BlockLookup {
                generation,
                height,
                result,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_only_when_some_slots_fail() {
        let mut d = DashboardData {
            height: Loadable::Ready(42),
            node_info: Loadable::Failed("x".into()),
            peers: Loadable::Failed("y".into()),
            blocks: Loadable::Ready(vec![]),
            prices: Loadable::Ready(BTreeMap::new()),
        };
        let err = ViewData::Dashboard(d.clone()).partial_error().unwrap();
        assert_eq!(err.failed, vec!["getNodeInfo", "getPeers"]);
        assert_eq!(err.total, 5);
        assert_eq!(err.to_string(), "Dashboard: 2 of 5 fetches failed (getNodeInfo, getPeers)");

        d.height = Loadable::Failed("z".into());
        d.blocks = Loadable::Failed("z".into());
        d.prices = Loadable::Failed("z".into());
        let all = ViewData::Dashboard(d);
        assert!(all.partial_error().is_none());
        assert!(all.all_failed());
    }

    #[test]
    fn models_without_owner_has_single_slot() {
        let m = ViewData::Models(ModelsData {
            all_nfts: Loadable::Failed("down".into()),
            owned: None,
        });
        assert!(m.partial_error().is_none());
        assert!(m.all_failed());
    }
}
