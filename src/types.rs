use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::loader::ViewData;

/// Block type as produced by the node.
///
/// The node serialises its block type as an externally tagged enum: either a
/// bare string (`"Work"`) or a single-key object (`{"Transfer": {...}}`).
/// Tags this client does not know land in `Unknown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockKind {
    PoH {
        tick: u64,
    },
    Work,
    Proposal {
        id: u64,
        proposer: String,
    },
    Reward {
        recipient: String,
        amount: u64,
        asset: String,
    },
    Vote {
        proposal_id: u64,
        choice: bool,
    },
    Transfer {
        from: String,
        to: String,
        asset: String,
        amount: u64,
    },
    Mint {
        owner: String,
        asset: String,
        amount: u64,
    },
    Burn {
        redeemer: String,
        asset: String,
        amount: u64,
    },
    Unknown {
        tag: String,
    },
}

impl BlockKind {
    pub fn from_value(v: &Value) -> Self {
        let (tag, body) = match v {
            Value::String(s) => (s.as_str(), &Value::Null),
            Value::Object(map) => match map.iter().next() {
                Some((k, body)) => (k.as_str(), body),
                None => return BlockKind::Unknown { tag: String::new() },
            },
            _ => return BlockKind::Unknown { tag: String::new() },
        };

        let s = |key: &str| str_field(body, key);
        let n = |key: &str| body.get(key).and_then(|x| x.as_u64()).unwrap_or(0);

        match tag {
            "PoH" => BlockKind::PoH { tick: n("tick") },
            "Work" => BlockKind::Work,
            "Proposal" => BlockKind::Proposal {
                id: n("id"),
                proposer: s("proposer"),
            },
            "Reward" => BlockKind::Reward {
                recipient: s("recipient"),
                amount: n("amount"),
                asset: s("asset"),
            },
            "Vote" => BlockKind::Vote {
                proposal_id: n("proposal_id"),
                choice: body.get("choice").and_then(|c| c.as_bool()).unwrap_or(false),
            },
            "Transfer" => BlockKind::Transfer {
                from: s("from"),
                to: s("to"),
                asset: s("asset"),
                amount: n("amount"),
            },
            "Mint" => BlockKind::Mint {
                owner: s("owner"),
                asset: s("compass_asset"),
                amount: n("mint_amount"),
            },
            "Burn" => BlockKind::Burn {
                redeemer: s("redeemer"),
                asset: s("compass_asset"),
                amount: n("burn_amount"),
            },
            other => BlockKind::Unknown {
                tag: other.to_string(),
            },
        }
    }

    /// Short display label
    pub fn label(&self) -> &str {
        match self {
            BlockKind::PoH { .. } => "PoH",
            BlockKind::Work => "Work",
            BlockKind::Proposal { .. } => "Proposal",
            BlockKind::Reward { .. } => "Reward",
            BlockKind::Vote { .. } => "Vote",
            BlockKind::Transfer { .. } => "Transfer",
            BlockKind::Mint { .. } => "Mint",
            BlockKind::Burn { .. } => "Burn",
            BlockKind::Unknown { tag } if !tag.is_empty() => tag,
            BlockKind::Unknown { .. } => "Unknown",
        }
    }

    /// Style class used by the renderer to pick a color
    pub fn style_class(&self) -> BlockClass {
        match self {
            BlockKind::PoH { .. } | BlockKind::Work => BlockClass::Consensus,
            BlockKind::Proposal { .. } | BlockKind::Vote { .. } => BlockClass::Governance,
            BlockKind::Transfer { .. } | BlockKind::Reward { .. } => BlockClass::Value,
            BlockKind::Mint { .. } | BlockKind::Burn { .. } => BlockClass::Supply,
            BlockKind::Unknown { .. } => BlockClass::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockClass {
    Consensus,
    Governance,
    Value,
    Supply,
    Unknown,
}

/// Immutable block snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub hash: String,
    pub prev_hash: String,
    pub kind: BlockKind,
    pub proposer: String,
    pub timestamp: u64,
    pub signature: String,
}

impl Block {
    /// Parse a block as returned by `getBlock` / `getLatestBlocks`.
    ///
    /// Accepts both `{header: {...}, transactions}` and a flat header object.
    pub fn from_value(v: &Value) -> Option<Block> {
        let h = v.get("header").unwrap_or(v);
        let index = h.get("index")?.as_u64()?;
        Some(Block {
            index,
            hash: str_field(h, "hash"),
            prev_hash: str_field(h, "prev_hash"),
            kind: h
                .get("block_type")
                .map(BlockKind::from_value)
                .unwrap_or(BlockKind::Unknown { tag: String::new() }),
            proposer: str_field(h, "proposer"),
            timestamp: h.get("timestamp").and_then(|t| t.as_u64()).unwrap_or(0),
            signature: h
                .get("signature_hex")
                .or_else(|| h.get("signature"))
                .and_then(|s| s.as_str())
                .unwrap_or("")
                .to_string(),
        })
    }

    /// Block time formatted in local time (node timestamps are unix millis)
    pub fn when(&self) -> String {
        format_timestamp_ms(self.timestamp)
    }
}

/// `getNodeInfo` result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub head_hash: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub peer_count: u32,
    /// Optional asset id → decimal places advertised by the node
    #[serde(default)]
    pub assets: BTreeMap<String, u32>,
}

/// `getPaperTradingStats` result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingStats {
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub total_pnl: f64,
    #[serde(default)]
    pub total_trades: u64,
    #[serde(default)]
    pub win_rate: f64,
    #[serde(default)]
    pub winning_trades: u64,
    #[serde(default)]
    pub losing_trades: u64,
    #[serde(default)]
    pub max_drawdown: f64,
}

/// `getPortfolioSummary` result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub total_pnl: f64,
    #[serde(default)]
    pub win_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
    Hold,
    Other,
}

impl TradeSide {
    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "buy" | "long" => TradeSide::Buy,
            "sell" | "short" => TradeSide::Sell,
            "hold" => TradeSide::Hold,
            _ => TradeSide::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
            TradeSide::Hold => "HOLD",
            TradeSide::Other => "?",
        }
    }
}

/// Paper trade snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub ticker: String,
    pub side: TradeSide,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub pnl: f64,
    pub timestamp: u64,
}

impl Trade {
    /// Parse one entry of `getPaperTradeHistory`.
    ///
    /// Open trades carry no pnl yet and are read as zero.
    pub fn from_value(v: &Value) -> Option<Trade> {
        let ticker = v.get("ticker")?.as_str()?.to_string();
        let side = v
            .get("signal")
            .or_else(|| v.get("side"))
            .and_then(|s| s.as_str())
            .map(TradeSide::parse)
            .unwrap_or(TradeSide::Other);
        Some(Trade {
            ticker,
            side,
            entry_price: v.get("entry_price").and_then(|p| p.as_f64()).unwrap_or(0.0),
            exit_price: v.get("exit_price").and_then(|p| p.as_f64()),
            pnl: v.get("pnl").and_then(|p| p.as_f64()).unwrap_or(0.0),
            timestamp: v
                .get("entry_time")
                .or_else(|| v.get("timestamp"))
                .and_then(|t| t.as_u64())
                .unwrap_or(0),
        })
    }
}

/// `getLatestSignal` result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub signal: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Model NFT as listed by `getAllNFTs` / `getMyModels`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelNft {
    #[serde(default)]
    pub token_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default, alias = "current_owner")]
    pub owner: Option<String>,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub win_rate: f64,
    #[serde(default)]
    pub total_predictions: u64,
}

/// Epoch progress of one (ticker, model) pair from `getModelEpochStats`.
///
/// `predictions_in_epoch <= predictions_per_epoch` is expected upstream but
/// not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProgress {
    pub ticker: String,
    pub model_id: String,
    pub current_epoch: u32,
    pub epochs_completed: u32,
    pub predictions_in_epoch: u32,
    pub predictions_per_epoch: u32,
    pub total_predictions: u64,
    pub total_correct: u64,
    pub mint_at_epoch: Option<u32>,
    pub min_accuracy_to_mint: f64,
    pub nft_minted: bool,
}

#[derive(Deserialize)]
struct EpochStatsWire {
    #[serde(default)]
    ticker: String,
    #[serde(default)]
    model_id: String,
    #[serde(default)]
    current_epoch: u32,
    #[serde(default)]
    epochs_completed: u32,
    #[serde(default)]
    predictions_in_epoch: u32,
    #[serde(default)]
    total_predictions: u64,
    #[serde(default)]
    total_correct: u64,
    #[serde(default)]
    nft_minted: bool,
    #[serde(default)]
    config: EpochConfigWire,
}

#[derive(Deserialize, Default)]
struct EpochConfigWire {
    #[serde(default)]
    predictions_per_epoch: u32,
    #[serde(default)]
    mint_at_epoch: Option<u32>,
    #[serde(default)]
    min_accuracy_to_mint: f64,
}

impl ModelProgress {
    pub fn from_value(v: Value) -> Result<Self, serde_json::Error> {
        let w: EpochStatsWire = serde_json::from_value(v)?;
        Ok(ModelProgress {
            ticker: w.ticker,
            model_id: w.model_id,
            current_epoch: w.current_epoch,
            epochs_completed: w.epochs_completed,
            predictions_in_epoch: w.predictions_in_epoch,
            predictions_per_epoch: w.config.predictions_per_epoch,
            total_predictions: w.total_predictions,
            total_correct: w.total_correct,
            mint_at_epoch: w.config.mint_at_epoch,
            min_accuracy_to_mint: w.config.min_accuracy_to_mint,
            nft_minted: w.nft_minted,
        })
    }
}

/// Flatten `getAccountBalances` into asset → raw amount.
///
/// The node groups balances by layer (`layer1`, `layer2`, ...); layer names
/// are dropped. Non-numeric entries are skipped.
pub fn flatten_account_balances(v: &Value) -> BTreeMap<String, u64> {
    let mut out = BTreeMap::new();
    let Some(map) = v.as_object() else {
        return out;
    };
    for (key, val) in map {
        match val {
            Value::Object(layer) => {
                for (asset, amount) in layer {
                    if let Some(a) = amount.as_u64() {
                        out.insert(asset.clone(), a);
                    }
                }
            }
            Value::Number(n) if key != "account" => {
                if let Some(a) = n.as_u64() {
                    out.insert(key.clone(), a);
                }
            }
            _ => {}
        }
    }
    out
}

/// Events applied to [`crate::app::App`] by the main loop
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Results of one view load, tagged with the generation it was issued under
    ViewLoaded { generation: u64, data: ViewData },
    /// Result of an explorer `getBlock` lookup
    BlockLookup { generation: u64, height: u64, result: Result<Block, String> },
    /// Poller tick: refresh the dashboard
    PollTick,
    /// An action-triggered call finished
    ActionFinished(ActionOutcome),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Transfer,
    Train,
    Mint,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ActionKind::Transfer => "Transfer",
            ActionKind::Train => "Training",
            ActionKind::Mint => "Mint",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub kind: ActionKind,
    pub result: Result<String, String>,
}

fn str_field(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(|x| x.as_str())
        .unwrap_or("")
        .to_string()
}

pub(crate) fn format_timestamp_ms(ms: u64) -> String {
    use chrono::{Local, TimeZone};
    if ms == 0 {
        return "-".into();
    }
    match Local.timestamp_millis_opt(ms as i64).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn block_kind_from_tagged_object() {
        let v = json!({"Transfer": {"from": "a", "to": "b", "asset": "COMPASS", "amount": 5, "nonce": 1, "fee": 0}});
        assert_eq!(
            BlockKind::from_value(&v),
            BlockKind::Transfer {
                from: "a".into(),
                to: "b".into(),
                asset: "COMPASS".into(),
                amount: 5
            }
        );
    }

    #[test]
    fn block_kind_unit_variant_string() {
        assert_eq!(BlockKind::from_value(&json!("Work")), BlockKind::Work);
    }

    #[test]
    fn block_kind_unknown_keeps_tag() {
        let k = BlockKind::from_value(&json!({"Bridge": {"x": 1}}));
        assert_eq!(k, BlockKind::Unknown { tag: "Bridge".into() });
        assert_eq!(k.label(), "Bridge");
        assert_eq!(k.style_class(), BlockClass::Unknown);
        assert_eq!(BlockKind::from_value(&json!(42)).label(), "Unknown");
    }

    #[test]
    fn block_parses_nested_header() {
        let v = json!({
            "header": {
                "index": 7, "hash": "h7", "prev_hash": "h6", "proposer": "node-1",
                "signature_hex": "sig", "timestamp": 1_700_000_000_000u64,
                "block_type": {"Reward": {"recipient": "r", "amount": 10, "asset": "COMPASS", "reason": "x"}}
            },
            "transactions": []
        });
        let b = Block::from_value(&v).unwrap();
        assert_eq!(b.index, 7);
        assert_eq!(b.prev_hash, "h6");
        assert_eq!(b.signature, "sig");
        assert_eq!(b.kind.label(), "Reward");
    }

    #[test]
    fn block_without_index_is_rejected() {
        assert!(Block::from_value(&json!({"header": {"hash": "x"}})).is_none());
    }

    #[test]
    fn trade_open_position_reads_zero_pnl() {
        let v = json!({"ticker": "BTCUSDT", "signal": "Buy", "entry_price": 100.0,
                       "entry_time": 5, "exit_price": null, "pnl": null});
        let t = Trade::from_value(&v).unwrap();
        assert_eq!(t.side, TradeSide::Buy);
        assert_eq!(t.exit_price, None);
        assert_eq!(t.pnl, 0.0);
        assert_eq!(t.timestamp, 5);
    }

    #[test]
    fn epoch_stats_flatten_config() {
        let v = json!({
            "model_id": "signal_btc_v2", "ticker": "BTCUSDT", "current_epoch": 4,
            "predictions_in_epoch": 3, "total_predictions": 33, "total_correct": 20,
            "epochs_completed": 3, "nft_minted": false,
            "config": {"predictions_per_epoch": 10, "mint_at_epoch": null, "min_accuracy_to_mint": 0.75}
        });
        let p = ModelProgress::from_value(v).unwrap();
        assert_eq!(p.predictions_per_epoch, 10);
        assert_eq!(p.mint_at_epoch, None);
        assert_eq!(p.epochs_completed, 3);
    }

    #[test]
    fn account_balances_flatten_layers() {
        let v = json!({"account": "alice", "layer1": {"COMPASS": 2_000_000}, "layer2": {}, "layer3": {"COMPUTE": 40}});
        let m = flatten_account_balances(&v);
        assert_eq!(m.get("COMPASS"), Some(&2_000_000));
        assert_eq!(m.get("COMPUTE"), Some(&40));
        assert_eq!(m.len(), 2);
    }
}
