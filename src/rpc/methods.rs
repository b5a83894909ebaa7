//! Typed wrappers over the node's JSON-RPC methods.
//!
//! Method names and parameter keys are the wire contract. Results that do
//! not match the expected shape surface as [`ClientError::Transport`].

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::{ClientError, RpcClient};
use crate::types::{
    flatten_account_balances, Block, ModelNft, ModelProgress, NodeInfo, PortfolioSummary,
    Signal, Trade, TradingStats,
};

fn decode<T: DeserializeOwned>(method: &str, v: Value) -> Result<T, ClientError> {
    serde_json::from_value(v).map_err(|e| ClientError::malformed(format!("{method}: {e}")))
}

fn field_u64(method: &str, v: &Value, key: &str) -> Result<u64, ClientError> {
    v.get(key)
        .and_then(|x| x.as_u64())
        .ok_or_else(|| ClientError::malformed(format!("{method}: missing `{key}`")))
}

fn blocks_from(method: &str, v: &Value) -> Result<Vec<Block>, ClientError> {
    let arr = v
        .as_array()
        .ok_or_else(|| ClientError::malformed(format!("{method}: expected a list")))?;
    Ok(arr.iter().filter_map(Block::from_value).collect())
}

/// Model id the node assigns to the signal model of a ticker
pub fn model_id_for(ticker: &str) -> String {
    let base = ticker
        .to_ascii_lowercase()
        .trim_end_matches("usdt")
        .to_string();
    format!("signal_{base}_v2")
}

impl RpcClient {
    pub async fn get_chain_height(&self) -> Result<u64, ClientError> {
        let v = self.call("getChainHeight", Value::Null).await?;
        // Older nodes answer with a bare number
        match v.as_u64() {
            Some(h) => Ok(h),
            None => field_u64("getChainHeight", &v, "height"),
        }
    }

    /// Newest first, at most `count` blocks
    pub async fn get_latest_blocks(&self, count: u32) -> Result<Vec<Block>, ClientError> {
        let v = self.call("getLatestBlocks", json!({ "count": count })).await?;
        blocks_from("getLatestBlocks", &v)
    }

    pub async fn get_block(&self, height: u64) -> Result<Block, ClientError> {
        let v = self.call("getBlock", json!({ "height": height })).await?;
        Block::from_value(&v).ok_or_else(|| ClientError::malformed("getBlock: no block index"))
    }

    /// Raw balance of `asset` held by `wallet_id`
    pub async fn get_balance(&self, wallet_id: &str, asset: &str) -> Result<u64, ClientError> {
        let v = self
            .call("getBalance", json!({ "wallet_id": wallet_id, "asset": asset }))
            .await?;
        match v.as_u64() {
            Some(b) => Ok(b),
            None => field_u64("getBalance", &v, "balance"),
        }
    }

    pub async fn get_node_info(&self) -> Result<NodeInfo, ClientError> {
        let v = self.call("getNodeInfo", Value::Null).await?;
        decode("getNodeInfo", v)
    }

    pub async fn get_peers(&self) -> Result<Vec<String>, ClientError> {
        let v = self.call("getPeers", Value::Null).await?;
        let list = v.get("peers").cloned().unwrap_or(v);
        decode("getPeers", list)
    }

    /// Ticker → latest oracle price
    pub async fn get_oracle_prices(&self) -> Result<BTreeMap<String, f64>, ClientError> {
        let v = self.call("getOraclePrices", Value::Null).await?;
        decode("getOraclePrices", v)
    }

    pub async fn get_all_nfts(&self) -> Result<Vec<ModelNft>, ClientError> {
        let v = self.call("getAllNFTs", Value::Null).await?;
        decode("getAllNFTs", v)
    }

    pub async fn get_my_models(&self, owner: &str) -> Result<Vec<ModelNft>, ClientError> {
        let v = self.call("getMyModels", json!({ "owner": owner })).await?;
        decode("getMyModels", v)
    }

    pub async fn get_paper_trading_stats(&self) -> Result<TradingStats, ClientError> {
        let v = self.call("getPaperTradingStats", Value::Null).await?;
        decode("getPaperTradingStats", v)
    }

    pub async fn get_paper_trade_history(&self) -> Result<Vec<Trade>, ClientError> {
        let v = self.call("getPaperTradeHistory", Value::Null).await?;
        let arr = v
            .as_array()
            .ok_or_else(|| ClientError::malformed("getPaperTradeHistory: expected a list"))?;
        Ok(arr.iter().filter_map(Trade::from_value).collect())
    }

    pub async fn get_portfolio_summary(&self) -> Result<PortfolioSummary, ClientError> {
        let v = self.call("getPortfolioSummary", Value::Null).await?;
        decode("getPortfolioSummary", v)
    }

    pub async fn get_latest_signal(&self, ticker: &str) -> Result<Signal, ClientError> {
        let v = self
            .call("getLatestSignal", json!({ "ticker": ticker }))
            .await?;
        let mut s: Signal = decode("getLatestSignal", v)?;
        if s.ticker.is_empty() {
            s.ticker = ticker.to_string();
        }
        Ok(s)
    }

    /// Asset → raw amount, flattened across ledger layers
    pub async fn get_account_balances(
        &self,
        address: &str,
    ) -> Result<BTreeMap<String, u64>, ClientError> {
        let v = self
            .call("getAccountBalances", json!({ "address": address }))
            .await?;
        if !v.is_object() {
            return Err(ClientError::malformed("getAccountBalances: expected an object"));
        }
        Ok(flatten_account_balances(&v))
    }

    /// Submit a transfer of `amount` raw units; returns the transaction hash
    pub async fn submit_transaction(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        asset: &str,
    ) -> Result<String, ClientError> {
        let v = self
            .call(
                "submitTransaction",
                json!({ "from": from, "to": to, "amount": amount, "asset": asset }),
            )
            .await?;
        Ok(v.get("tx_hash")
            .and_then(|h| h.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| summary_of(&v)))
    }

    /// Kick off training; returns the node's status message
    pub async fn train_model(&self, ticker: &str) -> Result<String, ClientError> {
        let v = self.call("trainModel", json!({ "ticker": ticker })).await?;
        Ok(summary_of(&v))
    }

    pub async fn mint_model_nft(
        &self,
        ticker: &str,
        model_id: &str,
        owner: &str,
    ) -> Result<String, ClientError> {
        let v = self
            .call(
                "mintModelNFT",
                json!({ "ticker": ticker, "model_id": model_id, "owner": owner }),
            )
            .await?;
        Ok(v.get("token_id")
            .and_then(|t| t.as_str())
            .map(|t| format!("minted {t}"))
            .unwrap_or_else(|| summary_of(&v)))
    }

    pub async fn get_model_epoch_stats(
        &self,
        ticker: &str,
        model_id: &str,
        owner: &str,
    ) -> Result<ModelProgress, ClientError> {
        let v = self
            .call(
                "getModelEpochStats",
                json!({ "ticker": ticker, "model_id": model_id, "owner": owner }),
            )
            .await?;
        let mut p = ModelProgress::from_value(v)
            .map_err(|e| ClientError::malformed(format!("getModelEpochStats: {e}")))?;
        if p.ticker.is_empty() {
            p.ticker = ticker.to_string();
        }
        if p.model_id.is_empty() {
            p.model_id = model_id.to_string();
        }
        Ok(p)
    }
}

/// Human-readable one-liner for action results
fn summary_of(v: &Value) -> String {
    for key in ["message", "status"] {
        if let Some(s) = v.get(key).and_then(|m| m.as_str()) {
            return s.to_string();
        }
    }
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_strips_quote_suffix() {
        assert_eq!(model_id_for("BTC"), "signal_btc_v2");
        assert_eq!(model_id_for("ETHUSDT"), "signal_eth_v2");
    }

    #[test]
    fn summary_prefers_message() {
        let v = json!({"status": "training_started", "message": "Training started for BTC"});
        assert_eq!(summary_of(&v), "Training started for BTC");
        assert_eq!(summary_of(&json!({"status": "ok"})), "ok");
        assert_eq!(summary_of(&json!("done")), "done");
    }
}
