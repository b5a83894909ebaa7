//! Derived metrics: pure functions from raw RPC results to display values.
//!
//! Nothing here performs I/O. Ratios are returned raw; clamping for gauges
//! happens in the renderer via [`display_ratio`].

use std::collections::BTreeMap;

use crate::constants::assets::{DEFAULT_MINT_AT_EPOCH, PRIMARY_ASSET, PRIMARY_ASSET_DECIMALS};
use crate::types::ModelProgress;

/// `predictions_in_epoch / predictions_per_epoch`, unclamped.
///
/// Values above 1.0 pass through untouched. A zero denominator yields 0.
pub fn progress_ratio(predictions_in_epoch: u32, predictions_per_epoch: u32) -> f64 {
    if predictions_per_epoch == 0 {
        return 0.0;
    }
    predictions_in_epoch as f64 / predictions_per_epoch as f64
}

/// `total_correct / total_predictions`, or 0 when nothing was predicted yet
pub fn accuracy(total_correct: u64, total_predictions: u64) -> f64 {
    if total_predictions == 0 {
        return 0.0;
    }
    total_correct as f64 / total_predictions as f64
}

/// Both thresholds are inclusive. `mint_at_epoch` falls back to 10.
pub fn is_mintable(
    epochs_completed: u32,
    accuracy: f64,
    mint_at_epoch: Option<u32>,
    min_accuracy_to_mint: f64,
) -> bool {
    epochs_completed >= mint_at_epoch.unwrap_or(DEFAULT_MINT_AT_EPOCH)
        && accuracy >= min_accuracy_to_mint
}

/// Why a model cannot mint yet, or `None` when it can
pub fn mint_blocker(p: &ModelProgress) -> Option<String> {
    let acc = accuracy(p.total_correct, p.total_predictions);
    let need_epochs = p.mint_at_epoch.unwrap_or(DEFAULT_MINT_AT_EPOCH);
    if p.epochs_completed < need_epochs {
        return Some(format!(
            "needs {need_epochs} epochs ({} completed)",
            p.epochs_completed
        ));
    }
    if acc < p.min_accuracy_to_mint {
        return Some(format!(
            "accuracy {:.1}% below {:.1}%",
            acc * 100.0,
            p.min_accuracy_to_mint * 100.0
        ));
    }
    None
}

impl ModelProgress {
    pub fn progress_ratio(&self) -> f64 {
        progress_ratio(self.predictions_in_epoch, self.predictions_per_epoch)
    }

    pub fn accuracy(&self) -> f64 {
        accuracy(self.total_correct, self.total_predictions)
    }

    pub fn is_mintable(&self) -> bool {
        is_mintable(
            self.epochs_completed,
            self.accuracy(),
            self.mint_at_epoch,
            self.min_accuracy_to_mint,
        )
    }
}

/// P&L styling class; zero counts as positive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnlClass {
    Positive,
    Negative,
}

impl PnlClass {
    pub fn of(pnl: f64) -> Self {
        if pnl >= 0.0 {
            PnlClass::Positive
        } else {
            PnlClass::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PnlClass::Positive => "positive",
            PnlClass::Negative => "negative",
        }
    }
}

/// Clamp a raw ratio into `0.0..=1.0` for gauges. Non-finite input maps to 0.
pub fn display_ratio(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}

/// Asset id → decimal places.
///
/// Seeded with the primary asset; the node may advertise more via
/// `getNodeInfo`. Unregistered assets are shown as raw integers.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRegistry {
    decimals: BTreeMap<String, u32>,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        let mut decimals = BTreeMap::new();
        decimals.insert(PRIMARY_ASSET.to_string(), PRIMARY_ASSET_DECIMALS);
        Self { decimals }
    }
}

impl AssetRegistry {
    pub fn decimals(&self, asset: &str) -> Option<u32> {
        self.decimals.get(asset).copied()
    }

    /// Merge node-advertised decimals. Entries above 18 are ignored.
    pub fn merge(&mut self, advertised: &BTreeMap<String, u32>) {
        for (asset, d) in advertised {
            if *d > 18 {
                log::warn!("ignoring {asset} with {d} decimals");
                continue;
            }
            if self.decimals.insert(asset.clone(), *d) != Some(*d) {
                log::debug!("asset registry: {asset} = {d} decimals");
            }
        }
    }

    /// Render a raw balance: scaled and truncated to two decimals for
    /// registered assets, the raw integer otherwise.
    pub fn format_amount(&self, asset: &str, raw: u64) -> String {
        match self.decimals(asset) {
            Some(d) if d > 0 => {
                // merge() caps decimals at 18, so the scale fits in u64
                let scale = 10u64.pow(d);
                let (whole, frac) = (raw / scale, raw % scale);
                let cents = if d >= 2 { frac / 10u64.pow(d - 2) } else { frac * 10 };
                format!("{whole}.{cents:02}")
            }
            _ => raw.to_string(),
        }
    }

    /// Parse a user-entered decimal amount into raw units
    pub fn to_raw(&self, asset: &str, input: &str) -> Result<u64, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("amount is empty".into());
        }
        let d = self.decimals(asset).unwrap_or(0) as usize;
        let (whole, frac) = match input.split_once('.') {
            Some((w, f)) => (w, f),
            None => (input, ""),
        };
        if frac.len() > d {
            return Err(format!("{asset} supports at most {d} decimals"));
        }
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) || (whole.is_empty() && frac.is_empty()) {
            return Err(format!("invalid amount: {input}"));
        }
        let digits = format!("{whole}{frac:0<d$}");
        let raw: u64 = digits
            .trim_start_matches('0')
            .parse()
            .or_else(|e| if digits.chars().all(|c| c == '0') { Ok(0) } else { Err(e) })
            .map_err(|_| format!("amount out of range: {input}"))?;
        if raw == 0 {
            return Err("amount must be positive".into());
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_with_no_predictions_is_zero() {
        assert_eq!(accuracy(0, 0), 0.0);
        assert_eq!(accuracy(3, 4), 0.75);
    }

    #[test]
    fn mintable_boundaries_are_inclusive() {
        assert!(is_mintable(10, 0.55, Some(10), 0.55));
        assert!(!is_mintable(9, 0.90, Some(10), 0.55));
        assert!(!is_mintable(12, 0.54, Some(10), 0.55));
    }

    #[test]
    fn mint_at_epoch_defaults_to_ten() {
        assert!(!is_mintable(9, 1.0, None, 0.5));
        assert!(is_mintable(10, 1.0, None, 0.5));
    }

    #[test]
    fn progress_ratio_is_not_clamped() {
        assert_eq!(progress_ratio(15, 10), 1.5);
        assert_eq!(progress_ratio(5, 0), 0.0);
        assert_eq!(display_ratio(1.5), 1.0);
        assert_eq!(display_ratio(-0.2), 0.0);
        assert_eq!(display_ratio(f64::NAN), 0.0);
    }

    #[test]
    fn primary_asset_scales_by_six_decimals() {
        let reg = AssetRegistry::default();
        assert_eq!(reg.format_amount("COMPASS", 0), "0.00");
        assert_eq!(reg.format_amount("COMPASS", 1_000_000), "1.00");
        assert_eq!(reg.format_amount("COMPASS", 2_500_000), "2.50");
        assert_eq!(reg.format_amount("COMPUTE", 1_000_000), "1000000");
    }

    #[test]
    fn scaled_amounts_truncate_exactly() {
        let mut reg = AssetRegistry::default();
        assert_eq!(reg.format_amount("COMPASS", 1_999_999), "1.99");
        assert_eq!(reg.format_amount("COMPASS", 10_000), "0.01");
        assert_eq!(reg.format_amount("COMPASS", 9_999), "0.00");
        assert_eq!(reg.format_amount("COMPASS", u64::MAX), "18446744073709.55");

        let mut adv = BTreeMap::new();
        adv.insert("TENTHS".to_string(), 1);
        adv.insert("WEI".to_string(), 18);
        reg.merge(&adv);
        assert_eq!(reg.format_amount("TENTHS", 15), "1.50");
        assert_eq!(reg.format_amount("WEI", u64::MAX), "18.44");
    }

    #[test]
    fn registry_merges_node_assets() {
        let mut reg = AssetRegistry::default();
        let mut adv = BTreeMap::new();
        adv.insert("COMPUTE".to_string(), 2);
        adv.insert("BOGUS".to_string(), 40);
        reg.merge(&adv);
        assert_eq!(reg.format_amount("COMPUTE", 150), "1.50");
        assert_eq!(reg.decimals("BOGUS"), None);
    }

    #[test]
    fn pnl_zero_is_positive() {
        assert_eq!(PnlClass::of(0.0), PnlClass::Positive);
        assert_eq!(PnlClass::of(-0.01).as_str(), "negative");
        assert_eq!(PnlClass::of(12.0).as_str(), "positive");
    }

    #[test]
    fn decimal_input_to_raw_units() {
        let reg = AssetRegistry::default();
        assert_eq!(reg.to_raw("COMPASS", "1.5"), Ok(1_500_000));
        assert_eq!(reg.to_raw("COMPASS", "2"), Ok(2_000_000));
        assert_eq!(reg.to_raw("COMPASS", ".000001"), Ok(1));
        assert!(reg.to_raw("COMPASS", "1.0000001").is_err());
        assert!(reg.to_raw("COMPASS", "0").is_err());
        assert!(reg.to_raw("COMPASS", "abc").is_err());
        assert_eq!(reg.to_raw("COMPUTE", "7"), Ok(7));
    }

    #[test]
    fn blocker_names_unmet_requirement() {
        let p = ModelProgress {
            ticker: "BTC".into(),
            model_id: "signal_btc_v2".into(),
            current_epoch: 4,
            epochs_completed: 3,
            predictions_in_epoch: 2,
            predictions_per_epoch: 10,
            total_predictions: 30,
            total_correct: 27,
            mint_at_epoch: None,
            min_accuracy_to_mint: 0.75,
            nft_minted: false,
        };
        assert!(mint_blocker(&p).unwrap().contains("10 epochs"));
        assert!(!p.is_mintable());
    }
}
