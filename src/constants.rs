//! Application constants
//!
//! Centralized constants for timing, display limits and asset defaults.
//! None of these are runtime-configurable.

/// UI layout and display constants
pub mod ui {
    /// Minimum terminal width in columns for usable display
    pub const MIN_WIDTH: u16 = 60;

    /// Minimum terminal height in rows for usable display
    pub const MIN_HEIGHT: u16 = 15;

    /// Placeholder rendered in place of a value whose fetch failed
    pub const ERROR_PLACEHOLDER: &str = "error loading";

    /// Placeholder rendered while a fetch is still in flight
    pub const LOADING_PLACEHOLDER: &str = "loading…";

    /// Prefix for the terminal title; the active view's title is appended
    pub const TITLE_PREFIX: &str = "Compass";
}

/// Application state and behavior constants
pub mod app {
    /// Duration to show toast notifications (seconds)
    pub const TOAST_DURATION_SECS: u64 = 4;

    /// Dashboard poll cadence (milliseconds)
    ///
    /// The poller refreshes the dashboard at this rate regardless of the
    /// active view.
    pub const POLL_INTERVAL_MS: u64 = 5_000;

    /// Maximum number of blocks requested via `getLatestBlocks`
    pub const MAX_DISPLAYED_BLOCKS: u32 = 10;
}

/// Ledger asset defaults
pub mod assets {
    /// Native asset of the ledger; balances arrive in micro-units
    pub const PRIMARY_ASSET: &str = "COMPASS";

    /// Decimal places of the primary asset
    pub const PRIMARY_ASSET_DECIMALS: u32 = 6;

    /// Minimum epochs before a model can mint when the node leaves it unset
    pub const DEFAULT_MINT_AT_EPOCH: u32 = 10;
}

/// Session persistence
pub mod session {
    /// Durable key holding the last-used wallet address
    pub const WALLET_ADDRESS_KEY: &str = "compass.wallet_address";
}
