use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::constants::app::TOAST_DURATION_SECS;
use crate::constants::assets::PRIMARY_ASSET;
use crate::constants::ui::TITLE_PREFIX;
use crate::loader::{
    DashboardData, ExplorerData, Loadable, ModelsData, PartialDataError, TradingData, ViewData,
    WalletData,
};
use crate::metrics::AssetRegistry;
use crate::session::{KeyStore, WalletSession};
use crate::theme::Theme;
use crate::types::{ActionKind, AppEvent, Block, ModelProgress};
use crate::views::View;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Address,
    Endpoint,
    /// First step of a transfer: recipient
    TransferTo,
    /// Second step: decimal amount of the primary asset
    TransferAmount,
    BlockHeight,
}

/// What completing an input form asks the router to do
#[derive(Clone, Debug, PartialEq)]
pub enum InputOutcome {
    Nothing,
    AddressLoaded,
    Endpoint(String),
    Transfer { to: String, amount: u64 },
    LookupBlock(u64),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// What the wallet view should show
#[derive(Debug, PartialEq)]
pub enum WalletState<'a> {
    /// No address known: ask for one
    Prompt,
    Loading(&'a str),
    Loaded(&'a WalletData),
}

/// Session state root. Only the event loop mutates it.
pub struct App {
    quit: bool,
    active: View,
    title: String,
    fps: u32,
    theme: Theme,
    endpoint: String,

    connected: bool,
    chain_height: Option<u64>,

    wallet: WalletSession,
    store: Box<dyn KeyStore>,
    assets: AssetRegistry,
    tickers: Vec<String>,

    // Latest generation issued per view; older results are dropped
    generations: HashMap<View, u64>,

    dashboard: Option<DashboardData>,
    wallet_data: Option<WalletData>,
    explorer: Option<ExplorerData>,
    trading: Option<TradingData>,
    models: Option<ModelsData>,
    partial: HashMap<View, PartialDataError>,

    block_lookup: Option<(u64, Loadable<Block>)>,
    lookup_generation: u64,

    explorer_sel: usize,
    model_sel: usize,

    in_flight: HashSet<ActionKind>,

    input_mode: InputMode,
    input: String,
    transfer_to: Option<String>,

    toast: Option<(String, ToastKind, Instant)>,
}

impl App {
    pub fn new(
        store: Box<dyn KeyStore>,
        tickers: Vec<String>,
        endpoint: String,
        theme: Theme,
        fps: u32,
    ) -> Self {
        let wallet = WalletSession::restore(store.as_ref());
        Self {
            quit: false,
            active: View::Dashboard,
            title: format!("{TITLE_PREFIX} · {}", View::Dashboard.title()),
            fps,
            theme,
            endpoint,
            connected: false,
            chain_height: None,
            wallet,
            store,
            assets: AssetRegistry::default(),
            tickers,
            generations: HashMap::new(),
            dashboard: None,
            wallet_data: None,
            explorer: None,
            trading: None,
            models: None,
            partial: HashMap::new(),
            block_lookup: None,
            lookup_generation: 0,
            explorer_sel: 0,
            model_sel: 0,
            in_flight: HashSet::new(),
            input_mode: InputMode::Normal,
            input: String::new(),
            transfer_to: None,
            toast: None,
        }
    }

    pub fn quit_flag(&self) -> bool { self.quit }
    pub fn request_quit(&mut self) { self.quit = true; }
    pub fn active(&self) -> View { self.active }
    pub fn title(&self) -> &str { &self.title }
    pub fn fps(&self) -> u32 { self.fps }
    pub fn theme(&self) -> Theme { self.theme }
    pub fn endpoint(&self) -> &str { &self.endpoint }
    pub fn connected(&self) -> bool { self.connected }
    pub fn chain_height(&self) -> Option<u64> { self.chain_height }
    pub fn wallet(&self) -> &WalletSession { &self.wallet }
    pub fn assets(&self) -> &AssetRegistry { &self.assets }
    pub fn tickers(&self) -> &[String] { &self.tickers }
    pub fn dashboard(&self) -> Option<&DashboardData> { self.dashboard.as_ref() }
    pub fn explorer(&self) -> Option<&ExplorerData> { self.explorer.as_ref() }
    pub fn trading(&self) -> Option<&TradingData> { self.trading.as_ref() }
    pub fn models(&self) -> Option<&ModelsData> { self.models.as_ref() }
    pub fn block_lookup(&self) -> Option<&(u64, Loadable<Block>)> { self.block_lookup.as_ref() }
    pub fn explorer_selection(&self) -> usize { self.explorer_sel }
    pub fn model_selection(&self) -> usize { self.model_sel }
    pub fn input_mode(&self) -> InputMode { self.input_mode }
    pub fn input(&self) -> &str { &self.input }
    pub fn partial(&self, view: View) -> Option<&PartialDataError> { self.partial.get(&view) }
    pub fn is_in_flight(&self, kind: ActionKind) -> bool { self.in_flight.contains(&kind) }

    pub fn generation(&self, view: View) -> u64 {
        self.generations.get(&view).copied().unwrap_or(0)
    }

    pub fn set_endpoint(&mut self, url: String) {
        self.endpoint = url;
    }

    /// Make `view` the only active view
    pub fn activate(&mut self, view: View) {
        if self.active != view {
            log::debug!("view {} -> {}", self.active, view);
        }
        self.active = view;
        self.title = format!("{TITLE_PREFIX} · {}", view.title());
    }

    /// Issue a new generation for a load of `view`
    pub fn begin_load(&mut self, view: View) -> u64 {
        let g = self.generations.entry(view).or_insert(0);
        *g += 1;
        *g
    }

    pub fn begin_block_lookup(&mut self, height: u64) -> u64 {
        self.lookup_generation += 1;
        self.block_lookup = Some((height, Loadable::Loading));
        self.lookup_generation
    }

    /// Mark an action as running; false when one of that kind already is
    pub fn begin_action(&mut self, kind: ActionKind) -> bool {
        if !self.in_flight.insert(kind) {
            self.toast_error(format!("{kind} already in progress"));
            return false;
        }
        true
    }

    pub fn wallet_state(&self) -> WalletState<'_> {
        match (&self.wallet.address, &self.wallet_data) {
            (None, _) => WalletState::Prompt,
            (Some(a), Some(d)) if &d.address == a => WalletState::Loaded(d),
            (Some(a), _) => WalletState::Loading(a),
        }
    }

    pub fn selected_ticker(&self) -> Option<&str> {
        self.tickers.get(self.model_sel).map(String::as_str)
    }

    pub fn selected_progress(&self) -> Option<&ModelProgress> {
        let ticker = self.selected_ticker()?;
        let owned = self.models.as_ref()?.owned.as_ref()?;
        owned
            .progress
            .iter()
            .find(|(t, _)| t == ticker)
            .and_then(|(_, p)| p.ready())
    }

    /// Apply one event. Returns a view whose data should be reloaded.
    pub fn on_event(&mut self, ev: AppEvent) -> Option<View> {
        match ev {
            AppEvent::Quit => {
                self.quit = true;
                None
            }
            AppEvent::PollTick => Some(View::Dashboard),
            AppEvent::ViewLoaded { generation, data } => {
                self.apply_view(generation, data);
                None
            }
            AppEvent::BlockLookup {
                generation,
                height,
                result,
            } => {
                if generation < self.lookup_generation {
                    log::debug!("dropping stale block lookup {height}");
                    return None;
                }
                let slot = match result {
                    Ok(b) => Loadable::Ready(b),
                    Err(e) => Loadable::Failed(e),
                };
                self.block_lookup = Some((height, slot));
                None
            }
            AppEvent::ActionFinished(outcome) => {
                self.in_flight.remove(&outcome.kind);
                match outcome.result {
                    Ok(msg) => {
                        log::info!("✅ {}: {msg}", outcome.kind);
                        self.toast_success(msg);
                        match outcome.kind {
                            ActionKind::Transfer => Some(View::Wallet),
                            ActionKind::Mint | ActionKind::Train => Some(View::Models),
                        }
                    }
                    Err(e) => {
                        self.toast_error(format!("{} failed: {e}", outcome.kind));
                        None
                    }
                }
            }
        }
    }

    fn apply_view(&mut self, generation: u64, data: ViewData) {
        let view = data.view();
        let current = self.generation(view);
        if generation < current {
            log::debug!("dropping stale {view} load (gen {generation} < {current})");
            return;
        }

        match data.partial_error() {
            Some(p) => {
                log::warn!("⚠️ {p}");
                self.partial.insert(view, p);
            }
            None => {
                self.partial.remove(&view);
            }
        }

        match data {
            ViewData::Dashboard(d) => {
                // Only the dashboard's height fetch decides connectivity
                match &d.height {
                    Loadable::Ready(h) => {
                        if !self.connected {
                            log::info!("🔌 connected at height {h}");
                        }
                        self.connected = true;
                        self.chain_height = Some(*h);
                    }
                    Loadable::Failed(e) => {
                        if self.connected {
                            log::warn!("🔌 disconnected: {e}");
                        }
                        self.connected = false;
                    }
                    Loadable::Loading => {}
                }
                if let Some(info) = d.node_info.ready() {
                    self.assets.merge(&info.assets);
                }
                self.dashboard = Some(d);
            }
            ViewData::Wallet(w) => {
                if self.wallet.address.as_deref() != Some(w.address.as_str()) {
                    log::debug!("dropping wallet load for previous address {}", w.address);
                    return;
                }
                if let Some(map) = w.balances.ready() {
                    self.wallet.cached_balances = map.clone();
                }
                if let Some(b) = w.primary.ready() {
                    self.wallet.cached_balances.insert(PRIMARY_ASSET.to_string(), *b);
                }
                self.wallet_data = Some(w);
            }
            ViewData::Explorer(e) => {
                let len = e.blocks.ready().map(Vec::len).unwrap_or(0);
                if self.explorer_sel >= len {
                    self.explorer_sel = len.saturating_sub(1);
                }
                self.explorer = Some(e);
            }
            ViewData::Trading(t) => self.trading = Some(t),
            ViewData::Models(m) => self.models = Some(m),
        }
    }

    // ----- selection -----
    pub fn up(&mut self) {
        match self.active {
            View::Explorer => self.explorer_sel = self.explorer_sel.saturating_sub(1),
            View::Models => self.model_sel = self.model_sel.saturating_sub(1),
            _ => {}
        }
    }

    pub fn down(&mut self) {
        match self.active {
            View::Explorer => {
                let len = self
                    .explorer
                    .as_ref()
                    .and_then(|e| e.blocks.ready())
                    .map(Vec::len)
                    .unwrap_or(0);
                if self.explorer_sel + 1 < len {
                    self.explorer_sel += 1;
                }
            }
            View::Models => {
                if self.model_sel + 1 < self.tickers.len() {
                    self.model_sel += 1;
                }
            }
            _ => {}
        }
    }

    // ----- toasts -----
    pub fn toast_success(&mut self, msg: String) {
        self.toast = Some((msg, ToastKind::Success, Instant::now()));
    }

    pub fn toast_error(&mut self, msg: String) {
        log::warn!("{msg}");
        self.toast = Some((msg, ToastKind::Error, Instant::now()));
    }

    /// Current toast, if still within its display window
    pub fn toast(&self) -> Option<(&str, ToastKind)> {
        let ttl = Duration::from_secs(TOAST_DURATION_SECS);
        self.toast.as_ref().and_then(|(msg, kind, at)| {
            if at.elapsed() < ttl {
                Some((msg.as_str(), *kind))
            } else {
                None
            }
        })
    }

    // ----- input forms -----
    pub fn start_input(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input = match mode {
            InputMode::Endpoint => self.endpoint.clone(),
            InputMode::Address => self.wallet.address.clone().unwrap_or_default(),
            _ => String::new(),
        };
        if mode != InputMode::TransferAmount {
            self.transfer_to = None;
        }
    }

    pub fn input_char(&mut self, c: char) {
        if self.input_mode != InputMode::Normal {
            self.input.push(c);
        }
    }

    pub fn input_backspace(&mut self) {
        self.input.pop();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
        self.transfer_to = None;
    }

    pub fn transfer_recipient(&self) -> Option<&str> {
        self.transfer_to.as_deref()
    }

    /// Finish the current form
    pub fn submit_input(&mut self) -> InputOutcome {
        let mode = self.input_mode;
        let text = std::mem::take(&mut self.input).trim().to_string();
        self.input_mode = InputMode::Normal;

        match mode {
            InputMode::Normal => InputOutcome::Nothing,
            InputMode::Address => {
                if text.is_empty() {
                    self.toast_error("Wallet address is empty".into());
                    return InputOutcome::Nothing;
                }
                if let Err(e) = self.wallet.load_address(self.store.as_ref(), &text) {
                    self.toast_error(format!("Could not save wallet address: {e:#}"));
                }
                log::info!("👛 wallet address set to {text}");
                InputOutcome::AddressLoaded
            }
            InputMode::Endpoint => InputOutcome::Endpoint(text),
            InputMode::TransferTo => {
                if text.is_empty() {
                    self.toast_error("Recipient is empty".into());
                    return InputOutcome::Nothing;
                }
                self.transfer_to = Some(text);
                self.input_mode = InputMode::TransferAmount;
                InputOutcome::Nothing
            }
            InputMode::TransferAmount => {
                let Some(to) = self.transfer_to.take() else {
                    return InputOutcome::Nothing;
                };
                match self.assets.to_raw(PRIMARY_ASSET, &text) {
                    Ok(amount) => InputOutcome::Transfer { to, amount },
                    Err(e) => {
                        self.toast_error(e);
                        InputOutcome::Nothing
                    }
                }
            }
            InputMode::BlockHeight => match text.parse::<u64>() {
                Ok(h) => InputOutcome::LookupBlock(h),
                Err(_) => {
                    self.toast_error(format!("Invalid block height: {text}"));
                    InputOutcome::Nothing
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;
    use crate::types::ActionOutcome;
    use std::collections::BTreeMap;

    fn app() -> App {
        App::new(
            Box::new(MemoryStore::default()),
            vec!["BTC".into(), "ETH".into()],
            "http://localhost:9000/".into(),
            Theme::Nord,
            20,
        )
    }

    fn dashboard(height: Loadable<u64>) -> ViewData {
        ViewData::Dashboard(DashboardData {
            height,
            node_info: Loadable::Ready(Default::default()),
            peers: Loadable::Ready(vec![]),
            blocks: Loadable::Ready(vec![]),
            prices: Loadable::Ready(BTreeMap::new()),
        })
    }

    #[test]
    fn activate_sets_title() {
        let mut a = app();
        a.activate(View::Trading);
        assert_eq!(a.active(), View::Trading);
        assert_eq!(a.title(), "Compass · Trading");
    }

    #[test]
    fn older_generation_is_dropped() {
        let mut a = app();
        let g1 = a.begin_load(View::Dashboard);
        let g2 = a.begin_load(View::Dashboard);
        a.on_event(AppEvent::ViewLoaded { generation: g2, data: dashboard(Loadable::Ready(50)) });
        a.on_event(AppEvent::ViewLoaded { generation: g1, data: dashboard(Loadable::Ready(49)) });
        assert_eq!(a.chain_height(), Some(50));
    }

    #[test]
    fn height_failure_disconnects_but_keeps_last_height() {
        let mut a = app();
        let g = a.begin_load(View::Dashboard);
        a.on_event(AppEvent::ViewLoaded { generation: g, data: dashboard(Loadable::Ready(7)) });
        assert!(a.connected());
        let g = a.begin_load(View::Dashboard);
        a.on_event(AppEvent::ViewLoaded { generation: g, data: dashboard(Loadable::Failed("down".into())) });
        assert!(!a.connected());
        assert_eq!(a.chain_height(), Some(7));
    }

    #[test]
    fn transfer_form_takes_two_steps() {
        let mut a = app();
        a.start_input(InputMode::TransferTo);
        for c in "bob".chars() {
            a.input_char(c);
        }
        assert_eq!(a.submit_input(), InputOutcome::Nothing);
        assert_eq!(a.input_mode(), InputMode::TransferAmount);
        assert_eq!(a.transfer_recipient(), Some("bob"));
        for c in "1.25".chars() {
            a.input_char(c);
        }
        assert_eq!(
            a.submit_input(),
            InputOutcome::Transfer { to: "bob".into(), amount: 1_250_000 }
        );
    }

    #[test]
    fn successful_transfer_refreshes_wallet() {
        let mut a = app();
        assert!(a.begin_action(ActionKind::Transfer));
        assert!(!a.begin_action(ActionKind::Transfer));
        let next = a.on_event(AppEvent::ActionFinished(ActionOutcome {
            kind: ActionKind::Transfer,
            result: Ok("Transfer submitted: ab".into()),
        }));
        assert_eq!(next, Some(View::Wallet));
        assert!(!a.is_in_flight(ActionKind::Transfer));
        assert_eq!(a.toast().map(|t| t.1), Some(ToastKind::Success));
    }

    #[test]
    fn failed_action_toasts_without_refresh() {
        let mut a = app();
        let next = a.on_event(AppEvent::ActionFinished(ActionOutcome {
            kind: ActionKind::Mint,
            result: Err("rpc error -32000: not eligible".into()),
        }));
        assert_eq!(next, None);
        let (msg, kind) = a.toast().unwrap();
        assert_eq!(kind, ToastKind::Error);
        assert!(msg.starts_with("Mint failed"));
    }
}
