use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use compass_dash::{
    actions::Actions,
    app::{App, InputMode},
    config,
    loader::Loader,
    poller::Poller,
    rpc::RpcClient,
    session::{KeyStore, MemoryStore, SqliteStore},
    types::AppEvent,
    ui,
    views::{Router, View},
};

fn init_logging() -> Result<()> {
    let path = std::env::var("COMPASS_LOG_FILE").unwrap_or_else(|_| "./compass-dash.log".into());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {path}"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    dotenvy::dotenv().ok();
    init_logging()?;

    let cfg = config::load().context("Failed to load configuration")?;
    cfg.log_summary();

    let store: Box<dyn KeyStore> = match SqliteStore::open(&cfg.session_db) {
        Ok(s) => Box::new(s),
        Err(e) => {
            log::warn!("session db unavailable ({e:#}); wallet address will not persist");
            Box::new(MemoryStore::default())
        }
    };

    let client = Arc::new(
        RpcClient::http(cfg.rpc_url.clone(), cfg.rpc_timeout).context("Failed to build HTTP client")?,
    );

    let (tx, rx) = unbounded_channel::<AppEvent>();
    let router = Router::new(
        Loader::new(client.clone(), tx.clone(), &cfg.tickers),
        Actions::new(client, tx.clone()),
    );
    let mut app = App::new(store, cfg.tickers.clone(), cfg.rpc_url.clone(), cfg.theme, cfg.render_fps);
    let mut poller = Poller::new(tx);

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    router.start(&mut app);
    poller.start();

    let res = run_loop(&mut app, &router, &mut terminal, rx).await;

    // cleanup
    poller.stop();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    if let Err(e) = &res {
        log::error!("event loop failed: {e:#}");
    }
    res
}

async fn run_loop(
    app: &mut App,
    router: &Router,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut rx: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut last_frame = Instant::now();
    let mut shown_title = String::new();
    loop {
        // frame budget (coalesced renders)
        let frame_ms = 1000u32.saturating_div(app.fps()) as u64;
        let budget = Duration::from_millis(frame_ms.max(1));
        let wait = budget.saturating_sub(last_frame.elapsed());

        if event::poll(wait)? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                    handle_key(app, router, k);
                }
            }
        }
        while let Ok(ev) = rx.try_recv() {
            router.dispatch(app, ev);
        }

        if shown_title != app.title() {
            shown_title = app.title().to_string();
            execute!(terminal.backend_mut(), SetTitle(&shown_title))?;
        }
        if last_frame.elapsed() >= budget {
            terminal.draw(|f| ui::draw(f, app))?;
            last_frame = Instant::now();
        }
        if app.quit_flag() {
            break;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, router: &Router, k: KeyEvent) {
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        app.request_quit();
        return;
    }

    // Any open form swallows keys until submitted or cancelled
    if app.input_mode() != InputMode::Normal {
        match k.code {
            KeyCode::Char(c) => app.input_char(c),
            KeyCode::Backspace => app.input_backspace(),
            KeyCode::Enter => router.submit_input(app),
            KeyCode::Esc => app.cancel_input(),
            _ => {}
        }
        return;
    }

    match k.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Tab => {
            let next = app.active().next();
            router.navigate(app, next);
        }
        KeyCode::BackTab => {
            let prev = app.active().prev();
            router.navigate(app, prev);
        }
        KeyCode::Char(c @ '1'..='6') => {
            if let Some(v) = View::from_index((c as u8 - b'1') as usize) {
                router.navigate(app, v);
            }
        }
        KeyCode::Char('r') => router.refresh_active(app),
        KeyCode::Char('a') => app.start_input(InputMode::Address),
        KeyCode::Up => app.up(),
        KeyCode::Down => app.down(),
        KeyCode::Char('t') if app.active() == View::Wallet => app.start_input(InputMode::TransferTo),
        KeyCode::Char('g') if app.active() == View::Explorer => app.start_input(InputMode::BlockHeight),
        KeyCode::Char('t') if app.active() == View::Models => router.train_selected(app),
        KeyCode::Char('m') if app.active() == View::Models => router.mint_selected(app),
        KeyCode::Char('e') if app.active() == View::Settings => app.start_input(InputMode::Endpoint),
        _ => {}
    }
}
