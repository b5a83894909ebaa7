use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, ToastKind, WalletState};
use crate::constants::assets::PRIMARY_ASSET;
use crate::constants::ui::{ERROR_PLACEHOLDER, LOADING_PLACEHOLDER, MIN_HEIGHT, MIN_WIDTH};
use crate::loader::Loadable;
use crate::metrics::{display_ratio, PnlClass};
use crate::theme::ColorScheme;
use crate::types::{Block as LedgerBlock, ModelProgress};
use crate::views::View;

// ===============================
// Top-level draw
// ===============================
pub fn draw(f: &mut Frame, app: &App) {
    let c = app.theme().colors();
    f.render_widget(Block::default().style(Style::default().bg(c.background).fg(c.text)), f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tabs + rule
            Constraint::Min(0),    // body
            Constraint::Length(2), // footer
        ])
        .split(f.area());

    header(f, chunks[0], app, &c);
    body(f, chunks[1], app, &c);
    footer(f, chunks[2], app, &c);

    if app.input_mode() != InputMode::Normal {
        draw_input_overlay(f, app, &c);
    }
    if app.toast().is_some() {
        draw_toast(f, app, &c);
    }
}

// ===============================
// Header / Footer
// ===============================
fn header(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let mut spans = Vec::new();
    for (i, view) in View::ALL.iter().enumerate() {
        spans.push(Span::raw(if i == 0 { "┌─" } else { "┬─" }));
        let label = format!("{} {}", i + 1, view.title());
        if *view == app.active() {
            spans.push(Span::styled(
                label,
                Style::default().fg(c.focus_border).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(c.text)));
        }
        spans.push(Span::raw("─"));
    }
    spans.push(Span::raw("┐  "));

    let (dot, color, status) = if app.connected() {
        ("●", c.connected, "connected")
    } else {
        ("○", c.disconnected, "disconnected")
    };
    spans.push(Span::styled(format!("{dot} {status}"), Style::default().fg(color)));
    if let Some(h) = app.chain_height() {
        spans.push(Span::styled(format!(" · #{h}"), Style::default().fg(c.text_dim)));
    }

    let p = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::BOTTOM).border_type(BorderType::Plain));
    f.render_widget(p, area);
}

fn footer(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(c.focus_border));
    let mut spans: Vec<Span> = vec![
        key("Tab/1-6"),
        Span::raw(" view │ "),
        key("r"),
        Span::raw(" refresh │ "),
        key("a"),
        Span::raw(" address │ "),
    ];
    match app.active() {
        View::Wallet => {
            spans.push(key("t"));
            spans.push(Span::raw(" transfer │ "));
        }
        View::Explorer => {
            spans.push(key("↑/↓"));
            spans.push(Span::raw(" select │ "));
            spans.push(key("g"));
            spans.push(Span::raw(" go to height │ "));
        }
        View::Models => {
            spans.push(key("↑/↓"));
            spans.push(Span::raw(" ticker │ "));
            spans.push(key("t"));
            spans.push(Span::raw(" train │ "));
            spans.push(key("m"));
            spans.push(Span::raw(" mint │ "));
        }
        View::Settings => {
            spans.push(key("e"));
            spans.push(Span::raw(" edit endpoint │ "));
        }
        View::Dashboard | View::Trading => {}
    }
    spans.push(key("q"));
    spans.push(Span::raw(" quit"));

    if let Some(p) = app.partial(app.active()) {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(p.to_string(), Style::default().fg(c.placeholder_error)));
    }
    spans.push(Span::styled(
        format!(" │ FPS {}", app.fps()),
        Style::default().fg(c.text_dim),
    ));

    let w = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::TOP).border_type(BorderType::Plain));
    f.render_widget(w, area);
}

// ===============================
// Body
// ===============================
fn body(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT.saturating_sub(4) {
        let warning = Paragraph::new(format!(
            "Terminal too small!\n\nMinimum size: {MIN_WIDTH}×{MIN_HEIGHT}\nCurrent size: {}×{}",
            area.width,
            area.height + 4
        ))
        .alignment(Alignment::Center)
        .style(Style::default().fg(c.toast_error).add_modifier(Modifier::BOLD));
        f.render_widget(warning, area);
        return;
    }

    match app.active() {
        View::Dashboard => dashboard(f, area, app, c),
        View::Wallet => wallet(f, area, app, c),
        View::Explorer => explorer(f, area, app, c),
        View::Trading => trading(f, area, app, c),
        View::Models => models(f, area, app, c),
        View::Settings => settings(f, area, app, c),
    }
}

fn pane(title: &str, c: &ColorScheme) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(c.unfocused_border))
}

fn dashboard(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let Some(d) = app.dashboard() else {
        loading(f, area, "Dashboard", c);
        return;
    };
    let rows = Layout::vertical([Constraint::Length(6), Constraint::Min(0)]).split(area);

    let info = d.node_info.ready();
    let stats = vec![
        labeled("Chain height", slot(&d.height, c, |h| h.to_string(), c.accent)),
        labeled("Peers", slot(&d.peers, c, |p| p.len().to_string(), c.text)),
        labeled(
            "Node version",
            slot(&d.node_info, c, |i| display_or_dash(&i.version), c.text),
        ),
        labeled(
            "Head",
            match info.and_then(|i| i.head_hash.as_deref()) {
                Some(h) => Span::styled(truncate_hash(h, 24), Style::default().fg(c.text_dim)),
                None => slot(&d.node_info, c, |_| "-".to_string(), c.text_dim),
            },
        ),
    ];
    f.render_widget(Paragraph::new(stats).block(pane("Node", c)), rows[0]);

    let cols = Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(rows[1]);

    match &d.blocks {
        Loadable::Ready(blocks) => {
            let items: Vec<ListItem> = blocks.iter().map(|b| block_row(b, c)).collect();
            f.render_widget(List::new(items).block(pane("Latest blocks", c)), cols[0]);
        }
        other => placeholder(f, cols[0], "Latest blocks", other, c),
    }

    match &d.prices {
        Loadable::Ready(prices) => {
            let lines: Vec<Line> = if prices.is_empty() {
                vec![Line::styled("no prices", Style::default().fg(c.text_dim))]
            } else {
                prices
                    .iter()
                    .map(|(t, p)| {
                        Line::from(vec![
                            Span::styled(format!("{t:<10}"), Style::default().fg(c.text_dim)),
                            Span::styled(format!("{p:>12.2}"), Style::default().fg(c.text)),
                        ])
                    })
                    .collect()
            };
            f.render_widget(Paragraph::new(lines).block(pane("Oracle prices", c)), cols[1]);
        }
        other => placeholder(f, cols[1], "Oracle prices", other, c),
    }
}

fn wallet(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    match app.wallet_state() {
        WalletState::Prompt => {
            let p = Paragraph::new(vec![
                Line::raw(""),
                Line::styled("No wallet loaded", Style::default().fg(c.text).add_modifier(Modifier::BOLD)),
                Line::raw(""),
                Line::from(vec![
                    Span::raw("Press "),
                    Span::styled("a", Style::default().fg(c.focus_border)),
                    Span::raw(" to enter a wallet address"),
                ]),
            ])
            .alignment(Alignment::Center)
            .block(pane("Wallet", c));
            f.render_widget(p, area);
        }
        WalletState::Loading(addr) => {
            let p = Paragraph::new(format!("Loading balances for {addr} {LOADING_PLACEHOLDER}"))
                .style(Style::default().fg(c.text_dim))
                .block(pane("Wallet", c));
            f.render_widget(p, area);
        }
        WalletState::Loaded(w) => {
            let reg = app.assets();
            let mut lines = vec![
                labeled("Address", Span::styled(w.address.clone(), Style::default().fg(c.text))),
                labeled(
                    PRIMARY_ASSET,
                    slot(&w.primary, c, |b| reg.format_amount(PRIMARY_ASSET, *b), c.accent),
                ),
                Line::raw(""),
                Line::styled("All assets", Style::default().fg(c.text_dim).add_modifier(Modifier::BOLD)),
            ];
            match &w.balances {
                Loadable::Ready(map) if map.is_empty() => {
                    lines.push(Line::styled("  none", Style::default().fg(c.text_dim)));
                }
                Loadable::Ready(map) => {
                    for (asset, raw) in map {
                        lines.push(Line::from(vec![
                            Span::styled(format!("  {asset:<12}"), Style::default().fg(c.text_dim)),
                            Span::styled(reg.format_amount(asset, *raw), Style::default().fg(c.text)),
                        ]));
                    }
                }
                other => lines.push(Line::from(vec![Span::raw("  "), slot(other, c, |_| String::new(), c.text)])),
            }
            if app.is_in_flight(crate::types::ActionKind::Transfer) {
                lines.push(Line::raw(""));
                lines.push(Line::styled("Transfer pending…", Style::default().fg(c.text_dim)));
            }
            f.render_widget(Paragraph::new(lines).block(pane("Wallet", c)), area);
        }
    }
}

fn explorer(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let rows = if app.block_lookup().is_some() {
        Layout::vertical([Constraint::Min(0), Constraint::Length(9)]).split(area)
    } else {
        Layout::vertical([Constraint::Min(0), Constraint::Length(0)]).split(area)
    };
    let cols = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[0]);

    match app.explorer().map(|e| &e.blocks) {
        None => loading(f, rows[0], "Explorer", c),
        Some(Loadable::Ready(blocks)) => {
            let items: Vec<ListItem> = blocks.iter().map(|b| block_row(b, c)).collect();
            let mut st = ListState::default();
            if !blocks.is_empty() {
                st.select(Some(app.explorer_selection()));
            }
            let list = List::new(items)
                .block(pane("Blocks", c).border_style(Style::default().fg(c.focus_border)))
                .highlight_style(Style::default().bg(c.selection_bg).fg(c.selection_fg));
            f.render_stateful_widget(list, cols[0], &mut st);

            match blocks.get(app.explorer_selection()) {
                Some(b) => block_details(f, cols[1], "Block", b, c),
                None => f.render_widget(pane("Block", c), cols[1]),
            }
        }
        Some(other) => placeholder(f, rows[0], "Blocks", other, c),
    }

    if let Some((height, lookup)) = app.block_lookup() {
        let title = format!("Lookup #{height}");
        match lookup {
            Loadable::Ready(b) => block_details(f, rows[1], &title, b, c),
            other => placeholder(f, rows[1], &title, other, c),
        }
    }
}

fn block_details(f: &mut Frame, area: Rect, title: &str, b: &LedgerBlock, c: &ColorScheme) {
    let val = |s: String| Span::styled(s, Style::default().fg(c.text));
    let lines = vec![
        labeled("Index", Span::styled(b.index.to_string(), Style::default().fg(c.accent))),
        labeled(
            "Type",
            Span::styled(b.kind.label().to_string(), Style::default().fg(c.block_class(b.kind.style_class()))),
        ),
        labeled("Hash", val(b.hash.clone())),
        labeled("Prev", val(b.prev_hash.clone())),
        labeled("Proposer", val(display_or_dash(&b.proposer))),
        labeled("Time", val(b.when())),
        labeled("Signature", val(truncate_hash(&b.signature, 32))),
    ];
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(pane(title, c));
    f.render_widget(p, area);
}

fn trading(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let Some(t) = app.trading() else {
        loading(f, area, "Trading", c);
        return;
    };
    let rows = Layout::vertical([Constraint::Length(8), Constraint::Min(0)]).split(area);
    let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[1]);

    match &t.stats {
        Loadable::Ready(s) => {
            let pnl_color = c.pnl(PnlClass::of(s.total_pnl));
            let lines = vec![
                labeled("Balance", Span::styled(format!("{:.2}", s.balance), Style::default().fg(c.accent))),
                labeled("Total P&L", Span::styled(format!("{:+.2}", s.total_pnl), Style::default().fg(pnl_color))),
                labeled(
                    "Trades",
                    Span::raw(format!("{} ({} won / {} lost)", s.total_trades, s.winning_trades, s.losing_trades)),
                ),
                labeled("Win rate", Span::raw(format!("{:.1}%", s.win_rate))),
                labeled("Max drawdown", Span::raw(format!("{:.2}%", s.max_drawdown))),
            ];
            f.render_widget(Paragraph::new(lines).block(pane("Paper trading", c)), top[0]);
        }
        other => placeholder(f, top[0], "Paper trading", other, c),
    }

    match &t.portfolio {
        Loadable::Ready(p) => {
            let lines = vec![
                labeled("Balance", Span::raw(format!("{:.2}", p.balance))),
                labeled(
                    "P&L",
                    Span::styled(format!("{:+.2}", p.total_pnl), Style::default().fg(c.pnl(PnlClass::of(p.total_pnl)))),
                ),
                Line::styled(p.summary.clone(), Style::default().fg(c.text_dim)),
            ];
            let w = Paragraph::new(lines).wrap(Wrap { trim: true }).block(pane("Portfolio", c));
            f.render_widget(w, top[1]);
        }
        other => placeholder(f, top[1], "Portfolio", other, c),
    }

    let signal_lines: Vec<Line> = t
        .signals
        .iter()
        .map(|(ticker, s)| {
            let value = slot(
                s,
                c,
                |s| match (s.price, s.confidence) {
                    (Some(p), Some(conf)) => format!("{} @ {p:.2} ({:.0}%)", s.signal, conf * 100.0),
                    (Some(p), None) => format!("{} @ {p:.2}", s.signal),
                    _ => display_or_dash(&s.signal),
                },
                c.text,
            );
            Line::from(vec![Span::styled(format!("{ticker:<8}"), Style::default().fg(c.text_dim)), value])
        })
        .collect();
    f.render_widget(Paragraph::new(signal_lines).block(pane("Latest signals", c)), bottom[0]);

    match &t.history {
        Loadable::Ready(trades) => {
            let items: Vec<ListItem> = trades
                .iter()
                .map(|tr| {
                    let class = PnlClass::of(tr.pnl);
                    let exit = tr.exit_price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "open".into());
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("{:<10}", tr.ticker), Style::default().fg(c.text)),
                        Span::raw(format!("{:<5}", tr.side.label())),
                        Span::raw(format!("{:>12.2} → {:>10}  ", tr.entry_price, exit)),
                        Span::styled(format!("{:+.2}", tr.pnl), Style::default().fg(c.pnl(class))),
                    ]))
                })
                .collect();
            f.render_widget(List::new(items).block(pane("Trade history", c)), bottom[1]);
        }
        other => placeholder(f, bottom[1], "Trade history", other, c),
    }
}

fn models(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let Some(m) = app.models() else {
        loading(f, area, "Models", c);
        return;
    };
    let rows = Layout::vertical([Constraint::Min(0), Constraint::Length(8)]).split(area);

    match &m.owned {
        None => {
            let p = Paragraph::new("Load a wallet address (a) to track your models")
                .style(Style::default().fg(c.text_dim))
                .block(pane("Model progress", c));
            f.render_widget(p, rows[0]);
        }
        Some(owned) => {
            let cols = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(rows[0]);
            let items: Vec<ListItem> = app
                .tickers()
                .iter()
                .map(|ticker| {
                    let progress = owned.progress.iter().find(|(t, _)| t == ticker).map(|(_, p)| p);
                    let value = match progress {
                        Some(Loadable::Ready(p)) => Span::raw(progress_summary(p)),
                        Some(other) => slot(other, c, |_| String::new(), c.text),
                        None => Span::styled("-", Style::default().fg(c.text_dim)),
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("{ticker:<8}"), Style::default().fg(c.text)),
                        value,
                    ]))
                })
                .collect();
            let mut st = ListState::default();
            st.select(Some(app.model_selection()));
            let list = List::new(items)
                .block(pane(&format!("Model progress · {}", owned.owner), c))
                .highlight_style(Style::default().bg(c.selection_bg).fg(c.selection_fg));
            f.render_stateful_widget(list, cols[0], &mut st);

            model_details(f, cols[1], app, c);
        }
    }

    let nfts = match &m.owned {
        Some(o) => (&o.my_models, "My models"),
        None => (&m.all_nfts, "All model NFTs"),
    };
    match nfts.0 {
        Loadable::Ready(list) => {
            let items: Vec<ListItem> = list
                .iter()
                .map(|n| {
                    ListItem::new(format!(
                        "{:<28} {:<20} acc {:>5.1}%  win {:>5.1}%  {} preds",
                        truncate_hash(&n.token_id, 28),
                        truncate_hash(&n.name, 20),
                        n.accuracy * 100.0,
                        n.win_rate * 100.0,
                        n.total_predictions
                    ))
                })
                .collect();
            let title = match m.all_nfts.ready() {
                Some(all) => format!("{} · {} minted network-wide", nfts.1, all.len()),
                None => nfts.1.to_string(),
            };
            f.render_widget(List::new(items).block(pane(&title, c)), rows[1]);
        }
        other => placeholder(f, rows[1], nfts.1, other, c),
    }
}

fn model_details(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let ticker = app.selected_ticker().unwrap_or("-");
    let Some(p) = app.selected_progress() else {
        f.render_widget(
            Paragraph::new(format!("No epoch stats for {ticker}"))
                .style(Style::default().fg(c.text_dim))
                .block(pane(ticker, c)),
            area,
        );
        return;
    };
    let parts = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).split(area);

    let raw = p.progress_ratio();
    let gauge = Gauge::default()
        .block(pane(&format!("{ticker} · epoch {}", p.current_epoch), c))
        .gauge_style(Style::default().fg(c.gauge))
        .ratio(display_ratio(raw))
        .label(format!("{}/{} ({:.0}%)", p.predictions_in_epoch, p.predictions_per_epoch, raw * 100.0));
    f.render_widget(gauge, parts[0]);

    let (mint_text, mint_color) = if p.nft_minted {
        ("minted".to_string(), c.text_dim)
    } else if p.is_mintable() {
        ("ready to mint (m)".to_string(), c.pnl_positive)
    } else {
        (crate::metrics::mint_blocker(p).unwrap_or_default(), c.text_dim)
    };
    let lines = vec![
        labeled("Model", Span::raw(p.model_id.clone())),
        labeled("Accuracy", Span::raw(format!("{:.1}%", p.accuracy() * 100.0))),
        labeled("Predictions", Span::raw(format!("{} ({} correct)", p.total_predictions, p.total_correct))),
        labeled("Epochs done", Span::raw(p.epochs_completed.to_string())),
        labeled("Mint", Span::styled(mint_text, Style::default().fg(mint_color))),
    ];
    f.render_widget(Paragraph::new(lines).block(pane("Details", c)), parts[1]);
}

fn settings(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let lines = vec![
        labeled("RPC endpoint", Span::styled(app.endpoint().to_string(), Style::default().fg(c.accent))),
        labeled(
            "Wallet",
            Span::raw(app.wallet().address.clone().unwrap_or_else(|| "-".into())),
        ),
        labeled("Tickers", Span::raw(app.tickers().join(", "))),
        labeled("Theme", Span::raw(app.theme().to_string())),
        labeled("Render FPS", Span::raw(app.fps().to_string())),
        Line::raw(""),
        Line::styled(
            "Press e to change the RPC endpoint; it applies to the next call.",
            Style::default().fg(c.text_dim),
        ),
    ];
    f.render_widget(Paragraph::new(lines).block(pane("Settings", c)), area);
}

// ===============================
// Overlays
// ===============================
fn draw_input_overlay(f: &mut Frame, app: &App, c: &ColorScheme) {
    let title = match app.input_mode() {
        InputMode::Address => " Wallet address ".to_string(),
        InputMode::Endpoint => " RPC endpoint ".to_string(),
        InputMode::TransferTo => " Transfer · recipient ".to_string(),
        InputMode::TransferAmount => format!(
            " Transfer to {} · amount ({PRIMARY_ASSET}) ",
            app.transfer_recipient().unwrap_or("?")
        ),
        InputMode::BlockHeight => " Go to block height ".to_string(),
        InputMode::Normal => return,
    };

    let area = f.area();
    let width = ((area.width as u32 * 6 / 10) as u16).max(30).min(area.width);
    let overlay = Rect {
        x: area.width.saturating_sub(width) / 2,
        y: area.height.saturating_sub(3) / 2,
        width,
        height: 3.min(area.height),
    };
    f.render_widget(Clear, overlay);
    let p = Paragraph::new(app.input())
        .style(Style::default().fg(c.text))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(c.focus_border)),
        );
    f.render_widget(p, overlay);

    if overlay.width > 2 {
        let x = overlay.x + 1 + (app.input().chars().count() as u16).min(overlay.width - 2);
        f.set_cursor_position((x, overlay.y + 1));
    }
}

fn draw_toast(f: &mut Frame, app: &App, c: &ColorScheme) {
    let Some((message, kind)) = app.toast() else {
        return;
    };
    let (color, mark) = match kind {
        ToastKind::Success => (c.toast_success, "✓"),
        ToastKind::Error => (c.toast_error, "✗"),
    };

    let area = f.area();
    let width = (area.width / 2).max(20).min(area.width);
    let overlay = Rect {
        x: area.width.saturating_sub(width) / 2,
        y: area.height.saturating_sub(4),
        width,
        height: 3.min(area.height),
    };
    f.render_widget(Clear, overlay);
    let p = Paragraph::new(format!("{mark} {message}"))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(p, overlay);
}

// ===============================
// Helpers
// ===============================
fn labeled<'a>(label: &str, value: Span<'a>) -> Line<'a> {
    Line::from(vec![Span::raw(format!("{label:<14}")), value])
}

/// Value of one fetch slot, or its placeholder
fn slot<T>(l: &Loadable<T>, c: &ColorScheme, fmt: impl Fn(&T) -> String, color: ratatui::style::Color) -> Span<'static> {
    match l {
        Loadable::Ready(v) => Span::styled(fmt(v), Style::default().fg(color)),
        Loadable::Loading => Span::styled(LOADING_PLACEHOLDER, Style::default().fg(c.text_dim)),
        Loadable::Failed(_) => Span::styled(ERROR_PLACEHOLDER, Style::default().fg(c.placeholder_error)),
    }
}

fn placeholder<T>(f: &mut Frame, area: Rect, title: &str, l: &Loadable<T>, c: &ColorScheme) {
    let mut lines = vec![Line::from(slot(l, c, |_| String::new(), c.text))];
    if let Loadable::Failed(e) = l {
        lines.push(Line::styled(e.clone(), Style::default().fg(c.text_dim)));
    }
    let p = Paragraph::new(lines).wrap(Wrap { trim: true }).block(pane(title, c));
    f.render_widget(p, area);
}

fn loading(f: &mut Frame, area: Rect, title: &str, c: &ColorScheme) {
    let p = Paragraph::new(LOADING_PLACEHOLDER)
        .style(Style::default().fg(c.text_dim))
        .block(pane(title, c));
    f.render_widget(p, area);
}

fn block_row(b: &LedgerBlock, c: &ColorScheme) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(format!("#{:<8}", b.index), Style::default().fg(c.accent)),
        Span::styled(
            format!("{:<10}", b.kind.label()),
            Style::default().fg(c.block_class(b.kind.style_class())),
        ),
        Span::styled(format!("{:<20}", truncate_hash(&b.hash, 18)), Style::default().fg(c.text)),
        Span::styled(truncate_hash(&b.proposer, 16), Style::default().fg(c.text_dim)),
    ]))
}

fn progress_summary(p: &ModelProgress) -> String {
    let bar_len = 10usize;
    let filled = (display_ratio(p.progress_ratio()) * bar_len as f64).round() as usize;
    format!(
        "e{:<3} [{}{}] {:>4.0}%  acc {:>5.1}%{}",
        p.current_epoch,
        "#".repeat(filled),
        "-".repeat(bar_len - filled),
        p.progress_ratio() * 100.0,
        p.accuracy() * 100.0,
        if p.is_mintable() && !p.nft_minted { "  ★" } else { "" }
    )
}

fn display_or_dash(s: &str) -> String {
    if s.is_empty() { "-".into() } else { s.to_string() }
}

fn truncate_hash(hash: &str, max_len: usize) -> String {
    if hash.chars().count() <= max_len {
        hash.to_string()
    } else {
        let keep: String = hash.chars().take(max_len.saturating_sub(3)).collect();
        format!("{keep}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_hashes() {
        assert_eq!(truncate_hash("abc", 8), "abc");
        assert_eq!(truncate_hash("abcdefghijkl", 8), "abcde...");
    }
}
