mod common;

use common::{client, healthy_dashboard, MockTransport, Reply};
use compass_dash::app::{App, InputMode};
use compass_dash::loader::{self, ViewData};
use compass_dash::session::MemoryStore;
use compass_dash::theme::Theme;
use compass_dash::types::AppEvent;
use compass_dash::ui;
use compass_dash::views::View;
use ratatui::{backend::TestBackend, Terminal};

fn app() -> App {
    App::new(
        Box::new(MemoryStore::default()),
        vec!["BTC".into()],
        "http://node.test/".into(),
        Theme::Nord,
        20,
    )
}

fn render(app: &App, width: u16, height: u16) -> ratatui::buffer::Buffer {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| ui::draw(f, app)).unwrap();
    terminal.backend().buffer().clone()
}

fn screen(app: &App) -> String {
    let buf = render(app, 120, 32);
    let mut out = String::new();
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[tokio::test]
async fn dashboard_renders_height_next_to_failed_peers() {
    let t = MockTransport::new();
    healthy_dashboard(&t, 42);
    t.reply("getPeers", Reply::Down);
    let data = loader::fetch_dashboard(&client(&t)).await;

    let mut app = app();
    let g = app.begin_load(View::Dashboard);
    app.on_event(AppEvent::ViewLoaded { generation: g, data: ViewData::Dashboard(data) });

    let s = screen(&app);
    let height_line = s.lines().find(|l| l.contains("Chain height")).unwrap();
    assert!(height_line.contains("42"), "{height_line}");
    let peers_line = s.lines().find(|l| l.contains("Peers")).unwrap();
    assert!(peers_line.contains("error loading"), "{peers_line}");
    assert!(s.contains("● connected"));
    assert!(s.contains("#42"));
}

#[test]
fn wallet_without_address_shows_prompt() {
    let mut app = app();
    app.activate(View::Wallet);
    let s = screen(&app);
    assert!(s.contains("No wallet loaded"));
    assert!(s.contains("to enter a wallet address"));
}

#[test]
fn first_paint_shows_loading() {
    let s = screen(&app());
    assert!(s.contains("loading"));
    assert!(s.contains("○ disconnected"));
}

#[test]
fn theme_background_fills_the_frame() {
    let app = app();
    let buf = render(&app, 120, 32);
    let bg = Theme::Nord.colors().background;
    assert_eq!(buf[(119, 0)].bg, bg);
    assert_eq!(buf[(60, 20)].bg, bg);
}

#[test]
fn input_overlay_fits_very_wide_terminals() {
    let mut app = app();
    app.start_input(InputMode::BlockHeight);
    let buf = render(&app, 12_000, 5);
    let row: String = (0..buf.area.width).map(|x| buf[(x, 1)].symbol()).collect();
    assert!(row.contains("Go to block height"), "overlay title missing");
}
