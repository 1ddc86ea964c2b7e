use std::fs;
use std::path::Path;

use quire::download::DownloadManager;
use quire::event_source::{KeyCode, char_key, key_event};
use quire::main_app::App;
use quire::pages::PageSet;
use quire::test_utils::test_helpers::{capture_terminal_state, create_test_terminal};
use tempfile::TempDir;

fn write_pages(dir: &Path, count: usize) {
    for i in 1..=count {
        fs::write(dir.join(format!("{i:04}.png")), b"").unwrap();
    }
}

fn test_app(page_count: usize) -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    write_pages(dir.path(), page_count);
    let pages = PageSet::discover(dir.path()).unwrap();
    let downloads = DownloadManager::new(
        dir.path().join("document.pdf"),
        "http://127.0.0.1:1/document.pdf".to_string(),
        Some(dir.path().to_path_buf()),
    );
    let app = App::new_for_tests(pages, downloads);
    (dir, app)
}

#[test]
fn initial_frame_shows_page_stack_and_status_bar() {
    let (_dir, mut app) = test_app(6);
    let mut terminal = create_test_terminal(100, 40);

    terminal.draw(|f| app.draw(f)).unwrap();
    let state = capture_terminal_state(&terminal);

    assert!(state.contains("[Tab: Pages]"), "missing panel toggle:\n{state}");
    assert!(state.contains("1/6 | 100% | Single"), "missing indicator:\n{state}");
    assert!(state.contains(" 1 "), "missing page frame title:\n{state}");
    assert!(state.contains("0001.png"), "missing page label:\n{state}");
    assert!(state.contains("q: Quit"), "missing key help:\n{state}");
}

#[test]
fn open_panel_lists_numbered_thumbnails() {
    let (_dir, mut app) = test_app(6);
    let mut terminal = create_test_terminal(100, 40);

    app.handle_key_event(key_event(KeyCode::Tab));
    terminal.draw(|f| app.draw(f)).unwrap();
    let state = capture_terminal_state(&terminal);

    assert!(state.contains(" Pages "), "missing panel title:\n{state}");
    assert!(state.contains("   1 0001.png"), "missing first entry:\n{state}");
    assert!(state.contains("   6 0006.png"), "missing last entry:\n{state}");
    assert!(
        state.contains("Enter: Open page"),
        "help should follow panel focus:\n{state}"
    );
}

#[test]
fn zoom_change_flashes_hud_and_updates_indicator() {
    let (_dir, mut app) = test_app(3);
    let mut terminal = create_test_terminal(100, 40);

    app.handle_key_event(char_key('+'));
    terminal.draw(|f| app.draw(f)).unwrap();
    let state = capture_terminal_state(&terminal);

    assert!(state.contains("Zoom 110%"), "missing zoom flash:\n{state}");
    assert!(state.contains("1/3 | 110% | Single"), "missing indicator:\n{state}");
}

#[test]
fn page_prompt_renders_in_status_bar() {
    let (_dir, mut app) = test_app(9);
    let mut terminal = create_test_terminal(100, 40);

    app.handle_key_event(char_key(':'));
    app.handle_key_event(char_key('4'));
    terminal.draw(|f| app.draw(f)).unwrap();
    let state = capture_terminal_state(&terminal);

    assert!(state.contains("Go to page: 4█"), "missing prompt:\n{state}");
    assert!(state.contains("ESC: Cancel"), "missing prompt help:\n{state}");
}

#[test]
fn save_overlay_draws_over_the_stack() {
    let (_dir, mut app) = test_app(3);
    let mut terminal = create_test_terminal(100, 40);

    app.handle_key_event(char_key('s'));
    terminal.draw(|f| app.draw(f)).unwrap();
    let state = capture_terminal_state(&terminal);

    assert!(state.contains("Save Document"), "missing overlay title:\n{state}");
    assert!(state.contains("Saving document..."), "missing caption:\n{state}");
}

#[test]
fn double_mode_renders_pages_side_by_side() {
    let (_dir, mut app) = test_app(6);
    let mut terminal = create_test_terminal(160, 50);

    app.handle_key_event(char_key('d'));
    terminal.draw(|f| app.draw(f)).unwrap();
    let state = capture_terminal_state(&terminal);

    assert!(state.contains("1/6 | 100% | Double"), "missing indicator:\n{state}");
    // Pages 1 and 2 share a row, so both labels are on the same line.
    let pair_line = state
        .lines()
        .find(|line| line.contains("0001.png"))
        .expect("first page label missing");
    assert!(
        pair_line.contains("0002.png"),
        "expected side-by-side labels, got: {pair_line}"
    );
}

#[test]
fn notification_takes_over_the_status_line() {
    let (_dir, mut app) = test_app(3);
    let mut terminal = create_test_terminal(100, 40);

    app.notifications.error("Download failed: boom");
    terminal.draw(|f| app.draw(f)).unwrap();
    let state = capture_terminal_state(&terminal);

    assert!(
        state.contains("[ERROR] Download failed: boom | ESC: Dismiss"),
        "missing notification:\n{state}"
    );
}
