use crate::config;
use crate::core::{DashboardCore, DashboardTab};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::time::Duration;

const QUEUE_PAGE: isize = 10;

pub fn run() -> Result<()> {
    let settings = config::load_settings()?;
    let mut core = DashboardCore::new(settings);

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result: Result<()> = loop {
        if core.dirty {
            terminal.draw(|frame| crate::ui::draw(frame, &core))?;
            core.dirty = false;
        }

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        match event::read()? {
            Event::Resize(_, _) => core.dirty = true,
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if !handle_key(&mut core, key) {
                    break Ok(());
                }
            }
            _ => {}
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    let save_result = config::save_settings(&core.settings);
    result?;
    save_result?;
    Ok(())
}

/// Applies one key press. Returns `false` when the app should exit.
fn handle_key(core: &mut DashboardCore, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
        KeyCode::Char('q') | KeyCode::Esc => return false,
        KeyCode::Down | KeyCode::Char('j') => core.select_next(),
        KeyCode::Up | KeyCode::Char('k') => core.select_prev(),
        KeyCode::Char(' ') | KeyCode::Enter => core.toggle_selected_genre(),
        KeyCode::Char('a') => core.select_all_genres(),
        KeyCode::Char('x') => core.clear_selection(),
        KeyCode::Tab | KeyCode::Right => core.next_tab(),
        KeyCode::BackTab | KeyCode::Left => core.prev_tab(),
        KeyCode::Char('1') => core.set_tab(DashboardTab::Performed),
        KeyCode::Char('2') => core.set_tab(DashboardTab::Artists),
        KeyCode::Char('3') => core.set_tab(DashboardTab::Queue),
        KeyCode::PageDown => core.scroll_queue(QUEUE_PAGE),
        KeyCode::PageUp => core.scroll_queue(-QUEUE_PAGE),
        KeyCode::Char('r') => core.reload(false),
        KeyCode::Char('R') => core.reload(true),
        _ => {}
    }
    true
}
