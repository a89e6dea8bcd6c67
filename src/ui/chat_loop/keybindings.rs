//! Key → action mapping for the full-screen chat.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const PAGE_SCROLL: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    Quit,
    Submit,
    Reset,
    Insert(char),
    Backspace,
    ScrollUp(u16),
    ScrollDown(u16),
    ScrollToBottom,
}

pub fn action_for_key(key: KeyEvent) -> Option<ChatAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    let action = match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => ChatAction::Quit,
        KeyCode::Char('l') if ctrl => ChatAction::Reset,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(c) => ChatAction::Insert(c),
        KeyCode::Esc => ChatAction::Quit,
        KeyCode::Enter => ChatAction::Submit,
        KeyCode::Backspace => ChatAction::Backspace,
        KeyCode::Up => ChatAction::ScrollUp(1),
        KeyCode::Down => ChatAction::ScrollDown(1),
        KeyCode::PageUp => ChatAction::ScrollUp(PAGE_SCROLL),
        KeyCode::PageDown => ChatAction::ScrollDown(PAGE_SCROLL),
        KeyCode::End => ChatAction::ScrollToBottom,
        _ => return None,
    };

    Some(action)
}
