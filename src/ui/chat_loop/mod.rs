//! Full-screen chat loop.
//!
//! The loop owns the [`ChatSession`] and is its only writer. Remote calls run
//! on spawned tasks and report back over a channel tagged with the request
//! token, so the UI stays responsive while a reply is outstanding.

pub mod keybindings;
pub mod lifecycle;

use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tokio::sync::mpsc;
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::completion::{CompletionClient, CompletionError};
use crate::core::session::{ChatSession, PendingReply, SubmitOutcome};
use crate::core::storage::SnapshotStorage;
use crate::ui::theme::Theme;
use crate::ui::transcript::TranscriptRenderer;

use keybindings::{action_for_key, ChatAction};
use lifecycle::{restore_terminal, setup_terminal};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const STATUS_TTL: Duration = Duration::from_secs(3);
const INPUT_TITLE: &str = "Type a message (Enter to send, Ctrl+L to clear, Ctrl+C to quit)";

type CompletionResult = (u64, Result<Option<String>, CompletionError>);

pub struct ChatContext<S> {
    pub session: ChatSession<S>,
    pub client: Arc<dyn CompletionClient>,
    pub renderer: Box<dyn TranscriptRenderer + Send + Sync>,
    pub model: String,
}

/// Scroll position and transient status; nothing here is persisted.
#[derive(Debug)]
pub struct ChatView {
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    status: Option<(String, Instant)>,
}

impl Default for ChatView {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            auto_scroll: true,
            status: None,
        }
    }
}

impl ChatView {
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some((text.into(), Instant::now()));
    }

    pub fn status(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|(_, set_at)| set_at.elapsed() < STATUS_TTL)
            .map(|(text, _)| text.as_str())
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
    }

    /// Clamp the offset for a transcript of `total_lines` in a viewport of
    /// `height` rows. Reaching the bottom re-enables auto-scroll.
    pub fn settle(&mut self, total_lines: u16, height: u16) -> u16 {
        let max_offset = total_lines.saturating_sub(height);
        if self.auto_scroll || self.scroll_offset >= max_offset {
            self.auto_scroll = true;
            self.scroll_offset = max_offset;
        }
        self.scroll_offset
    }
}

/// Word-wrap `lines` to `width` columns, one returned line per screen row.
///
/// The transcript is drawn from these rows without further wrapping, so the
/// row count is exactly what scrolling has to cover. Whitespace at a break is
/// dropped and words wider than a row are split. Span styles carry over.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width);
    let mut rows = Vec::with_capacity(lines.len());

    for line in lines {
        if width == 0 || line.width() <= width {
            rows.push(line);
            continue;
        }

        let mut wrapper = RowWrapper::new(width);
        for span in &line.spans {
            for (is_space, piece) in split_runs(&span.content) {
                wrapper.push(piece, is_space, span.style);
            }
        }
        rows.extend(
            wrapper
                .finish()
                .into_iter()
                .map(|spans| Line::from(spans).style(line.style)),
        );
    }

    rows
}

/// Split `text` into alternating runs of whitespace and non-whitespace.
fn split_runs(text: &str) -> Vec<(bool, &str)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current = None;

    for (idx, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        if let Some(kind) = current {
            if kind != is_space {
                runs.push((kind, &text[start..idx]));
                start = idx;
            }
        }
        current = Some(is_space);
    }
    if let Some(kind) = current {
        runs.push((kind, &text[start..]));
    }

    runs
}

struct RowWrapper {
    width: usize,
    rows: Vec<Vec<Span<'static>>>,
    current: Vec<Span<'static>>,
    used: usize,
}

impl RowWrapper {
    fn new(width: usize) -> Self {
        Self {
            width,
            rows: Vec::new(),
            current: Vec::new(),
            used: 0,
        }
    }

    fn push(&mut self, piece: &str, is_space: bool, style: Style) {
        let piece_width = piece.width();

        if is_space {
            if self.used == 0 && !self.rows.is_empty() {
                return;
            }
            if self.used + piece_width <= self.width {
                self.append(piece.to_string(), piece_width, style);
            } else if self.used > 0 {
                self.break_row();
            } else {
                self.push_split(piece, style);
            }
            return;
        }

        if self.used + piece_width <= self.width {
            self.append(piece.to_string(), piece_width, style);
        } else if piece_width <= self.width {
            self.break_row();
            self.append(piece.to_string(), piece_width, style);
        } else {
            self.push_split(piece, style);
        }
    }

    /// Place `piece` character by character, breaking rows as they fill.
    fn push_split(&mut self, piece: &str, style: Style) {
        let mut chunk = String::new();
        let mut chunk_width = 0;

        for c in piece.chars() {
            let char_width = c.width().unwrap_or(0);
            if self.used + chunk_width + char_width > self.width && self.used + chunk_width > 0 {
                self.append(std::mem::take(&mut chunk), chunk_width, style);
                chunk_width = 0;
                self.break_row();
            }
            chunk.push(c);
            chunk_width += char_width;
        }
        if !chunk.is_empty() {
            self.append(chunk, chunk_width, style);
        }
    }

    fn append(&mut self, text: String, text_width: usize, style: Style) {
        if !text.is_empty() {
            self.current.push(Span::styled(text, style));
        }
        self.used += text_width;
    }

    fn break_row(&mut self) {
        self.rows.push(std::mem::take(&mut self.current));
        self.used = 0;
    }

    fn finish(mut self) -> Vec<Vec<Span<'static>>> {
        if !self.current.is_empty() || self.rows.is_empty() {
            self.rows.push(self.current);
        }
        self.rows
    }
}

/// The end of `draft` that fits in `max_width` columns.
pub fn visible_tail(draft: &str, max_width: usize) -> &str {
    let mut used = 0;
    let mut start = draft.len();
    for (idx, c) in draft.char_indices().rev() {
        let char_width = c.width().unwrap_or(0);
        if used + char_width > max_width {
            break;
        }
        used += char_width;
        start = idx;
    }
    &draft[start..]
}

pub async fn run_chat<S>(context: ChatContext<S>) -> Result<(), Box<dyn Error>>
where
    S: SnapshotStorage,
{
    let ChatContext {
        mut session,
        client,
        renderer,
        model,
    } = context;

    let mut terminal = setup_terminal()?;
    let (tx, mut rx) = mpsc::unbounded_channel::<CompletionResult>();
    let mut view = ChatView::default();
    let theme = Theme::dark_default();

    let result: Result<(), Box<dyn Error>> = loop {
        if let Err(err) =
            terminal.draw(|f| draw(f, &session, &mut view, &*renderer, &theme, &model))
        {
            break Err(err.into());
        }

        match poll_event() {
            Ok(Some(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                match action_for_key(key) {
                    Some(ChatAction::Quit) => break Ok(()),
                    Some(action) => {
                        handle_action(action, &mut session, &mut view, &client, &tx);
                    }
                    None => {}
                }
            }
            Ok(Some(Event::Paste(text))) => {
                session.draft_mut().push_str(&text.replace(['\r', '\n'], " "));
            }
            Ok(_) => {}
            Err(err) => break Err(err),
        }

        while let Ok((token, outcome)) = rx.try_recv() {
            session.complete(token, outcome);
        }
    };

    restore_terminal(&mut terminal)?;
    result
}

fn poll_event() -> Result<Option<Event>, Box<dyn Error>> {
    if event::poll(POLL_INTERVAL)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

fn handle_action<S: SnapshotStorage>(
    action: ChatAction,
    session: &mut ChatSession<S>,
    view: &mut ChatView,
    client: &Arc<dyn CompletionClient>,
    tx: &mpsc::UnboundedSender<CompletionResult>,
) {
    match action {
        ChatAction::Submit => match session.submit_draft() {
            SubmitOutcome::Dispatched(pending) => {
                view.scroll_to_bottom();
                spawn_completion(Arc::clone(client), pending, tx.clone());
            }
            SubmitOutcome::Busy => view.set_status("Still waiting for the previous reply"),
            SubmitOutcome::Ignored => {}
        },
        ChatAction::Reset => {
            view.scroll_to_bottom();
            match session.reset() {
                Ok(()) => view.set_status("Conversation cleared"),
                Err(err) => view.set_status(format!("Conversation cleared; saved copy remains ({err})")),
            }
        }
        ChatAction::Insert(c) => session.draft_mut().push(c),
        ChatAction::Backspace => {
            session.draft_mut().pop();
        }
        ChatAction::ScrollUp(lines) => view.scroll_up(lines),
        ChatAction::ScrollDown(lines) => view.scroll_down(lines),
        ChatAction::ScrollToBottom => view.scroll_to_bottom(),
        ChatAction::Quit => {}
    }
}

fn spawn_completion(
    client: Arc<dyn CompletionClient>,
    pending: PendingReply,
    tx: mpsc::UnboundedSender<CompletionResult>,
) {
    tokio::spawn(async move {
        let PendingReply { token, prompt } = pending;
        let result = client.complete(&prompt).await;
        if tx.send((token, result)).is_err() {
            debug!(token, "chat loop exited before reply arrived");
        }
    });
}

fn draw<S: SnapshotStorage>(
    f: &mut Frame,
    session: &ChatSession<S>,
    view: &mut ChatView,
    renderer: &(dyn TranscriptRenderer + Send + Sync),
    theme: &Theme,
    model: &str,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    let lines = renderer.render(session.messages(), session.is_waiting_for_reply());
    draw_transcript(f, chunks[0], lines, view, format!("gemchat - {model}"), theme);

    let status = Paragraph::new(Line::from(Span::styled(
        view.status().unwrap_or_default().to_string(),
        theme.status_style,
    )));
    f.render_widget(status, chunks[1]);

    draw_input(f, chunks[2], session.draft(), theme);
}

fn draw_transcript(
    f: &mut Frame,
    area: Rect,
    lines: Vec<Line<'static>>,
    view: &mut ChatView,
    title: String,
    theme: &Theme,
) {
    let rows = wrap_lines(lines, area.width);

    // One row goes to the title.
    let available_height = area.height.saturating_sub(1);
    let total_rows = u16::try_from(rows.len()).unwrap_or(u16::MAX);
    let scroll_offset = view.settle(total_rows, available_height);

    let transcript = Paragraph::new(rows)
        .block(Block::default().title(title).title_style(theme.title_style))
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, area);
}

fn draw_input(f: &mut Frame, area: Rect, draft: &str, theme: &Theme) {
    // Leave the last column free for the cursor.
    let inner_width = area.width.saturating_sub(2);
    let shown = visible_tail(draft, usize::from(inner_width.saturating_sub(1)));

    let input = Paragraph::new(shown).style(theme.input_text_style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.input_border_style)
            .title(INPUT_TITLE),
    );
    f.render_widget(input, area);

    let cursor = u16::try_from(shown.width()).unwrap_or(u16::MAX);
    f.set_cursor_position((area.x + 1 + cursor.min(inner_width), area.y + 1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn row_texts(rows: &[Line<'_>]) -> Vec<String> {
        rows.iter().map(|row| row.to_string()).collect()
    }

    fn screen_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn wrap_lines_breaks_at_words() {
        let rows = wrap_lines(
            vec![Line::from("aaaaaa bbbbbb cccccc"), Line::from("LAST")],
            10,
        );
        assert_eq!(row_texts(&rows), vec!["aaaaaa ", "bbbbbb ", "cccccc", "LAST"]);
    }

    #[test]
    fn wrap_lines_splits_long_words_and_keeps_styles() {
        let bold = Style::default().add_modifier(ratatui::style::Modifier::BOLD);
        let line = Line::from(vec![
            Span::raw("Bot: "),
            Span::styled("abcdefghijkl", bold),
        ]);
        let rows = wrap_lines(vec![line], 6);
        assert_eq!(row_texts(&rows), vec!["Bot: a", "bcdefg", "hijkl"]);
        assert_eq!(rows[1].spans[0].style, bold);
    }

    #[test]
    fn wrap_lines_keeps_short_and_blank_lines() {
        let rows = wrap_lines(
            vec![Line::from("  • Tea"), Line::from(""), Line::from("x")],
            10,
        );
        assert_eq!(row_texts(&rows), vec!["  • Tea", "", "x"]);
        assert_eq!(wrap_lines(vec![Line::from("abc def")], 0).len(), 1);
    }

    #[test]
    fn newest_row_is_visible_after_word_wrap() {
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();
        let mut view = ChatView::default();
        let lines = vec![Line::from("aaaaaa bbbbbb cccccc"), Line::from("LAST")];

        terminal
            .draw(|f| {
                let area = f.area();
                draw_transcript(f, area, lines, &mut view, "t".into(), &Theme::monochrome());
            })
            .unwrap();

        assert_eq!(screen_rows(&terminal), vec!["t", "bbbbbb", "cccccc", "LAST"]);
        assert_eq!(view.scroll_offset, 1);
    }

    #[test]
    fn visible_tail_keeps_the_end_of_the_draft() {
        assert_eq!(visible_tail("hello world", 5), "world");
        assert_eq!(visible_tail("hi", 5), "hi");
        assert_eq!(visible_tail("日本語", 4), "本語");
        assert_eq!(visible_tail("abc", 0), "");
    }

    #[test]
    fn long_drafts_show_their_tail_with_cursor_after_it() {
        let mut terminal = Terminal::new(TestBackend::new(12, 3)).unwrap();
        let draft = "x".repeat(70_000) + "END";

        terminal
            .draw(|f| {
                let area = f.area();
                draw_input(f, area, &draft, &Theme::monochrome());
            })
            .unwrap();

        assert_eq!(screen_rows(&terminal)[1], "│xxxxxxEND │");
        assert_eq!(terminal.get_cursor_position().unwrap().x, 10);
    }

    #[test]
    fn view_follows_bottom_until_user_scrolls() {
        let mut view = ChatView::default();
        assert_eq!(view.settle(30, 10), 20);

        view.scroll_up(5);
        assert!(!view.auto_scroll);
        assert_eq!(view.settle(40, 10), 15);

        view.scroll_down(100);
        assert_eq!(view.settle(40, 10), 30);
        assert!(view.auto_scroll);
    }

    #[test]
    fn short_transcripts_do_not_scroll() {
        let mut view = ChatView::default();
        assert_eq!(view.settle(3, 10), 0);
        view.scroll_up(2);
        assert_eq!(view.settle(3, 10), 0);
    }

    #[test]
    fn status_text_is_visible_after_set() {
        let mut view = ChatView::default();
        assert_eq!(view.status(), None);
        view.set_status("Conversation cleared");
        assert_eq!(view.status(), Some("Conversation cleared"));
    }
}
