//! Transcript renderers.
//!
//! Both renderers consume the same state (the message list and the waiting
//! flag) and differ only in styling, so any caller can swap one for the
//! other. Layout rules:
//!
//! - the first segment of a message shares a line with its `You:` / `Bot:`
//!   label, later segments are indented on their own lines;
//! - bullets get a `•` marker, code blocks are indented one level deeper;
//! - a blank line separates messages;
//! - while a reply is outstanding the transcript ends with a typing line.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::core::config::TranscriptStyle;
use crate::core::format::{segment_reply, Segment, SegmentKind};
use crate::core::message::{Message, Sender};
use crate::ui::theme::Theme;

pub const TYPING_INDICATOR: &str = "Bot is typing...";

const INDENT: &str = "  ";
const CODE_INDENT: &str = "    ";
const BULLET: &str = "• ";

pub trait TranscriptRenderer {
    fn render(&self, messages: &[Message], waiting_for_reply: bool) -> Vec<Line<'static>>;

    /// Rendered lines without styling, for printing to a plain stream.
    fn render_text(&self, messages: &[Message], waiting_for_reply: bool) -> Vec<String> {
        self.render(messages, waiting_for_reply)
            .iter()
            .map(|line| line.to_string())
            .collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTranscript;

#[derive(Debug, Clone)]
pub struct StyledTranscript {
    theme: Theme,
}

impl StyledTranscript {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl Default for StyledTranscript {
    fn default() -> Self {
        Self::new(Theme::dark_default())
    }
}

impl TranscriptRenderer for PlainTranscript {
    fn render(&self, messages: &[Message], waiting_for_reply: bool) -> Vec<Line<'static>> {
        layout(&Theme::monochrome(), messages, waiting_for_reply)
    }
}

impl TranscriptRenderer for StyledTranscript {
    fn render(&self, messages: &[Message], waiting_for_reply: bool) -> Vec<Line<'static>> {
        layout(&self.theme, messages, waiting_for_reply)
    }
}

pub fn renderer_for(style: TranscriptStyle) -> Box<dyn TranscriptRenderer + Send + Sync> {
    match style {
        TranscriptStyle::Styled => Box::new(StyledTranscript::default()),
        TranscriptStyle::Plain => Box::new(PlainTranscript),
    }
}

fn layout(theme: &Theme, messages: &[Message], waiting_for_reply: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for message in messages {
        render_message(theme, message, &mut lines);
        lines.push(Line::from(""));
    }

    if waiting_for_reply {
        lines.push(Line::from(Span::styled(
            TYPING_INDICATOR,
            theme.typing_indicator_style,
        )));
    }

    lines
}

fn render_message(theme: &Theme, message: &Message, lines: &mut Vec<Line<'static>>) {
    let (prefix_style, text_style) = match message.sender {
        Sender::User => (theme.user_prefix_style, theme.user_text_style),
        Sender::Bot => (theme.bot_prefix_style, theme.bot_text_style),
    };
    let label = format!("{}:", message.sender.label());
    let segments = segment_reply(&message.text, message.sender);

    let mut segments = segments.into_iter();
    let first = segments.next();

    match &first {
        Some(segment) if segment.kind != SegmentKind::Code => {
            let mut spans = vec![Span::styled(format!("{label} "), prefix_style)];
            spans.extend(segment_spans(theme, segment, text_style));
            lines.push(Line::from(spans));
        }
        _ => lines.push(Line::from(Span::styled(label, prefix_style))),
    }

    if let Some(segment) = first.filter(|s| s.kind == SegmentKind::Code) {
        push_code(theme, &segment, lines);
    }

    for segment in segments {
        if segment.kind == SegmentKind::Code {
            push_code(theme, &segment, lines);
            continue;
        }
        let mut spans = vec![Span::raw(INDENT)];
        spans.extend(segment_spans(theme, &segment, text_style));
        lines.push(Line::from(spans));
    }
}

fn segment_spans(theme: &Theme, segment: &Segment, text_style: Style) -> Vec<Span<'static>> {
    match segment.kind {
        SegmentKind::Plain => vec![Span::styled(segment.text.clone(), text_style)],
        SegmentKind::Bold => vec![Span::styled(segment.text.clone(), theme.bold_text_style)],
        SegmentKind::Bullet => vec![
            Span::styled(BULLET, theme.bullet_style),
            Span::styled(segment.text.clone(), text_style),
        ],
        SegmentKind::Code => vec![Span::styled(segment.text.clone(), theme.code_style)],
    }
}

fn push_code(theme: &Theme, segment: &Segment, lines: &mut Vec<Line<'static>>) {
    for code_line in segment.text.lines() {
        lines.push(Line::from(vec![
            Span::raw(CODE_INDENT),
            Span::styled(code_line.to_string(), theme.code_style),
        ]));
    }
}
