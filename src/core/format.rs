//! Reply text → display segments.
//!
//! Bot replies arrive as loosely formatted text. Rather than teaching every
//! renderer about asterisks and fences, the text is broken into typed
//! segments here and renderers only decide how each segment kind looks.

use crate::core::message::Sender;

const FENCE: &str = "```";
const BOLD_MARKER: &str = "**";
const BULLET_MARKER: &str = "* ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Ordinary text line.
    Plain,
    /// A list item; the marker has already been stripped.
    Bullet,
    /// A line that was wrapped in `**`; markers removed.
    Bold,
    /// A fenced code block; fences removed, inner newlines kept.
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Split a message into display segments.
///
/// Bot text that opens with a code fence becomes a single [`SegmentKind::Code`]
/// segment. Everything else is split on newlines and on `"* "`; blank pieces
/// are dropped. For bot text, a piece starting with `**` is bold, the piece at
/// split position zero is plain, and every later piece is a bullet. User text
/// is never decorated.
pub fn segment_reply(text: &str, sender: Sender) -> Vec<Segment> {
    if sender.is_bot() && text.starts_with(FENCE) {
        let code = text.replace(FENCE, "");
        return vec![Segment::new(SegmentKind::Code, code.trim())];
    }

    split_pieces(text)
        .enumerate()
        .filter_map(|(index, piece)| {
            let trimmed = piece.trim();
            if trimmed.is_empty() {
                return None;
            }

            let segment = if !sender.is_bot() {
                Segment::new(SegmentKind::Plain, trimmed)
            } else if trimmed.starts_with(BOLD_MARKER) {
                Segment::new(SegmentKind::Bold, trimmed.replace(BOLD_MARKER, ""))
            } else if index == 0 {
                Segment::new(SegmentKind::Plain, trimmed)
            } else {
                Segment::new(SegmentKind::Bullet, trimmed)
            };
            Some(segment)
        })
        .collect()
}

/// Pieces between `\n` and `"* "` separators, empty pieces included so that
/// split positions stay stable.
fn split_pieces(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .flat_map(|line| line.split(BULLET_MARKER))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(segments: &[Segment]) -> Vec<SegmentKind> {
        segments.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn first_bot_line_is_plain_and_later_lines_are_bullets() {
        let segments = segment_reply("Here are options:\n* Tea\n* Coffee", Sender::Bot);
        assert_eq!(
            segments,
            vec![
                Segment::new(SegmentKind::Plain, "Here are options:"),
                Segment::new(SegmentKind::Bullet, "Tea"),
                Segment::new(SegmentKind::Bullet, "Coffee"),
            ]
        );
    }

    #[test]
    fn bold_markers_are_stripped() {
        let segments = segment_reply("Intro\n**Heading**\nbody", Sender::Bot);
        assert_eq!(
            kinds(&segments),
            vec![SegmentKind::Plain, SegmentKind::Bold, SegmentKind::Bullet]
        );
        assert_eq!(segments[1].text, "Heading");
    }

    #[test]
    fn inline_bullet_marker_splits_a_line() {
        let segments = segment_reply("Pick one * red * blue", Sender::Bot);
        assert_eq!(
            segments,
            vec![
                Segment::new(SegmentKind::Plain, "Pick one"),
                Segment::new(SegmentKind::Bullet, "red"),
                Segment::new(SegmentKind::Bullet, "blue"),
            ]
        );
    }

    #[test]
    fn leading_marker_makes_the_first_visible_piece_a_bullet() {
        // The empty piece before the marker holds position zero.
        let segments = segment_reply("* only item", Sender::Bot);
        assert_eq!(
            segments,
            vec![Segment::new(SegmentKind::Bullet, "only item")]
        );
    }

    #[test]
    fn blank_lines_are_dropped() {
        let segments = segment_reply("a\n\n   \nb", Sender::Bot);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], Segment::new(SegmentKind::Bullet, "b"));
    }

    #[test]
    fn fenced_bot_reply_is_a_single_code_segment() {
        let segments = segment_reply("```rust\nfn main() {}\n```", Sender::Bot);
        assert_eq!(
            segments,
            vec![Segment::new(SegmentKind::Code, "rust\nfn main() {}")]
        );
    }

    #[test]
    fn user_text_is_never_decorated() {
        let segments = segment_reply("**not bold**\n* not a bullet\n```", Sender::User);
        assert!(segments.iter().all(|s| s.kind == SegmentKind::Plain));
        assert_eq!(segments[0].text, "**not bold**");
    }

    #[test]
    fn empty_text_has_no_segments() {
        assert!(segment_reply("", Sender::Bot).is_empty());
        assert!(segment_reply("  \n ", Sender::User).is_empty());
    }
}
