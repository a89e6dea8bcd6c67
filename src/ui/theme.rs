use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub bot_prefix_style: Style,
    pub bot_text_style: Style,
    pub bold_text_style: Style,
    pub bullet_style: Style,
    pub code_style: Style,

    // Chrome
    pub title_style: Style,
    pub typing_indicator_style: Style,
    pub status_style: Style,
    pub input_border_style: Style,
    pub input_text_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            bot_prefix_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
            bot_text_style: Style::default().fg(Color::White),
            bold_text_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            bullet_style: Style::default().fg(Color::Yellow),
            code_style: Style::default().fg(Color::Green),

            title_style: Style::default().fg(Color::Gray),
            typing_indicator_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            status_style: Style::default().fg(Color::Yellow),
            input_border_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(Color::Yellow),
        }
    }

    /// Every style empty; used when output should carry no color.
    pub fn monochrome() -> Self {
        let plain = Style::default();
        Theme {
            user_prefix_style: plain,
            user_text_style: plain,
            bot_prefix_style: plain,
            bot_text_style: plain,
            bold_text_style: plain,
            bullet_style: plain,
            code_style: plain,
            title_style: plain,
            typing_indicator_style: plain,
            status_style: plain,
            input_border_style: plain,
            input_text_style: plain,
        }
    }
}
