use crate::app::App;
use crate::ui::helpers::{entry_style, focused_border_style, format_time};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};
use rpcwatch_client::Transport;

pub fn draw_transcript<T: Transport>(f: &mut Frame, app: &App<T>, area: Rect) {
    let transcript = app.conn.transcript();

    let items: Vec<ListItem> = transcript
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", format_time(entry.at)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(entry.line(), entry_style(entry.kind)),
            ]))
        })
        .collect();

    let follow = if app.follow_tail { " • following" } else { "" };
    let title = format!("📜 Transcript ({} entries{})", transcript.len(), follow);

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focused_border_style(app.input_mode == crate::app::InputMode::Normal)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("→ ");

    let mut state = ListState::default();
    if !transcript.is_empty() {
        state.select(Some(app.selected_entry_index));
    }

    f.render_stateful_widget(list, area, &mut state);
}
