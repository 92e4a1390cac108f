use crate::app::{App, InputMode};
use crate::ui::helpers::focused_border_style;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use rpcwatch_client::Transport;

pub fn draw_command_line<T: Transport>(f: &mut Frame, app: &App<T>, area: Rect) {
    let editing = app.input_mode == InputMode::Command;

    let block = Block::default()
        .borders(Borders::ALL)
        .title("⌨ Request: method [json params]")
        .border_style(focused_border_style(editing));

    let input = if editing || !app.input_buffer.is_empty() {
        Paragraph::new(app.input_buffer.as_str())
    } else {
        Paragraph::new("press [i] to type a request").style(Style::default().fg(Color::DarkGray))
    };

    f.render_widget(input.block(block), area);

    if editing {
        // x + 1 (border) + width of buffer, kept inside the box
        let typed = app.input_buffer.chars().count() as u16;
        let cursor_x = (area.x + 1 + typed).min(area.x + area.width.saturating_sub(2));
        f.set_cursor_position((cursor_x, area.y + 1));
    }
}
