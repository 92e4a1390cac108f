pub mod helpers;
mod input;
mod transcript;

use crate::app::{App, InputMode};
use helpers::{centered_rect, status_style};
use input::draw_command_line;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use rpcwatch_client::Transport;
use transcript::draw_transcript;

pub fn draw<T: Transport>(f: &mut Frame, app: &App<T>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_title_bar(f, app, chunks[0]);
    draw_transcript(f, app, chunks[1]);
    draw_command_line(f, app, chunks[2]);
    draw_status_bar(f, app, chunks[3]);

    if app.show_help {
        draw_help_modal(f);
    }
}

fn draw_title_bar<T: Transport>(f: &mut Frame, app: &App<T>, area: Rect) {
    let label = app.conn.status_label();
    let endpoint = app.conn.endpoint().unwrap_or(&app.config.endpoint);

    let spans = vec![
        Span::styled(
            "📡 rpcwatch ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("[{}] │ ", endpoint)),
        Span::styled(label.as_str(), status_style(label)),
        Span::raw(format!(" │ next id {} │ [?]Help [q]Quit", app.conn.next_request_id())),
    ];

    let title = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(title, area);
}

fn draw_status_bar<T: Transport>(f: &mut Frame, app: &App<T>, area: Rect) {
    let content = if !app.status_message.is_empty() {
        Span::styled(
            format!(" {} ", app.status_message),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )
    } else {
        match app.input_mode {
            InputMode::Normal => Span::raw(format!(
                "[c]Connect • [d]Disconnect • [s]Send {} • [i]Request • [j/k]Scroll • [G]Follow",
                app.config.default_method
            )),
            InputMode::Command => Span::raw("[Enter] Send  [Esc] Cancel"),
        }
    };

    let state = Span::styled(
        format!(" {:?} ", app.conn.state()),
        Style::default().fg(Color::Cyan),
    );

    let status = Paragraph::new(Line::from(vec![state, Span::raw(" │ "), content]))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(status, area);
}

fn draw_help_modal(f: &mut Frame) {
    let modal_area = centered_rect(f.area(), 70, 70);

    f.render_widget(Clear, modal_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            "  📡 rpcwatch - Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading("  CONNECTION"),
        Line::from("    [c]          Connect to the configured endpoint"),
        Line::from("    [d]          Disconnect"),
        Line::from(""),
        heading("  REQUESTS"),
        Line::from("    [s]          Send the default method"),
        Line::from("    [i] / [:]    Type a request: method [json params]"),
        Line::from("    [Enter]      Send typed request"),
        Line::from("    [Esc]        Cancel typing"),
        Line::from(""),
        heading("  TRANSCRIPT"),
        Line::from("    [↑↓] / [j/k] Scroll"),
        Line::from("    [g] / [G]    Jump to Top / Bottom (bottom follows new entries)"),
        Line::from(""),
        Line::from("    [?]          Toggle this Help"),
        Line::from("    [q]          Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "  Press any key to close this help",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("❓ Help")
                .border_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .style(Style::default().bg(Color::Black));

    f.render_widget(help_paragraph, modal_area);
}
