use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
};
use rpcwatch_core::{EntryKind, StatusLabel};

pub fn focused_border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

pub fn centered_rect(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_pct.min(100)) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(height_pct.min(100)) / 100) as u16;
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

pub fn entry_style(kind: EntryKind) -> Style {
    match kind {
        EntryKind::Connected => Style::default().fg(Color::Green),
        EntryKind::Closed => Style::default().fg(Color::Magenta),
        EntryKind::Outgoing => Style::default().fg(Color::Yellow),
        EntryKind::Result => Style::default().fg(Color::Cyan),
        EntryKind::RpcError | EntryKind::TransportError => Style::default().fg(Color::Red),
        EntryKind::Raw => Style::default(),
    }
}

pub fn status_style(label: StatusLabel) -> Style {
    let color = match label {
        StatusLabel::Connected => Color::Green,
        StatusLabel::Disconnected => Color::Red,
        StatusLabel::NotConnected => Color::Gray,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}
