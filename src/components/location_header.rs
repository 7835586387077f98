use artbox::{Alignment as ArtAlignment, Renderer, fonts, integrations::ratatui::ArtBox};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::Component;
use crate::action::Action;
use crate::state::LOADING_ANIM_CYCLE_TICKS;
use crate::theme::Palette;

pub struct LocationHeader;

pub struct LocationHeaderProps<'a> {
    /// Place name drawn in large letters
    pub title: &'a str,
    /// Country, local date and time, or the query while nothing is loaded
    pub subtitle: String,
    pub palette: Palette,
    pub is_favorite: bool,
    pub is_animating: bool,
    pub tick_count: u32,
}

/// Overhead inside the header area: 1 spacer + 1 subtitle line.
/// The FIGlet place name gets `area.height - HEADER_OVERHEAD`.
pub const HEADER_OVERHEAD: u16 = 2;

pub const FAVORITE_ICON: &str = "\u{2605}";

/// Where the rolling title gradient is within its cycle.
fn sweep_phase(tick_count: u32) -> f32 {
    let steps = LOADING_ANIM_CYCLE_TICKS.max(1);
    (tick_count % steps) as f32 / steps as f32
}

impl Component<Action> for LocationHeader {
    type Props<'a> = LocationHeaderProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([
            Constraint::Fill(1),   // FIGlet place name
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Subtitle
        ])
        .split(area);

        let phase = if props.is_animating {
            sweep_phase(props.tick_count)
        } else {
            0.0
        };
        let fill = props.palette.header_fill(phase);

        let renderer = Renderer::new(fonts::stack(&["terminus", "miniwi"]))
            .with_plain_fallback()
            .with_alignment(ArtAlignment::Center)
            .with_fill(fill);

        frame.render_widget(ArtBox::new(&renderer, props.title), chunks[0]);

        let mut spans = Vec::with_capacity(2);
        if props.is_favorite {
            spans.push(Span::styled(
                format!("{FAVORITE_ICON} "),
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::styled(
            props.subtitle,
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans).centered()), chunks[2]);
    }
}
