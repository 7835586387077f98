use artbox::{
    Alignment as ArtAlignment, Fill, LinearGradient, Renderer, fonts,
    integrations::ratatui::ArtBox,
};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::Paragraph,
};

use tui_dispatch::DataResource;

use super::forecast_strip::FORECAST_ROWS;
use super::location_header::HEADER_OVERHEAD;
use super::{
    Component, ERROR_ICON, ForecastStrip, ForecastStripProps, LocationHeader, LocationHeaderProps,
};
use crate::action::Action;
use crate::model::WeatherReport;
use crate::state::AppState;
use crate::theme::{Palette, local_datetime};

pub struct WeatherBody;

pub struct WeatherBodyProps<'a> {
    pub state: &'a AppState,
}

/// Fixed rows: blank, description, blank, details (2), blank, forecast, blank, recent.
const LAYOUT_FIXED: u16 = 8 + FORECAST_ROWS;

/// Text cap tiers: (header_cap, temp_cap).
/// terminus(6), miniwi(4), plain(1); HEADER_OVERHEAD is added to the header cap.
const TEXT_TIERS: [(u16, u16); 3] = [
    (6 + HEADER_OVERHEAD, 6),
    (4 + HEADER_OVERHEAD, 4),
    (1 + HEADER_OVERHEAD, 1),
];

fn font_stack() -> Vec<artbox::Font> {
    fonts::stack(&["terminus", "miniwi"])
}

/// Largest text tier that leaves room for the fixed rows.
fn text_caps(area_height: u16) -> (u16, u16) {
    TEXT_TIERS
        .iter()
        .copied()
        .find(|&(hcap, tcap)| hcap + tcap + LAYOUT_FIXED <= area_height)
        .unwrap_or(TEXT_TIERS[TEXT_TIERS.len() - 1])
}

/// Glyph for a condition label; the decorative stand-in for an icon.
pub fn condition_icon(label: &str) -> &'static str {
    match label {
        "Clear" => "\u{2600}\u{fe0f}",
        "Clouds" => "\u{2601}\u{fe0f}",
        "Mist" | "Fog" | "Haze" | "Smoke" => "\u{1f32b}\u{fe0f}",
        "Drizzle" => "\u{1f326}\u{fe0f}",
        "Rain" => "\u{1f327}\u{fe0f}",
        "Snow" => "\u{2744}\u{fe0f}",
        "Thunderstorm" => "\u{26c8}\u{fe0f}",
        _ => "\u{1f321}\u{fe0f}",
    }
}

// ============================================================================
// Component
// ============================================================================

impl Component<Action> for WeatherBody {
    type Props<'a> = WeatherBodyProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let caps = text_caps(area.height);

        match &props.state.weather {
            DataResource::Failed(error) => render_error(frame, area, error),
            DataResource::Loaded(report) => render_ready(frame, area, props.state, report, caps),
            DataResource::Loading => {
                render_placeholder(frame, area, props.state, caps, "Loading...");
            }
            DataResource::Empty => render_placeholder_hint(frame, area, props.state, caps),
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let (title, subtitle) = match state.report() {
        Some(report) => (report.current.name.clone(), subtitle_for(report)),
        None => (state.location.label(), String::new()),
    };
    let mut header = LocationHeader;
    header.render(
        frame,
        area,
        LocationHeaderProps {
            title: &title,
            subtitle,
            palette: state.background().palette(),
            is_favorite: state.is_favorite(),
            is_animating: state.loading_anim_active(),
            tick_count: state.tick_count,
        },
    );
}

/// "IN · Monday, January 1, 2024 05:30 PM" in the location's own time.
fn subtitle_for(report: &WeatherReport) -> String {
    let current = &report.current;
    let when = local_datetime(current.observed_at, current.utc_offset)
        .map(|dt| dt.format("%A, %B %-d, %Y %I:%M %p").to_string())
        .unwrap_or_default();
    if current.country.is_empty() {
        when
    } else {
        format!("{} \u{b7} {}", current.country, when)
    }
}

fn make_layout(area: Rect, header_cap: u16, temp_cap: u16) -> std::rc::Rc<[Rect]> {
    Layout::vertical([
        Constraint::Max(header_cap),
        Constraint::Length(1),
        Constraint::Max(temp_cap),
        Constraint::Length(1), // description
        Constraint::Length(1),
        Constraint::Length(2), // details
        Constraint::Length(1),
        Constraint::Length(FORECAST_ROWS),
        Constraint::Length(1),
        Constraint::Length(1), // recent searches
    ])
    .flex(Flex::Center)
    .split(area)
}

fn render_ready(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    report: &WeatherReport,
    (header_cap, temp_cap): (u16, u16),
) {
    let chunks = make_layout(area, header_cap, temp_cap);
    let current = &report.current;
    let palette = state.background().palette();

    render_header(frame, chunks[0], state);

    // Temperature
    let temp_text = state.units.format_temperature(current.temperature);
    let renderer = Renderer::new(font_stack())
        .with_plain_fallback()
        .with_alignment(ArtAlignment::Center)
        .with_fill(temperature_fill(&palette));
    frame.render_widget(ArtBox::new(&renderer, &temp_text), chunks[2]);

    // Description
    let desc = Line::from(vec![
        Span::raw(format!("{} ", condition_icon(&current.condition))),
        Span::styled(current.description.clone(), Style::default().fg(Color::Gray)),
    ])
    .centered();
    frame.render_widget(Paragraph::new(desc), chunks[3]);

    render_details(frame, chunks[5], state, report, &palette);

    let mut strip = ForecastStrip;
    strip.render(
        frame,
        chunks[7],
        ForecastStripProps {
            forecast: &report.forecast,
            units: state.units,
            utc_offset: current.utc_offset,
            accent: palette.accent,
        },
    );

    render_recent(frame, chunks[9], state);
}

fn render_details(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    report: &WeatherReport,
    palette: &Palette,
) {
    let current = &report.current;
    let units = state.units;
    let cells = [
        (units.format_temperature(current.feels_like), "Feels Like"),
        (format!("{}%", current.humidity), "Humidity"),
        (
            format!("{} {}", current.wind_speed, units.speed_suffix()),
            "Wind Speed",
        ),
        (format!("{}%", current.cloud_cover), "Cloud Cover"),
        (format!("{} hPa", current.pressure), "Pressure"),
        (
            format!("{:.1} km", f64::from(current.visibility) / 1000.0),
            "Visibility",
        ),
    ];

    let columns = Layout::horizontal(vec![Constraint::Fill(1); cells.len()]).split(area);
    for ((value, label), column) in cells.into_iter().zip(columns.iter()) {
        let text = Text::from(vec![
            Line::from(Span::styled(value, Style::default().fg(palette.accent).bold())),
            Line::from(Span::styled(label, Style::default().fg(Color::DarkGray))),
        ])
        .centered();
        frame.render_widget(Paragraph::new(text), *column);
    }
}

fn render_recent(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.recent.is_empty() {
        return;
    }
    let mut spans = vec![Span::styled("Recent: ", Style::default().fg(Color::DarkGray))];
    for (index, entry) in state.recent.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("{}", index + 1),
            Style::default().fg(Color::Cyan).bold(),
        ));
        spans.push(Span::raw(format!(" {}", entry.name)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans).centered()), area);
}

fn render_placeholder(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    (header_cap, temp_cap): (u16, u16),
    message: &str,
) {
    let chunks = make_layout(area, header_cap, temp_cap);
    render_header(frame, chunks[0], state);

    let msg = Line::from(vec![Span::styled(
        message,
        Style::default().fg(Color::DarkGray),
    )])
    .centered();
    frame.render_widget(Paragraph::new(msg), chunks[3]);
    render_recent(frame, chunks[9], state);
}

fn render_placeholder_hint(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    (header_cap, temp_cap): (u16, u16),
) {
    let chunks = make_layout(area, header_cap, temp_cap);
    render_header(frame, chunks[0], state);

    let hint = Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::DarkGray)),
        Span::styled("r", Style::default().fg(Color::Cyan).bold()),
        Span::styled(" to fetch weather", Style::default().fg(Color::DarkGray)),
    ])
    .centered();
    frame.render_widget(Paragraph::new(hint), chunks[3]);
}

fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // blank
        Constraint::Length(1), // icon
        Constraint::Length(1), // "Error"
        Constraint::Length(1), // message
        Constraint::Length(1), // blank
        Constraint::Length(1), // hint
    ])
    .flex(Flex::Center)
    .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(ERROR_ICON).centered()),
        chunks[1],
    );
    frame.render_widget(
        Paragraph::new(
            Line::from(vec![Span::styled(
                "Error",
                Style::default().fg(Color::Red).bold(),
            )])
            .centered(),
        ),
        chunks[2],
    );
    frame.render_widget(
        Paragraph::new(
            Line::from(vec![Span::styled(
                error.to_string(),
                Style::default().fg(Color::Rgb(200, 100, 100)),
            )])
            .centered(),
        ),
        chunks[3],
    );
    frame.render_widget(
        Paragraph::new(
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::DarkGray)),
                Span::styled("r", Style::default().fg(Color::Cyan).bold()),
                Span::styled(" to retry or ", Style::default().fg(Color::DarkGray)),
                Span::styled("/", Style::default().fg(Color::Cyan).bold()),
                Span::styled(" to search", Style::default().fg(Color::DarkGray)),
            ])
            .centered(),
        ),
        chunks[5],
    );
}

fn temperature_fill(palette: &Palette) -> Fill {
    let (start, end) = palette.gradient;
    Fill::Linear(LinearGradient::horizontal(start, end))
}
