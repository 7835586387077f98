use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::Paragraph,
};

use super::Component;
use crate::action::Action;
use crate::model::{ForecastSeries, UnitSystem};
use crate::theme::local_datetime;

/// One column per day: weekday, temperature, min/max, condition.
pub struct ForecastStrip;

pub struct ForecastStripProps<'a> {
    pub forecast: &'a ForecastSeries,
    pub units: UnitSystem,
    /// Offset of the forecast location, for weekday names
    pub utc_offset: i64,
    pub accent: Color,
}

/// Rows used by the strip.
pub const FORECAST_ROWS: u16 = 4;

impl Component<Action> for ForecastStrip {
    type Props<'a> = ForecastStripProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let days: Vec<_> = props.forecast.daily().collect();
        if days.is_empty() {
            return;
        }

        let columns = Layout::horizontal(vec![Constraint::Fill(1); days.len()]).split(area);
        for (point, column) in days.into_iter().zip(columns.iter()) {
            let weekday = local_datetime(point.time, props.utc_offset)
                .map(|dt| dt.format("%a").to_string())
                .unwrap_or_default();

            let text = Text::from(vec![
                Line::from(Span::styled(weekday, Style::default().fg(Color::DarkGray))),
                Line::from(Span::styled(
                    props.units.format_temperature(point.temperature),
                    Style::default().fg(props.accent).bold(),
                )),
                Line::from(format!(
                    "{}° / {}°",
                    point.temp_min.round() + 0.0,
                    point.temp_max.round() + 0.0
                )),
                Line::from(Span::styled(
                    point.condition.clone(),
                    Style::default().fg(Color::Gray),
                )),
            ])
            .centered();

            frame.render_widget(Paragraph::new(text), *column);
        }
    }
}
