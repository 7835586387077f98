use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Layout};
use ratatui::prelude::{Frame, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::{Component, WeatherBody, WeatherBodyProps};
use crate::action::Action;
use crate::history::MAX_RECENT_SEARCHES;
use crate::state::AppState;

pub const ERROR_ICON: &str = "\u{26a0}\u{fe0f}";

/// Props for WeatherDisplay - read-only view of state
pub struct WeatherDisplayProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// The main weather display component
#[derive(Default)]
pub struct WeatherDisplay;

impl Component<Action> for WeatherDisplay {
    type Props<'a> = WeatherDisplayProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Char('r') | KeyCode::F(5) => Some(Action::WeatherFetch),
                KeyCode::Char('/') => Some(Action::SearchOpen),
                KeyCode::Char('l') => Some(Action::LocateRequest),
                KeyCode::Char('f') => Some(Action::FavoriteToggle),
                KeyCode::Char('u') => Some(Action::UiToggleUnits),
                KeyCode::Char('t') => Some(Action::UiToggleTheme),
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    (index < MAX_RECENT_SEARCHES).then_some(Action::WeatherFetchRecent(index))
                }
                KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: WeatherDisplayProps<'_>) {
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Notice
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        let mut body = WeatherBody;
        body.render(frame, chunks[0], WeatherBodyProps { state: props.state });

        if let Some(notice) = &props.state.notice {
            let line = Line::from(vec![
                Span::raw(format!("{ERROR_ICON} ")),
                Span::styled(notice.clone(), Style::default().fg(Color::Yellow)),
            ])
            .centered();
            frame.render_widget(Paragraph::new(line), chunks[1]);
        }

        let status = if props.state.locating {
            "Locating..."
        } else if props.state.is_refreshing {
            "Refreshing..."
        } else {
            ""
        };
        let status_items = [StatusBarItem::span(Span::styled(
            status,
            Style::default().fg(Color::Cyan),
        ))];

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[2],
            StatusBarProps {
                left: StatusBarSection::items(&status_items),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("r", "refresh"),
                    StatusBarHint::new("/", "search"),
                    StatusBarHint::new("l", "locate"),
                    StatusBarHint::new("f", "favorite"),
                    StatusBarHint::new("u", "units"),
                    StatusBarHint::new("t", "theme"),
                    StatusBarHint::new("q", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentConditions, ForecastSeries, WeatherReport};
    use tui_dispatch::DataResource;
    use tui_dispatch::testing::*;

    fn report() -> WeatherReport {
        WeatherReport {
            current: CurrentConditions {
                name: "London".into(),
                country: "GB".into(),
                temperature: 12.4,
                feels_like: 11.0,
                humidity: 81,
                pressure: 1012.0,
                wind_speed: 4.1,
                cloud_cover: 75,
                visibility: 10000,
                condition: "Clouds".into(),
                description: "broken clouds".into(),
                sunrise: 1_704_095_000,
                sunset: 1_704_123_000,
                observed_at: 1_704_110_400,
                utc_offset: 0,
            },
            forecast: ForecastSeries::default(),
        }
    }

    fn actions_for(code: &str, state: &AppState) -> Vec<Action> {
        let mut component = WeatherDisplay;
        let props = WeatherDisplayProps {
            state,
            is_focused: true,
        };
        component
            .handle_event(&EventKind::Key(key(code)), props)
            .into_iter()
            .collect()
    }

    #[test]
    fn test_handle_event_refresh() {
        let state = AppState::default();
        let actions = actions_for("r", &state);
        actions.assert_count(1);
        actions.assert_first(Action::WeatherFetch);
    }

    #[test]
    fn test_handle_event_quit() {
        let state = AppState::default();
        actions_for("q", &state).assert_first(Action::Quit);
    }

    #[test]
    fn test_handle_event_feature_keys() {
        let state = AppState::default();
        actions_for("l", &state).assert_first(Action::LocateRequest);
        actions_for("f", &state).assert_first(Action::FavoriteToggle);
        actions_for("t", &state).assert_first(Action::UiToggleTheme);
    }

    #[test]
    fn test_handle_event_digits_pick_recent() {
        let state = AppState::default();
        actions_for("1", &state).assert_first(Action::WeatherFetchRecent(0));
        actions_for("5", &state).assert_first(Action::WeatherFetchRecent(4));
        actions_for("6", &state).assert_empty();
    }

    #[test]
    fn test_handle_event_unfocused_ignores() {
        let mut component = WeatherDisplay;
        let state = AppState::default();
        let props = WeatherDisplayProps {
            state: &state,
            is_focused: false,
        };

        let actions: Vec<_> = component
            .handle_event(&EventKind::Key(key("r")), props)
            .into_iter()
            .collect();
        actions.assert_empty();
    }

    #[test]
    fn test_render_loading() {
        let mut render = RenderHarness::new(80, 30);
        let mut component = WeatherDisplay;

        let state = AppState {
            weather: DataResource::Loading,
            ..Default::default()
        };

        let output = render.render_to_string_plain(|frame| {
            let props = WeatherDisplayProps {
                state: &state,
                is_focused: true,
            };
            component.render(frame, frame.area(), props);
        });

        assert!(output.contains("Loading..."));
    }

    #[test]
    fn test_render_weather() {
        let mut render = RenderHarness::new(100, 30);
        let mut component = WeatherDisplay;

        let state = AppState {
            weather: DataResource::Loaded(report()),
            ..Default::default()
        };

        let output = render.render_to_string_plain(|frame| {
            let props = WeatherDisplayProps {
                state: &state,
                is_focused: true,
            };
            component.render(frame, frame.area(), props);
        });

        assert!(output.contains("broken clouds"));
        assert!(output.contains("Humidity"));
        assert!(output.contains("81%"));
    }

    #[test]
    fn test_render_notice() {
        let mut render = RenderHarness::new(100, 30);
        let mut component = WeatherDisplay;

        let state = AppState {
            notice: Some("Geolocation is not available on this system".into()),
            ..Default::default()
        };

        let output = render.render_to_string_plain(|frame| {
            let props = WeatherDisplayProps {
                state: &state,
                is_focused: true,
            };
            component.render(frame, frame.area(), props);
        });

        assert!(output.contains("Geolocation is not available"));
    }
}
