//! Weatherdeck - terminal weather dashboard

use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tracing_subscriber::EnvFilter;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext,
};
use tui_dispatch_components::centered_rect;
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};
use weatherdeck::action::Action;
use weatherdeck::api::{ClientConfig, DEFAULT_BASE_URL, WeatherClient};
use weatherdeck::components::{
    Component, SearchOverlay, SearchOverlayProps, WeatherDisplay, WeatherDisplayProps,
};
use weatherdeck::effect::Effect;
use weatherdeck::favorites::{FavoriteSet, FavoritesStore};
use weatherdeck::geolocation::{
    DEFAULT_IP_LOOKUP_URL, GeolocationMode, GeolocationProvider, provider_for,
};
use weatherdeck::model::{Coordinates, LocationQuery, UnitSystem};
use weatherdeck::reducer::reducer;
use weatherdeck::state::{AppState, DEFAULT_CITY, LOADING_ANIM_TICK_MS};

/// Weatherdeck - current conditions and a five-day outlook in the terminal
#[derive(Parser, Debug)]
#[command(name = "weatherdeck")]
#[command(about = "Terminal weather dashboard backed by OpenWeather")]
struct Args {
    /// Place to show on startup
    #[arg(long, short, default_value = DEFAULT_CITY)]
    city: String,

    /// Start at these coordinates instead of `--city` (needs `--lon`)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    #[arg(long, value_enum, default_value = "metric")]
    units: UnitSystem,

    /// OpenWeather API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "OPENWEATHER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// How `l` finds the current position
    #[arg(long, value_enum, default_value = "off")]
    geolocation: GeolocationMode,

    #[arg(long, env = "WEATHERDECK_IP_LOOKUP_URL", default_value = DEFAULT_IP_LOOKUP_URL)]
    ip_lookup_url: String,

    /// Refresh interval in seconds (minimum 1)
    #[arg(long, short, default_value = "600", value_parser = clap::value_parser!(u64).range(1..))]
    refresh_interval: u64,

    /// Directory for favorites and the log file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log file (defaults to weatherdeck.log next to the favorites)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

/// Collaborators shared by the effect handlers
struct RuntimeConfig {
    client: WeatherClient,
    geolocation: Arc<dyn GeolocationProvider>,
    favorites: FavoritesStore,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum WeatherComponentId {
    Display,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum WeatherContext {
    Main,
    Search,
}

impl EventRoutingState<WeatherComponentId, WeatherContext> for AppState {
    fn focused(&self) -> Option<WeatherComponentId> {
        if self.search_mode {
            Some(WeatherComponentId::Search)
        } else {
            Some(WeatherComponentId::Display)
        }
    }

    fn modal(&self) -> Option<WeatherComponentId> {
        if self.search_mode {
            Some(WeatherComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: WeatherComponentId) -> WeatherContext {
        match id {
            WeatherComponentId::Display => WeatherContext::Main,
            WeatherComponentId::Search => WeatherContext::Search,
        }
    }

    fn default_context(&self) -> WeatherContext {
        WeatherContext::Main
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    let favorites_store = FavoritesStore::in_dir(args.data_dir.as_deref());
    let log_path = args.log_file.clone().unwrap_or_else(|| {
        favorites_store
            .path()
            .parent()
            .unwrap_or(Path::new("."))
            .join("weatherdeck.log")
    });
    init_logging(&log_path)?;

    let start_coords = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("coordinates out of range: {lat}, {lon}"),
            )
        })?),
        _ => None,
    };
    let start_location = match start_coords {
        Some(coords) => LocationQuery::Coordinates(coords),
        None => LocationQuery::name(&args.city).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "--city must not be blank")
        })?,
    };

    let client = WeatherClient::new(
        ClientConfig::new(args.api_key.clone()).with_base_url(args.base_url.clone()),
    )
    .map_err(io::Error::other)?;
    let geolocation: Arc<dyn GeolocationProvider> = Arc::from(provider_for(
        args.geolocation,
        start_coords,
        &args.ip_lookup_url,
    ));

    let favorites = match favorites_store.load().await {
        Ok(favorites) => favorites,
        Err(e) => {
            tracing::warn!(path = %favorites_store.path().display(), error = %e, "could not read favorites");
            FavoriteSet::default()
        }
    };

    tracing::info!(
        location = %start_location.label(),
        units = args.units.as_param(),
        favorites = favorites.len(),
        "starting"
    );

    let debug = DebugSession::new(args.debug);

    // Export JSON schemas if requested
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let units = args.units;
    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(
                AppState::new(start_location, units).with_favorites(favorites),
            )
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let config = RuntimeConfig {
        client,
        geolocation,
        favorites: favorites_store,
    };

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        &debug,
        store,
        args.refresh_interval,
        replay_actions,
        config,
    )
    .await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    tracing::info!("exiting");
    Ok(())
}

/// Log to a file; the terminal belongs to the UI. `RUST_LOG` overrides `info`.
fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(io::Error::other)
}

struct WeatherUi {
    display: WeatherDisplay,
    search: SearchOverlay,
}

impl WeatherUi {
    fn new() -> Self {
        Self {
            display: WeatherDisplay,
            search: SearchOverlay::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<WeatherComponentId>,
    ) {
        event_ctx.set_component_area(WeatherComponentId::Display, area);

        let props = WeatherDisplayProps {
            state,
            is_focused: render_ctx.is_focused() && !state.search_mode,
        };
        self.display.render(frame, area, props);

        self.search.set_open(state.search_mode);
        if state.search_mode {
            let modal_area = centered_rect(60, 12, area);
            event_ctx.set_component_area(WeatherComponentId::Search, modal_area);
            let suggestions = suggestion_names(state);
            let props = SearchOverlayProps {
                query: &state.search_query,
                suggestions: &suggestions,
                selected: state.search_selected,
                is_focused: render_ctx.is_focused(),
                on_query_change: Action::SearchQueryChange,
                on_query_submit: Action::SearchQuerySubmit,
                on_select: Action::SearchSelect,
            };
            self.search.render(frame, area, props);
        } else {
            event_ctx
                .component_areas
                .remove(&WeatherComponentId::Search);
        }
    }

    fn handle_display_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = WeatherDisplayProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self
            .display
            .handle_event(event, props)
            .into_iter()
            .collect();
        if actions.is_empty() {
            HandlerResponse::ignored()
        } else {
            HandlerResponse {
                actions,
                consumed: true,
                needs_render: false,
            }
        }
    }

    fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        self.search.set_open(state.search_mode);
        let suggestions = suggestion_names(state);
        let props = SearchOverlayProps {
            query: &state.search_query,
            suggestions: &suggestions,
            selected: state.search_selected,
            is_focused: true,
            on_query_change: Action::SearchQueryChange,
            on_query_submit: Action::SearchQuerySubmit,
            on_select: Action::SearchSelect,
        };
        let actions: Vec<_> = self.search.handle_event(event, props).into_iter().collect();
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn suggestion_names(state: &AppState) -> Vec<String> {
    state
        .search_suggestions()
        .into_iter()
        .map(|entry| entry.name.clone())
        .collect()
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    refresh_interval: u64,
    replay_actions: Vec<ReplayItem<Action>>,
    config: RuntimeConfig,
) -> io::Result<DebugRunOutput<AppState>> {
    let config = Arc::new(config);
    let ui = Rc::new(RefCell::new(WeatherUi::new()));
    let mut bus: EventBus<AppState, Action, WeatherComponentId, WeatherContext> = EventBus::new();
    let keybindings: Keybindings<WeatherContext> = Keybindings::new();

    let ui_display = Rc::clone(&ui);
    bus.register(WeatherComponentId::Display, move |event, state| {
        ui_display
            .borrow_mut()
            .handle_display_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(WeatherComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    // Re-render on terminal resize (no action needed, just redraw)
    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(_, _) => HandlerResponse::ignored().with_render(),
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::WeatherFetch),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(LOADING_ANIM_TICK_MS),
                    || Action::Tick,
                );

                runtime.subscriptions().interval(
                    "refresh",
                    Duration::from_secs(refresh_interval),
                    || Action::WeatherFetch,
                );
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, config.clone()),
        )
        .await
}

/// Handle effects by spawning tasks
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, config: Arc<RuntimeConfig>) {
    match effect {
        // Same key: a newer fetch cancels the one in flight
        Effect::FetchWeather {
            request_id,
            query,
            units,
        } => {
            ctx.tasks().spawn("weather", async move {
                match config.client.fetch_weather(&query, units).await {
                    Ok(report) => Action::WeatherDidLoad {
                        request_id,
                        query,
                        report: Box::new(report),
                    },
                    Err(e) => {
                        tracing::warn!(request_id, query = %query.label(), error = %e, "weather fetch failed");
                        Action::WeatherDidError {
                            request_id,
                            message: e.user_message().to_string(),
                        }
                    }
                }
            });
        }
        Effect::Locate => {
            ctx.tasks().spawn("locate", async move {
                match config.geolocation.locate().await {
                    Ok(coords) => Action::LocateDidResolve(coords),
                    Err(e) => {
                        tracing::info!(error = %e, "geolocation unavailable");
                        Action::LocateDidError(e.to_string())
                    }
                }
            });
        }
        Effect::SaveFavorites { favorites } => {
            ctx.tasks().spawn("favorites", async move {
                match config.favorites.save(&favorites).await {
                    Ok(()) => Action::FavoriteDidSave,
                    Err(e) => {
                        tracing::warn!(error = %e, "could not save favorites");
                        Action::FavoriteDidError(format!("Could not save favorites: {e}"))
                    }
                }
            });
        }
    }
}
