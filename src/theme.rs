//! Day/night heuristic and condition-driven palettes

use artbox::{Color as ArtColor, ColorStop, Fill, LinearGradient};
use chrono::{DateTime, NaiveDateTime, Timelike};
use ratatui::style::Color;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Local hour at which the night window starts.
pub const NIGHT_STARTS: u32 = 18;
/// Local hour at which the night window ends.
pub const NIGHT_ENDS: u32 = 6;

/// Wall-clock time at a location, read from a UTC calendar so the
/// machine's own time zone never leaks in.
pub fn local_datetime(epoch: i64, utc_offset: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(epoch.saturating_add(utc_offset), 0).map(|dt| dt.naive_utc())
}

/// Coarse night check: 18:00 up to (not including) 06:00 local time.
///
/// Sunrise and sunset are not consulted.
pub fn derive_night_flag(observed_at: i64, utc_offset: i64) -> bool {
    let hour = local_datetime(observed_at, utc_offset).map_or(0, |dt| dt.hour());
    hour >= NIGHT_STARTS || hour < NIGHT_ENDS
}

/// Presentation selector for the dashboard palette
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum BackgroundKey {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Mist,
    ClearDay,
    ClearNight,
    CloudsDay,
    CloudsNight,
    /// ≤ 0°
    Freezing,
    /// ≤ 10°
    Cold,
    /// ≤ 20°
    Mild,
    /// ≤ 30°
    Warm,
    /// > 30°
    Hot,
    DefaultDay,
    DefaultNight,
}

/// Pick the palette for a condition label, falling back to temperature
/// bands and then to a plain day/night key.
pub fn select_background_key(
    condition: Option<&str>,
    temperature: Option<f64>,
    is_night: bool,
) -> BackgroundKey {
    let by_condition = condition.and_then(|label| match label {
        "Thunderstorm" => Some(BackgroundKey::Thunderstorm),
        "Drizzle" => Some(BackgroundKey::Drizzle),
        "Rain" => Some(BackgroundKey::Rain),
        "Snow" => Some(BackgroundKey::Snow),
        "Mist" => Some(BackgroundKey::Mist),
        "Clear" if is_night => Some(BackgroundKey::ClearNight),
        "Clear" => Some(BackgroundKey::ClearDay),
        "Clouds" if is_night => Some(BackgroundKey::CloudsNight),
        "Clouds" => Some(BackgroundKey::CloudsDay),
        _ => None,
    });
    if let Some(key) = by_condition {
        return key;
    }

    match temperature {
        Some(t) if t <= 0.0 => BackgroundKey::Freezing,
        Some(t) if t <= 10.0 => BackgroundKey::Cold,
        Some(t) if t <= 20.0 => BackgroundKey::Mild,
        Some(t) if t <= 30.0 => BackgroundKey::Warm,
        Some(_) => BackgroundKey::Hot,
        None if is_night => BackgroundKey::DefaultNight,
        None => BackgroundKey::DefaultDay,
    }
}

/// Colours for one background key
#[derive(Clone, Copy)]
pub struct Palette {
    pub gradient: (ArtColor, ArtColor),
    pub accent: Color,
}

/// Stops sampled across the header title
const HEADER_STOPS: usize = 8;
/// Tilt of the header gradient, in degrees
const HEADER_ANGLE: f32 = 5.0;

/// Share of the end colour at `pos` along the title. One cosine period
/// spans the title, so phases 0 and 1 draw the same picture.
fn header_blend(pos: f32, phase: f32) -> f32 {
    0.5 - 0.5 * (std::f32::consts::TAU * (pos + phase)).cos()
}

impl Palette {
    /// Gradient for the place name, rolled sideways by `phase` (0..1).
    pub fn header_fill(&self, phase: f32) -> Fill {
        let (start, end) = self.gradient;
        let stops = (0..=HEADER_STOPS)
            .map(|i| {
                let pos = i as f32 / HEADER_STOPS as f32;
                ColorStop::new(pos, start.interpolate(end, header_blend(pos, phase)))
            })
            .collect();
        Fill::Linear(LinearGradient::new(HEADER_ANGLE, stops))
    }
}

fn palette(start: (u8, u8, u8), end: (u8, u8, u8), accent: (u8, u8, u8)) -> Palette {
    Palette {
        gradient: (
            ArtColor::rgb(start.0, start.1, start.2),
            ArtColor::rgb(end.0, end.1, end.2),
        ),
        accent: Color::Rgb(accent.0, accent.1, accent.2),
    }
}

impl BackgroundKey {
    pub fn palette(self) -> Palette {
        match self {
            BackgroundKey::Thunderstorm => palette((110, 90, 160), (250, 230, 120), (200, 180, 255)),
            BackgroundKey::Drizzle => palette((140, 170, 200), (190, 210, 225), (160, 190, 215)),
            BackgroundKey::Rain => palette((70, 120, 190), (130, 170, 210), (100, 150, 220)),
            BackgroundKey::Snow => palette((200, 220, 255), (245, 250, 255), (220, 235, 255)),
            BackgroundKey::Mist => palette((150, 150, 165), (200, 200, 210), (180, 180, 190)),
            BackgroundKey::ClearDay | BackgroundKey::DefaultDay => {
                palette((255, 200, 80), (120, 200, 255), (255, 210, 100))
            }
            BackgroundKey::ClearNight | BackgroundKey::DefaultNight => {
                palette((60, 70, 150), (150, 120, 210), (170, 160, 240))
            }
            BackgroundKey::CloudsDay => palette((150, 180, 210), (220, 225, 235), (180, 200, 220)),
            BackgroundKey::CloudsNight => palette((70, 75, 110), (120, 125, 150), (140, 145, 175)),
            BackgroundKey::Freezing => palette((150, 200, 255), (200, 230, 255), (170, 215, 255)),
            BackgroundKey::Cold => palette((100, 180, 255), (150, 220, 200), (120, 200, 230)),
            BackgroundKey::Mild => palette((100, 200, 150), (255, 220, 100), (140, 210, 140)),
            BackgroundKey::Warm => palette((255, 180, 80), (255, 120, 80), (255, 170, 90)),
            BackgroundKey::Hot => palette((255, 100, 80), (255, 60, 60), (255, 90, 70)),
        }
    }
}
