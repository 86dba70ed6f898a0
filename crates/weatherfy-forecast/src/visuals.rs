//! Visual lookup data for forecasts.
//!
//! Nothing here feeds back into classification: the UI layer uses these
//! tables to pick copy, animations and colours for a reading.

use serde::Serialize;

use crate::generator::GeneratorBounds;
use crate::types::{DailyForecast, Weather};

const GRADIENT_LIGHTEN: f32 = 0.3;
const CONTENT_SHIFT: f32 = 0.3;

/// Display copy and animation asset for a weather variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherResources {
    pub description: &'static str,
    pub animation: &'static str,
}

/// Light or dark foreground to draw over a background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTone {
    Dark,
    Light,
}

pub fn resources(weather: Weather) -> WeatherResources {
    let (description, animation) = match weather {
        Weather::Sunny => ("Sunny", "sunny.json"),
        Weather::Cloudy => ("Cloudy", "cloudy.json"),
        Weather::Rainy => ("Rainy", "rainy.json"),
        Weather::Thunderstorm => ("Thunderstorm", "thunderstorm.json"),
        Weather::Windy => ("Windy", "windy.json"),
    };
    WeatherResources {
        description,
        animation,
    }
}

/// Fixed background gradient and content tone for each variant
pub fn background(weather: Weather) -> (Gradient, ContentTone) {
    let (top, bottom, tone) = match weather {
        Weather::Sunny => (0xF2994A, 0xF2C94C, ContentTone::Dark),
        Weather::Cloudy => (0x8E9EAB, 0xEEF2F3, ContentTone::Dark),
        Weather::Rainy => (0x457FCA, 0x5691C8, ContentTone::Light),
        Weather::Thunderstorm => (0x1E3C72, 0x2A5298, ContentTone::Light),
        Weather::Windy => (0x11998E, 0x38EF7D, ContentTone::Dark),
    };
    (
        Gradient {
            top: Rgb::from_hex(top),
            bottom: Rgb::from_hex(bottom),
        },
        tone,
    )
}

/// RGB colour with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Rgb {
    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        Self {
            red: red.clamp(0.0, 1.0),
            green: green.clamp(0.0, 1.0),
            blue: blue.clamp(0.0, 1.0),
        }
    }

    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn to_hex(self) -> String {
        let channel = |v: f32| (v * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}",
            channel(self.red),
            channel(self.green),
            channel(self.blue)
        )
    }

    pub fn lightness(self) -> f32 {
        self.to_hsl().2
    }

    pub fn is_light(self) -> bool {
        self.lightness() >= 0.5
    }

    pub fn lighten(self, amount: f32) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, (l + amount).clamp(0.0, 1.0))
    }

    pub fn darken(self, amount: f32) -> Self {
        self.lighten(-amount)
    }

    fn to_hsl(self) -> (f32, f32, f32) {
        let Rgb { red, green, blue } = self;
        let max = red.max(green).max(blue);
        let min = red.min(green).min(blue);
        let lightness = (max + min) / 2.0;

        if max == min {
            return (0.0, 0.0, lightness);
        }

        let d = max - min;
        let saturation = if lightness > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let hue = if max == red {
            (green - blue) / d + if green < blue { 6.0 } else { 0.0 }
        } else if max == green {
            (blue - red) / d + 2.0
        } else {
            (red - green) / d + 4.0
        };

        (hue / 6.0, saturation, lightness)
    }

    fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        if s == 0.0 {
            return Self::new(l, l, l);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self::new(
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Vertical two-stop gradient
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gradient {
    pub top: Rgb,
    pub bottom: Rgb,
}

impl Gradient {
    /// Base colour fading into a lighter shade of itself.
    pub fn from_base(base: Rgb) -> Self {
        Self {
            top: base,
            bottom: base.lighten(GRADIENT_LIGHTEN),
        }
    }
}

/// Everything the UI needs to paint a day card
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayVisuals {
    pub color: Rgb,
    pub gradient: Gradient,
    pub content_color: Rgb,
    /// Fixed backdrop for the day's weather, independent of the reading
    pub background: Gradient,
    pub content_tone: ContentTone,
    pub resources: WeatherResources,
}

impl DayVisuals {
    pub fn for_day(day: &DailyForecast, bounds: &GeneratorBounds) -> Self {
        let color = feel_color(
            day.temperature,
            day.wind_speed,
            day.precipitation_probability,
            bounds,
        );
        let (backdrop, content_tone) = background(day.weather);
        Self {
            color,
            gradient: Gradient::from_base(color),
            content_color: content_color(color),
            background: backdrop,
            content_tone,
            resources: resources(day.weather),
        }
    }
}

/// Colour "feel" of a reading: heat drives red, wind green, rain blue.
pub fn feel_color(
    temperature: i32,
    wind_speed: i32,
    precipitation: i32,
    bounds: &GeneratorBounds,
) -> Rgb {
    let ratio = |value: i32, max: i32| {
        if max <= 0 {
            0.0
        } else {
            value as f32 / max as f32
        }
    };
    Rgb::new(
        ratio(temperature, bounds.max_temperature),
        ratio(wind_speed, bounds.max_wind_speed),
        ratio(precipitation, bounds.max_precipitation),
    )
}

/// Foreground colour that stays readable on `base`.
pub fn content_color(base: Rgb) -> Rgb {
    if base.is_light() {
        base.darken(CONTENT_SHIFT)
    } else {
        base.lighten(CONTENT_SHIFT)
    }
}
