//! Classification of WMO weather codes.
//!
//! [`Bucket::from_code`] is the only place the code ranges are spelled out.
//! Icons, background themes and quote selection all derive from it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Clear,
    Clouds,
    Fog,
    Rain,
    Snow,
    Thunder,
}

/// Background theme for a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub key: &'static str,
    pub light_background: bool,
}

impl Bucket {
    /// Total over all codes; anything unknown falls back to `Clouds`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Bucket::Clear,
            1..=3 => Bucket::Clouds,
            45 | 48 => Bucket::Fog,
            51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => Bucket::Rain,
            71 | 73 | 75 | 85 | 86 => Bucket::Snow,
            95 | 96 | 99 => Bucket::Thunder,
            _ => Bucket::Clouds,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Clear => "clear",
            Bucket::Clouds => "clouds",
            Bucket::Fog => "fog",
            Bucket::Rain => "rain",
            Bucket::Snow => "snow",
            Bucket::Thunder => "thunder",
        }
    }

    pub const fn all() -> &'static [Bucket] {
        &[
            Bucket::Clear,
            Bucket::Clouds,
            Bucket::Fog,
            Bucket::Rain,
            Bucket::Snow,
            Bucket::Thunder,
        ]
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Bucket::Clear => "weather_sunny",
            Bucket::Clouds => "weather_cloudy",
            Bucket::Fog => "weather_fog",
            Bucket::Rain => "weather_rain",
            Bucket::Snow => "weather_snow",
            Bucket::Thunder => "weather_thunder",
        }
    }

    pub fn theme(&self) -> Theme {
        let (key, light_background) = match self {
            Bucket::Clear => ("bg_weather_clear", true),
            Bucket::Clouds => ("bg_weather_clouds", true),
            Bucket::Fog => ("bg_weather_fog", true),
            Bucket::Rain => ("bg_weather_rain", false),
            Bucket::Snow => ("bg_weather_snow", true),
            Bucket::Thunder => ("bg_weather_thunder", false),
        };
        Theme { key, light_background }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human label for a code. Finer grained than the bucket (drizzle vs rain).
pub fn condition_label(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1..=3 => "Mostly cloudy",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 | 80 | 81 | 82 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 | 85 | 86 => "Snow",
        95 | 96 | 99 => "Thunderstorm",
        _ => "Varied conditions",
    }
}
