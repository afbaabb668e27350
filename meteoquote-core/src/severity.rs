//! UV index and European AQI severity bands.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvLevel {
    pub fn from_index(value: f64) -> Self {
        if value < 3.0 {
            UvLevel::Low
        } else if value < 6.0 {
            UvLevel::Moderate
        } else if value < 8.0 {
            UvLevel::High
        } else if value < 11.0 {
            UvLevel::VeryHigh
        } else {
            UvLevel::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UvLevel::Low => "Low",
            UvLevel::Moderate => "Moderate",
            UvLevel::High => "High",
            UvLevel::VeryHigh => "Very high",
            UvLevel::Extreme => "Extreme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiLevel {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
    ExtremelyPoor,
}

impl AqiLevel {
    pub fn from_index(value: i64) -> Self {
        match value {
            ..=20 => AqiLevel::Good,
            21..=40 => AqiLevel::Fair,
            41..=60 => AqiLevel::Moderate,
            61..=80 => AqiLevel::Poor,
            81..=100 => AqiLevel::VeryPoor,
            _ => AqiLevel::ExtremelyPoor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Fair => "Fair",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::Poor => "Poor",
            AqiLevel::VeryPoor => "Very poor",
            AqiLevel::ExtremelyPoor => "Extremely poor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uv_band_edges() {
        assert_eq!(UvLevel::from_index(0.0), UvLevel::Low);
        assert_eq!(UvLevel::from_index(2.99), UvLevel::Low);
        assert_eq!(UvLevel::from_index(3.0), UvLevel::Moderate);
        assert_eq!(UvLevel::from_index(6.0), UvLevel::High);
        assert_eq!(UvLevel::from_index(8.0), UvLevel::VeryHigh);
        assert_eq!(UvLevel::from_index(11.0), UvLevel::Extreme);
    }

    #[test]
    fn aqi_band_edges_are_inclusive() {
        assert_eq!(AqiLevel::from_index(0), AqiLevel::Good);
        assert_eq!(AqiLevel::from_index(20), AqiLevel::Good);
        assert_eq!(AqiLevel::from_index(21), AqiLevel::Fair);
        assert_eq!(AqiLevel::from_index(60), AqiLevel::Moderate);
        assert_eq!(AqiLevel::from_index(80), AqiLevel::Poor);
        assert_eq!(AqiLevel::from_index(100), AqiLevel::VeryPoor);
        assert_eq!(AqiLevel::from_index(101), AqiLevel::ExtremelyPoor);
        assert_eq!(AqiLevel::ExtremelyPoor.label(), "Extremely poor");
    }
}
