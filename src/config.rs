use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_GPIO_BASE: &str = "/sys/class/gpio";
pub const DEFAULT_SCRIPT_DIR: &str = "/etc/gpio-scripts";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDetect {
    #[default]
    None,
    Rising,
    Falling,
    Both,
}

impl EdgeDetect {
    /// The spelling the sysfs `edge` control file expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeDetect::None => "none",
            EdgeDetect::Rising => "rising",
            EdgeDetect::Falling => "falling",
            EdgeDetect::Both => "both",
        }
    }
}

impl FromStr for EdgeDetect {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(EdgeDetect::None),
            "rising" => Ok(EdgeDetect::Rising),
            "falling" => Ok(EdgeDetect::Falling),
            "both" => Ok(EdgeDetect::Both),
            _ => Err(AppError::Config(format!("invalid edge value: {s}"))),
        }
    }
}

impl fmt::Display for EdgeDetect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// One monitored GPIO line, immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinConfig {
    pub number: u32,
    pub edge: EdgeDetect,
    pub debounce: Duration,
}

impl PinConfig {
    /// Parse a pin spec of the form `pin[:edge][:debounce_ns]`. The edge and
    /// debounce tokens may appear in either order; a token that is neither a
    /// known edge word nor a decimal nanosecond count is rejected.
    pub fn parse(spec: &str, default_edge: EdgeDetect) -> Result<Self, AppError> {
        let mut parts = spec.split(':');
        let number = parts
            .next()
            .unwrap_or_default()
            .parse::<u32>()
            .map_err(|_| AppError::PinSpec(spec.to_string()))?;

        let mut edge = None;
        let mut debounce = None;
        for token in parts {
            if let Ok(ns) = token.parse::<u64>() {
                if debounce.replace(Duration::from_nanos(ns)).is_some() {
                    return Err(AppError::PinSpec(spec.to_string()));
                }
            } else if let Ok(parsed) = token.parse::<EdgeDetect>() {
                if edge.replace(parsed).is_some() {
                    return Err(AppError::PinSpec(spec.to_string()));
                }
            } else {
                return Err(AppError::PinSpec(spec.to_string()));
            }
        }

        Ok(Self {
            number,
            edge: edge.unwrap_or(default_edge),
            debounce: debounce.unwrap_or(Duration::ZERO),
        })
    }
}

/// Everything the daemon needs to run, built once at startup.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub gpio_base: PathBuf,
    pub script_dir: PathBuf,
    pub pins: Vec<PinConfig>,
}

impl WatchConfig {
    pub fn from_specs(
        gpio_base: PathBuf,
        script_dir: PathBuf,
        specs: &[String],
        default_edge: EdgeDetect,
    ) -> Result<Self, AppError> {
        if !script_dir.is_dir() {
            return Err(AppError::Config(format!(
                "script directory {} does not exist",
                script_dir.display()
            )));
        }

        let pins = specs
            .iter()
            .map(|spec| PinConfig::parse(spec, default_edge))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            gpio_base,
            script_dir,
            pins,
        })
    }
}
