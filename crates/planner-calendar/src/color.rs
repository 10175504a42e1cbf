//! Bar backgrounds for events merged from several calendars.

use std::fmt;

use serde::Serialize;

use crate::types::AllDayEvent;

/// One segment of a left-to-right gradient, bounded in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    pub color: String,
    pub from: f64,
    pub to: f64,
}

/// How a bar's background should be painted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColorSpec {
    Solid { color: String },
    Gradient { stops: Vec<GradientStop> },
}

impl ColorSpec {
    /// CSS `background` value, e.g. `linear-gradient(90deg, #fff 0% 50%, #000 50% 100%)`.
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSpec::Solid { color } => f.write_str(color),
            ColorSpec::Gradient { stops } => {
                f.write_str("linear-gradient(90deg")?;
                for stop in stops {
                    write!(f, ", {} {}% {}%", stop.color, stop.from, stop.to)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Percent position of segment boundary `i` out of `n`, to one decimal.
fn boundary(i: usize, n: usize) -> f64 {
    (i as f64 / n as f64 * 1000.0).round() / 10.0
}

/// Flat color for single-source events, equal-width gradient segments in
/// `sources` order otherwise.
pub fn bar_background(event: &AllDayEvent) -> ColorSpec {
    let n = event.sources.len();
    if n <= 1 {
        let color = event
            .sources
            .first()
            .map_or_else(|| event.color.bg.clone(), |s| s.color.bg.clone());
        return ColorSpec::Solid { color };
    }

    let stops = event
        .sources
        .iter()
        .enumerate()
        .map(|(i, source)| GradientStop {
            color: source.color.bg.clone(),
            from: boundary(i, n),
            to: boundary(i + 1, n),
        })
        .collect();

    ColorSpec::Gradient { stops }
}
