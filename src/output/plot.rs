//! PNG overlay of the exact solution and the three schemes.

use std::error::Error;
use std::f64::consts::PI;
use std::path::Path;

use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::combinators::WithKeyPoints;
use plotters::prelude::*;

use crate::error::{FctError, FctResult};
use crate::fv_core::initial::TestCase;
use crate::time_integrator::solver::ComparisonResult;

/// Unit in which x tick labels are written.
#[derive(Debug, Clone, Copy)]
pub enum TickUnit {
    Metres,
    /// Multiples of the grid spacing.
    GridSpacing(f64),
    Pi,
}

impl TickUnit {
    fn step(&self) -> f64 {
        match *self {
            TickUnit::Metres => 0.2,
            TickUnit::GridSpacing(dx) => 5.0 * dx,
            TickUnit::Pi => PI,
        }
    }

    /// Tick positions at whole multiples of the unit's step inside `x_range`.
    fn key_points(&self, (x0, x1): (f64, f64)) -> Vec<f64> {
        let step = self.step();
        let first = (x0 / step - 1e-9).ceil() as i64;
        let last = (x1 / step + 1e-9).floor() as i64;
        (first..=last).map(|k| k as f64 * step).collect()
    }

    fn label(&self, x: f64) -> String {
        if x.abs() < 1e-12 {
            return "0".to_string();
        }
        match *self {
            TickUnit::Metres => format!("{x:.1}"),
            TickUnit::GridSpacing(dx) => format!("{:.1}Δx", x / dx),
            TickUnit::Pi => {
                let k = x / PI;
                if (k - 1.0).abs() < 1e-9 {
                    "π".to_string()
                } else if (k - k.round()).abs() < 1e-9 {
                    format!("{}π", k.round())
                } else {
                    format!("{k:.1}π")
                }
            }
        }
    }
}

#[derive(Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    /// Visible x window.
    pub x_range: (f64, f64),
    pub ticks: TickUnit,
    pub line_width: u32,
}

impl PlotConfig {
    /// Window, title and tick units used for each test case.
    pub fn for_case(case: TestCase, dx: f64) -> Self {
        let (title, x_range, ticks) = match case {
            TestCase::TravellingJump => (
                "Travelling Jump Discontinuity".to_string(),
                (0.0, 1.0),
                TickUnit::Metres,
            ),
            TestCase::SineSum => (
                "Sum of 7.5Δx and 10.0Δx Sine Waves".to_string(),
                (0.0, 30.0 * dx),
                TickUnit::GridSpacing(dx),
            ),
            TestCase::SinePower => ("Sine Power".to_string(), (0.0, 4.0 * PI), TickUnit::Pi),
        };
        PlotConfig {
            width: 1600,
            height: 1200,
            title,
            xlabel: "X (m)".to_string(),
            ylabel: "U (m s^-1)".to_string(),
            x_range,
            ticks,
            line_width: 2,
        }
    }
}

pub fn file_name(case: TestCase) -> &'static str {
    match case {
        TestCase::TravellingJump => "TravellingJump.png",
        TestCase::SineSum => "SineSum.png",
        TestCase::SinePower => "SinePower.png",
    }
}

fn windowed(x: &[f64], u: &[f64], (x0, x1): (f64, f64)) -> Vec<(f64, f64)> {
    x.iter()
        .zip(u.iter())
        .filter(|(&x, _)| x >= x0 && x <= x1)
        .map(|(&x, &u)| (x, u))
        .collect()
}

fn draw_on_area<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    result: &ComparisonResult,
    config: &PlotConfig,
) -> Result<(), Box<dyn Error>>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    let series = [
        ("Exact", result.exact.as_slice(), BLUE),
        ("Upstream", result.upstream.as_slice(), RGBColor(178, 34, 34)),
        ("Lax-Wendroff", result.lax_wendroff.as_slice(), RGBColor(75, 0, 130)),
        ("FCT", result.fct.as_slice(), RGBColor(0, 128, 0)),
    ];
    let curves: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|(_, u, _)| windowed(&result.x, u, config.x_range))
        .collect();

    let (mut y_min, mut y_max) = curves
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, u)| {
            (lo.min(u), hi.max(u))
        });
    if !(y_min.is_finite() && y_max.is_finite()) {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = 0.1 * (y_max - y_min).max(1e-3);

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&config.title, ("sans-serif", 40.0).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            KeyPointAxis(
                (config.x_range.0..config.x_range.1)
                    .with_key_points(config.ticks.key_points(config.x_range)),
            ),
            (y_min - pad)..(y_max + pad),
        )?;

    let tick_label = |x: &f64| config.ticks.label(*x);
    chart
        .configure_mesh()
        .x_desc(&config.xlabel)
        .y_desc(&config.ylabel)
        .x_label_formatter(&tick_label)
        .draw()?;

    let width = config.line_width;
    for ((label, _, color), points) in series.iter().zip(curves) {
        let color = *color;
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(width)))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Forwards to `WithKeyPoints`, which lacks a `ValueFormatter` impl in plotters 0.3.7.
struct KeyPointAxis(WithKeyPoints<RangedCoordf64>);

impl Ranged for KeyPointAxis {
    type ValueType = f64;
    type FormatOption = NoDefaultFormatting;

    fn range(&self) -> std::ops::Range<f64> {
        self.0.range()
    }

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.0.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        self.0.key_points(hint)
    }

    fn axis_pixel_range(&self, limit: (i32, i32)) -> std::ops::Range<i32> {
        self.0.axis_pixel_range(limit)
    }
}

impl ValueFormatter<f64> for KeyPointAxis {
    fn format(value: &f64) -> String {
        RangedCoordf64::format(value)
    }
}

/// Renders the comparison to a PNG file.
pub fn plot_comparison<P: AsRef<Path>>(
    result: &ComparisonResult,
    output_path: P,
    config: &PlotConfig,
) -> FctResult<()> {
    let root = BitMapBackend::new(output_path.as_ref(), (config.width, config.height))
        .into_drawing_area();
    draw_on_area(&root, result, config).map_err(|e| FctError::Plot(e.to_string()))
}
