//! Latency trend charts.
//!
//! A trend is a filled line chart of one target's sample history. Columns are
//! drawn with eighth-block glyphs, so the vertical resolution is eight levels
//! per terminal row. The top cell of each column is the stroke, in the full
//! palette color; cells below it form the filled area, blended from 40% of the
//! palette color at the top of the chart down to the background at the
//! baseline.
//!
//! ```text
//!   ▂▄▆█▆▄
//!  ▄██████▆▂      <- stroke
//! ▆█████████▆▄    <- fill, fading toward the baseline
//! ```
//!
//! Rendering is a pure function of the samples, the area, and [`TrendConfig`].
//! [`TrendCache`] reuses a rendered chart until the history's revision or the
//! area size changes.

use std::collections::HashMap;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::data::SampleHistory;

/// Eighth-block glyphs, one through eight eighths tall.
const BLOCK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Fill strength at the top edge of the chart.
const FILL_TOP_ALPHA: f64 = 0.4;

/// Named thresholds for trend rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendConfig {
    /// A latest sample above this switches the chart to the unhealthy palette.
    pub unhealthy_latency_ms: f64,
    /// Minimum vertical span, so flat histories don't fill the chart.
    pub range_floor_ms: f64,
}

impl TrendConfig {
    pub const DEFAULT_UNHEALTHY_LATENCY_MS: f64 = 500.0;
    pub const DEFAULT_RANGE_FLOOR_MS: f64 = 50.0;
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            unhealthy_latency_ms: Self::DEFAULT_UNHEALTHY_LATENCY_MS,
            range_floor_ms: Self::DEFAULT_RANGE_FLOOR_MS,
        }
    }
}

/// Chart coloring, chosen from the latest sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendPalette {
    Healthy,
    Unhealthy,
}

impl TrendPalette {
    /// Pick the palette for a chart whose newest sample is `latest`.
    ///
    /// Zero is the probe-failure sentinel and counts as unhealthy.
    pub fn for_latest(latest: f64, config: &TrendConfig) -> Self {
        if latest > config.unhealthy_latency_ms || latest == 0.0 {
            TrendPalette::Unhealthy
        } else {
            TrendPalette::Healthy
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            // #2f81f7
            TrendPalette::Healthy => (47, 129, 247),
            // #ef4444
            TrendPalette::Unhealthy => (239, 68, 68),
        }
    }

    pub fn line_color(self) -> Color {
        let (r, g, b) = self.rgb();
        Color::Rgb(r, g, b)
    }
}

/// Vertical range `[min, max]` for a sample sequence, with `max` at least
/// `min + range_floor`.
pub fn vertical_range(samples: &[f64], range_floor: f64) -> Option<(f64, f64)> {
    let min = samples.iter().copied().reduce(f64::min)?;
    let max = samples.iter().copied().reduce(f64::max)?;
    Some((min, max.max(min + range_floor)))
}

/// Samples mapped to chart coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPlot {
    /// `(x, y)` per sample, oldest first. `y` grows downward.
    pub points: Vec<(f64, f64)>,
    pub min: f64,
    pub max: f64,
    pub palette: TrendPalette,
}

/// Map `samples` onto a `width` x `height` canvas.
///
/// Returns `None` for fewer than two samples. Points are spread evenly across
/// the full width; a sample at `min` sits on the bottom edge and a sample at
/// `max` on the top edge.
pub fn plot(samples: &[f64], width: f64, height: f64, config: &TrendConfig) -> Option<TrendPlot> {
    if samples.len() < 2 {
        return None;
    }
    let (min, max) = vertical_range(samples, config.range_floor_ms)?;
    let span = max - min;
    let last_index = (samples.len() - 1) as f64;

    let points = samples
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let x = i as f64 * width / last_index;
            let norm = if span > 0.0 { (value - min) / span } else { 0.0 };
            (x, height - norm * height)
        })
        .collect();

    let latest = *samples.last()?;
    Some(TrendPlot {
        points,
        min,
        max,
        palette: TrendPalette::for_latest(latest, config),
    })
}

impl TrendPlot {
    /// Interpolated `y` at horizontal position `x`.
    fn y_at(&self, x: f64) -> f64 {
        let Some(&(_, last_y)) = self.points.last() else {
            return 0.0;
        };
        for pair in self.points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if x <= x1 {
                if x1 - x0 <= f64::EPSILON {
                    return y1;
                }
                let t = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
                return y0 + (y1 - y0) * t;
            }
        }
        last_y
    }
}

/// Blend `color` over `background` at `alpha`.
fn blend(color: (u8, u8, u8), background: (u8, u8, u8), alpha: f64) -> Color {
    let mix = |fg: u8, bg: u8| -> u8 {
        (bg as f64 + (fg as f64 - bg as f64) * alpha).round().clamp(0.0, 255.0) as u8
    };
    Color::Rgb(
        mix(color.0, background.0),
        mix(color.1, background.1),
        mix(color.2, background.2),
    )
}

/// Filled line chart widget for one sample sequence.
#[derive(Debug, Clone)]
pub struct TrendChart<'a> {
    samples: &'a [f64],
    config: TrendConfig,
    background: (u8, u8, u8),
}

impl<'a> TrendChart<'a> {
    pub fn new(samples: &'a [f64], config: TrendConfig) -> Self {
        Self {
            samples,
            config,
            background: (0, 0, 0),
        }
    }

    /// Color the gradient fades into.
    pub fn background(mut self, rgb: (u8, u8, u8)) -> Self {
        self.background = rgb;
        self
    }
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                buf[(x, y)].reset();
            }
        }
        if area.is_empty() {
            return;
        }

        let levels = area.height as f64 * 8.0;
        let columns = area.width as f64;
        let Some(plot) = plot(self.samples, (columns - 1.0).max(0.0), levels, &self.config) else {
            return;
        };

        let palette = plot.palette.rgb();
        let stroke = Style::default().fg(plot.palette.line_color());

        for col in 0..area.width {
            let y = if area.width == 1 {
                plot.points.last().map_or(levels, |p| p.1)
            } else {
                plot.y_at(col as f64)
            };
            // Eighths filled from the baseline; keep the stroke visible at the minimum.
            let filled = ((levels - y).round() as u16).clamp(1, area.height * 8);
            let full_rows = filled / 8;
            let partial = filled % 8;
            let top_row = if partial > 0 { full_rows } else { full_rows - 1 };

            for row in 0..=top_row {
                let cell_y = area.bottom() - 1 - row;
                let cell = &mut buf[(area.left() + col, cell_y)];
                if row == top_row {
                    let glyph = if partial > 0 {
                        BLOCK_CHARS[partial as usize - 1]
                    } else {
                        BLOCK_CHARS[7]
                    };
                    cell.set_char(glyph).set_style(stroke);
                } else {
                    let height_ratio = (row as f64 + 0.5) / area.height as f64;
                    let color = blend(palette, self.background, FILL_TOP_ALPHA * height_ratio);
                    cell.set_char('█').set_style(Style::default().fg(color));
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    revision: u64,
    width: u16,
    height: u16,
}

/// Rendered charts, one per target address.
///
/// A chart is re-rendered only when its history revision or the area size
/// changes.
#[derive(Debug)]
pub struct TrendCache {
    config: TrendConfig,
    background: (u8, u8, u8),
    entries: HashMap<String, (CacheKey, Buffer)>,
    renders: usize,
}

impl TrendCache {
    pub fn new(config: TrendConfig, background: (u8, u8, u8)) -> Self {
        Self {
            config,
            background,
            entries: HashMap::new(),
            renders: 0,
        }
    }

    /// Number of charts rendered so far (cache misses).
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Draw the chart for `address` into `buf` at `area`.
    pub fn render(&mut self, address: &str, history: &SampleHistory, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        let key = CacheKey {
            revision: history.revision(),
            width: area.width,
            height: area.height,
        };

        let fresh = self.entries.get(address).is_some_and(|(cached, _)| *cached == key);
        if !fresh {
            let local = Rect::new(0, 0, area.width, area.height);
            let mut chart = Buffer::empty(local);
            let samples = history.samples();
            TrendChart::new(&samples, self.config)
                .background(self.background)
                .render(local, &mut chart);
            self.renders += 1;
            self.entries.insert(address.to_string(), (key, chart));
        }

        if let Some((_, chart)) = self.entries.get(address) {
            for y in 0..area.height {
                for x in 0..area.width {
                    buf[(area.x + x, area.y + y)] = chart[(x, y)].clone();
                }
            }
        }
    }

    /// Forget charts for addresses not in `live`.
    pub fn retain<'a>(&mut self, live: impl IntoIterator<Item = &'a str>) {
        let live: std::collections::HashSet<&str> = live.into_iter().collect();
        self.entries.retain(|address, _| live.contains(address.as_str()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(samples: &[f64], width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        TrendChart::new(samples, TrendConfig::default()).render(area, &mut buf);
        buf
    }

    fn is_blank(buf: &Buffer) -> bool {
        buf.content().iter().all(|cell| cell.symbol() == " ")
    }

    #[test]
    fn test_short_sequences_render_blank() {
        assert!(is_blank(&render(&[], 10, 3)));
        assert!(is_blank(&render(&[120.0], 10, 3)));
        assert!(plot(&[120.0], 10.0, 3.0, &TrendConfig::default()).is_none());
    }

    #[test]
    fn test_blank_render_clears_previous_content() {
        let area = Rect::new(0, 0, 6, 2);
        let mut buf = Buffer::empty(area);
        TrendChart::new(&[10.0, 90.0], TrendConfig::default()).render(area, &mut buf);
        assert!(!is_blank(&buf));

        TrendChart::new(&[10.0], TrendConfig::default()).render(area, &mut buf);
        assert!(is_blank(&buf));
    }

    #[test]
    fn test_flat_sequence_range_uses_floor() {
        assert_eq!(vertical_range(&[80.0, 80.0, 80.0], 50.0), Some((80.0, 130.0)));
        assert_eq!(vertical_range(&[0.0, 0.0], 50.0), Some((0.0, 50.0)));
        // Wide spreads are untouched.
        assert_eq!(vertical_range(&[10.0, 400.0], 50.0), Some((10.0, 400.0)));
        assert_eq!(vertical_range(&[], 50.0), None);
    }

    #[test]
    fn test_palette_follows_latest_sample() {
        let config = TrendConfig::default();
        assert_eq!(TrendPalette::for_latest(120.0, &config), TrendPalette::Healthy);
        assert_eq!(TrendPalette::for_latest(500.0, &config), TrendPalette::Healthy);
        assert_eq!(TrendPalette::for_latest(500.1, &config), TrendPalette::Unhealthy);
        assert_eq!(TrendPalette::for_latest(0.0, &config), TrendPalette::Unhealthy);

        // Earlier spikes don't matter.
        let p = plot(&[900.0, 900.0, 100.0], 10.0, 10.0, &config).unwrap();
        assert_eq!(p.palette, TrendPalette::Healthy);
        let p = plot(&[100.0, 100.0, 0.0], 10.0, 10.0, &config).unwrap();
        assert_eq!(p.palette, TrendPalette::Unhealthy);
    }

    #[test]
    fn test_plot_coordinates() {
        let p = plot(&[100.0, 200.0, 150.0], 20.0, 10.0, &TrendConfig::default()).unwrap();
        assert_eq!(p.min, 100.0);
        assert_eq!(p.max, 200.0);
        assert_eq!(p.points, vec![(0.0, 10.0), (10.0, 0.0), (20.0, 5.0)]);
    }

    #[test]
    fn test_higher_latency_draws_taller_column() {
        let buf = render(&[10.0, 300.0], 2, 4);
        let column_height = |x: u16| (0..4).filter(|&y| buf[(x, y)].symbol() != " ").count();
        assert_eq!(column_height(0), 1);
        assert_eq!(column_height(1), 4);
        // The top of the tall column is the stroke in the line color.
        assert_eq!(buf[(1, 0)].fg, TrendPalette::Healthy.line_color());
    }

    #[test]
    fn test_fill_fades_toward_baseline() {
        let buf = render(&[10.0, 300.0], 2, 4);
        assert_eq!(buf[(1, 3)].symbol(), "█");
        let (Color::Rgb(_, _, upper), Color::Rgb(_, _, lower)) = (buf[(1, 1)].fg, buf[(1, 3)].fg) else {
            panic!("fill should use rgb colors");
        };
        assert!(upper > lower);
    }

    #[test]
    fn test_render_is_deterministic() {
        let samples = [120.0, 95.0, 480.0, 510.0, 130.0];
        assert_eq!(render(&samples, 30, 3), render(&samples, 30, 3));
    }

    #[test]
    fn test_cache_renders_once_per_revision() {
        let mut history = SampleHistory::new(10);
        history.push(100.0);
        history.push(120.0);

        let area = Rect::new(2, 1, 12, 2);
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 4));
        let mut cache = TrendCache::new(TrendConfig::default(), (0, 0, 0));

        cache.render("a", &history, area, &mut buf);
        cache.render("a", &history, area, &mut buf);
        assert_eq!(cache.renders(), 1);

        history.push(140.0);
        cache.render("a", &history, area, &mut buf);
        assert_eq!(cache.renders(), 2);

        cache.render("a", &history, Rect::new(2, 1, 10, 2), &mut buf);
        assert_eq!(cache.renders(), 3);

        cache.retain(["b"]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cached_render_matches_direct_render() {
        let mut history = SampleHistory::new(10);
        for v in [40.0, 60.0, 55.0, 90.0] {
            history.push(v);
        }
        let area = Rect::new(0, 0, 16, 3);

        let mut direct = Buffer::empty(area);
        TrendChart::new(&history.samples(), TrendConfig::default()).render(area, &mut direct);

        let mut cached = Buffer::empty(area);
        TrendCache::new(TrendConfig::default(), (0, 0, 0)).render("a", &history, area, &mut cached);

        assert_eq!(direct, cached);
    }
}
