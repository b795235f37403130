//! Text renderer for trajectories. Pure consumer of the engine's output;
//! everything about presentation (which series to show, chart size, legend)
//! lives here, not in the core.

use ecotone_core::trajectory::{TimeGrid, Trajectory};

const HEIGHT: usize = 16;
const MAX_WIDTH: usize = 72;
const SYMBOLS: [char; 8] = ['*', '+', 'o', 'x', '#', '%', '@', '&'];

/// Draws the selected compartments of a trajectory as an ASCII chart over
/// the time grid, followed by a per-series legend with range and final
/// value.
pub fn draw(grid: &TimeGrid, trajectory: &Trajectory, labels: &[&str], dims: &[usize]) {
    let samples = trajectory.len();
    if samples == 0 || dims.is_empty() {
        return;
    }
    let width = MAX_WIDTH.min(samples);

    let series: Vec<Vec<f64>> = dims.iter().map(|&d| trajectory.series(d)).collect();
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for values in &series {
        for &v in values {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        println!("(no finite samples to draw)");
        return;
    }
    if hi - lo < 1e-12 {
        hi = lo + 1.0;
    }

    let mut canvas = vec![vec![' '; width]; HEIGHT];
    for (si, values) in series.iter().enumerate() {
        let symbol = SYMBOLS[si % SYMBOLS.len()];
        for col in 0..width {
            let idx = if width > 1 {
                col * (samples - 1) / (width - 1)
            } else {
                0
            };
            let frac = (values[idx] - lo) / (hi - lo);
            let row = ((1.0 - frac) * (HEIGHT - 1) as f64).round() as usize;
            canvas[row.min(HEIGHT - 1)][col] = symbol;
        }
    }

    for (row, line) in canvas.iter().enumerate() {
        let axis = if row == 0 {
            format!("{hi:>9.3}")
        } else if row == HEIGHT - 1 {
            format!("{lo:>9.3}")
        } else {
            " ".repeat(9)
        };
        let body: String = line.iter().collect();
        println!("{axis} |{body}");
    }
    println!(
        "{:>9} +{}",
        "",
        "-".repeat(width)
    );
    println!(
        "{:>9}  t = {:.1} .. {:.1}",
        "",
        grid.start(),
        grid.end()
    );

    for (si, (&dim, values)) in dims.iter().zip(series.iter()).enumerate() {
        let symbol = SYMBOLS[si % SYMBOLS.len()];
        let label = labels.get(dim).copied().unwrap_or("?");
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let last = values[values.len() - 1];
        println!("  {symbol} {label:<10} min {min:>9.4}  max {max:>9.4}  final {last:>9.4}");
    }
}
