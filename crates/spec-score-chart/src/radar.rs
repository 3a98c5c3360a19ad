use std::f64::consts::FRAC_PI_2;

use spec_score_core::{BalanceTier, ScoreVector, AXIS_NAMES};

/// Input for one radar chart. Carries the already-computed score output;
/// the renderer never rescores.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub values: ScoreVector,
    pub balance: f64,
    pub verdict: String,
    pub title: Option<String>,
}

const WIDTH: f64 = 480.0;
const HEIGHT: f64 = 560.0;
const CENTER_X: f64 = 240.0;
const CENTER_Y: f64 = 230.0;
const OUTER_RADIUS: f64 = 130.0;
// Vertical reserve for the title line; shifts the whole chart down.
const TITLE_OFFSET: f64 = 35.0;
const GRID_LEVELS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];
const FONT_FAMILY: &str = "system-ui, -apple-system, sans-serif";

/// Label placement per axis position (top, right, bottom, left).
const LABEL_OFFSETS: [(f64, f64, &str); 4] = [
    (0.0, -22.0, "middle"),
    (24.0, 5.0, "start"),
    (0.0, 28.0, "middle"),
    (-24.0, 5.0, "end"),
];

fn stroke_color(tier: BalanceTier) -> &'static str {
    match tier {
        BalanceTier::Balanced => "#22c55e",
        BalanceTier::Moderate => "#eab308",
        BalanceTier::Spiked => "#ef4444",
    }
}

/// Translucent variant of the stroke color for the data polygon fill.
fn fill_color(tier: BalanceTier) -> &'static str {
    match tier {
        BalanceTier::Balanced => "#22c55e20",
        BalanceTier::Moderate => "#eab30820",
        BalanceTier::Spiked => "#ef444420",
    }
}

/// Axis angles clockwise from the top: 90, 0, 270, 180 degrees, matching
/// the fixed axis order.
fn axis_angle(i: usize) -> f64 {
    FRAC_PI_2 - (i as f64) * FRAC_PI_2
}

/// Polar to screen coordinates. Screen y grows downward, so the sine term
/// is negated.
fn point(cx: f64, cy: f64, angle: f64, radius: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy - radius * angle.sin())
}

fn ring_points(cy: f64, radius: f64) -> [(f64, f64); 4] {
    core::array::from_fn(|i| point(CENTER_X, cy, axis_angle(i), radius))
}

fn polygon_points(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn generate_radar_svg(config: &ChartConfig) -> String {
    let tier = BalanceTier::of(config.balance);
    let stroke = stroke_color(tier);
    let fill = fill_color(tier);
    let title_offset = if config.title.is_some() {
        TITLE_OFFSET
    } else {
        0.0
    };
    let cy = CENTER_Y + title_offset;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" width=\"{WIDTH}\" height=\"{HEIGHT}\" style=\"background:#1a1a1a;border-radius:12px\">",
    ));

    if let Some(title) = &config.title {
        svg.push_str(&format!(
            "<text x=\"{CENTER_X}\" y=\"24\" text-anchor=\"middle\" fill=\"#ccc\" font-size=\"15\" font-weight=\"600\" font-family=\"{FONT_FAMILY}\">{}</text>",
            escape_xml(title)
        ));
    }

    for level in GRID_LEVELS {
        let ring = ring_points(cy, OUTER_RADIUS * level);
        let dash = if level < 1.0 {
            " stroke-dasharray=\"3,3\""
        } else {
            ""
        };
        svg.push_str(&format!(
            "<polygon points=\"{}\" fill=\"none\" stroke=\"#333\" stroke-width=\"0.5\"{dash} />",
            polygon_points(&ring)
        ));
    }

    for i in 0..4 {
        let (x, y) = point(CENTER_X, cy, axis_angle(i), OUTER_RADIUS);
        svg.push_str(&format!(
            "<line x1=\"{CENTER_X}\" y1=\"{cy}\" x2=\"{x:.2}\" y2=\"{y:.2}\" stroke=\"#444\" stroke-width=\"0.5\" />"
        ));
    }

    let data: [(f64, f64); 4] = core::array::from_fn(|i| {
        point(CENTER_X, cy, axis_angle(i), OUTER_RADIUS * config.values[i])
    });
    svg.push_str(&format!(
        "<polygon points=\"{}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"2\" />",
        polygon_points(&data)
    ));
    for (x, y) in data {
        svg.push_str(&format!(
            "<circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"4\" fill=\"{stroke}\" />"
        ));
    }

    for (i, name) in AXIS_NAMES.iter().enumerate() {
        let (x, y) = point(CENTER_X, cy, axis_angle(i), OUTER_RADIUS + 30.0);
        let (dx, dy, anchor) = LABEL_OFFSETS[i];
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{anchor}\" fill=\"#999\" font-size=\"12\" font-family=\"{FONT_FAMILY}\">{name} ({:.2})</text>",
            x + dx,
            y + dy,
            config.values[i]
        ));
    }

    let score_y = cy + OUTER_RADIUS + 80.0;
    svg.push_str(&format!(
        "<text x=\"{CENTER_X}\" y=\"{score_y}\" text-anchor=\"middle\" fill=\"{stroke}\" font-size=\"20\" font-weight=\"bold\" font-family=\"{FONT_FAMILY}\">{:.3}</text>",
        config.balance
    ));

    let verdict_y = HEIGHT - 36.0;
    let verdict_label = config.verdict.split(" - ").next().unwrap_or("");
    svg.push_str(&format!(
        "<rect x=\"80\" y=\"{}\" width=\"320\" height=\"34\" rx=\"6\" fill=\"{stroke}\" />",
        verdict_y - 18.0
    ));
    svg.push_str(&format!(
        "<text x=\"{CENTER_X}\" y=\"{}\" text-anchor=\"middle\" fill=\"white\" font-size=\"14\" font-weight=\"bold\" font-family=\"{FONT_FAMILY}\">{}</text>",
        verdict_y + 5.0,
        escape_xml(verdict_label)
    ));

    svg.push_str("</svg>");
    svg
}

pub fn generate_comparison_svg(
    left: &ChartConfig,
    right: &ChartConfig,
    title: Option<&str>,
) -> String {
    let left_svg = generate_radar_svg(&with_default_title(left, "Before"));
    let right_svg = generate_radar_svg(&with_default_title(right, "After"));
    let main_title = title.unwrap_or("Is your .md ready for the machine?");

    let mut svg = String::new();
    svg.push_str(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 1000 620\" width=\"1000\" height=\"620\" style=\"background:#111;border-radius:12px\">",
    );
    svg.push_str(&format!(
        "<text x=\"500\" y=\"32\" text-anchor=\"middle\" fill=\"#eee\" font-size=\"17\" font-weight=\"600\" font-family=\"{FONT_FAMILY}\">{}</text>",
        escape_xml(main_title)
    ));
    svg.push_str(&format!(
        "<g transform=\"translate(20, 50)\">{}</g>",
        inner_content(&left_svg)
    ));
    svg.push_str(&format!(
        "<g transform=\"translate(500, 50)\">{}</g>",
        inner_content(&right_svg)
    ));
    svg.push_str("</svg>");
    svg
}

fn with_default_title(config: &ChartConfig, fallback: &str) -> ChartConfig {
    let mut out = config.clone();
    let title = out.title.take().filter(|t| !t.is_empty());
    out.title = Some(title.unwrap_or_else(|| fallback.to_string()));
    out
}

/// Drops the outer <svg> wrapper so the drawing content can nest inside a
/// translated group.
fn inner_content(svg: &str) -> &str {
    let body = svg.split_once('>').map_or(svg, |(_, rest)| rest);
    body.strip_suffix("</svg>").unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(balance: f64) -> ChartConfig {
        ChartConfig {
            values: [0.5, 0.5, 0.5, 0.5],
            balance,
            verdict: "SHIP IT - spec is ready for the machine".to_string(),
            title: None,
        }
    }

    #[test]
    fn output_is_deterministic() {
        let cfg = config(0.9);
        assert_eq!(generate_radar_svg(&cfg), generate_radar_svg(&cfg));
    }

    #[test]
    fn draws_grid_data_polygon_and_dots() {
        let svg = generate_radar_svg(&config(0.9));
        assert_eq!(svg.matches("<polygon").count(), 5);
        assert_eq!(svg.matches("<line").count(), 4);
        assert_eq!(svg.matches("<circle").count(), 4);
        assert_eq!(svg.matches("stroke-dasharray").count(), 3);
    }

    #[test]
    fn title_shifts_chart_center_down() {
        let untitled = generate_radar_svg(&config(0.9));
        let mut cfg = config(0.9);
        cfg.title = Some("My Spec".to_string());
        let titled = generate_radar_svg(&cfg);

        assert!(untitled.contains("y1=\"230\""));
        assert!(titled.contains("y1=\"265\""));
        assert!(titled.contains(">My Spec</text>"));
        assert!(!untitled.contains("My Spec"));
    }

    #[test]
    fn colors_follow_balance_tier() {
        let green = generate_radar_svg(&config(0.9));
        assert!(green.contains("#22c55e"));
        assert!(green.contains("#22c55e20"));

        let yellow = generate_radar_svg(&config(0.6));
        assert!(yellow.contains("#eab308"));

        let red = generate_radar_svg(&config(0.2));
        assert!(red.contains("#ef4444"));
        assert!(!red.contains("#22c55e"));
    }

    #[test]
    fn badge_carries_bare_verdict_label() {
        let svg = generate_radar_svg(&config(0.9));
        assert!(svg.contains(">SHIP IT</text>"));
        assert!(!svg.contains("ready for the machine"));
    }

    #[test]
    fn labels_carry_axis_names_and_values() {
        let mut cfg = config(0.9);
        cfg.values = [0.61, 0.52, 0.43, 0.34];
        let svg = generate_radar_svg(&cfg);
        assert!(svg.contains("completeness (0.61)"));
        assert!(svg.contains("clarity (0.52)"));
        assert!(svg.contains("constraints (0.43)"));
        assert!(svg.contains("specificity (0.34)"));
    }

    #[test]
    fn title_text_is_escaped() {
        let mut cfg = config(0.9);
        cfg.title = Some("a < b & \"c\"".to_string());
        let svg = generate_radar_svg(&cfg);
        assert!(svg.contains("a &lt; b &amp; &quot;c&quot;"));
    }

    #[test]
    fn comparison_nests_exactly_two_drawings() {
        let svg = generate_comparison_svg(&config(0.2), &config(0.9), None);
        assert_eq!(svg.matches("<svg").count(), 1);
        assert_eq!(svg.matches("</svg>").count(), 1);
        assert_eq!(svg.matches("<g transform=\"translate(").count(), 2);
        assert!(svg.contains(">Before</text>"));
        assert!(svg.contains(">After</text>"));
        assert!(svg.contains("Is your .md ready for the machine?"));
    }

    #[test]
    fn comparison_sides_are_colored_independently() {
        let svg = generate_comparison_svg(&config(0.2), &config(0.9), Some("Comparison"));
        assert!(svg.contains("#ef4444"));
        assert!(svg.contains("#22c55e"));
        assert!(svg.contains(">Comparison</text>"));
    }

    #[test]
    fn per_side_titles_override_defaults() {
        let mut left = config(0.5);
        left.title = Some("Draft 1".to_string());
        let right = config(0.5);
        let svg = generate_comparison_svg(&left, &right, None);
        assert!(svg.contains(">Draft 1</text>"));
        assert!(!svg.contains(">Before</text>"));
        assert!(svg.contains(">After</text>"));
    }
}
