pub mod radar;

pub use radar::{generate_comparison_svg, generate_radar_svg, ChartConfig};
