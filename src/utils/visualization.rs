//! Visualization utilities for dubins_mission
//!
//! Collects arena polygons, waypoints and trajectories and renders them with
//! gnuplot into a single set of axes.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{PlanningError, PlanningResult, Point2D, Polygon, Pose2D, Trajectory};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00AA00";
    pub const BLUE: &str = "#0000FF";
    pub const ORANGE: &str = "#FFA500";
    pub const PURPLE: &str = "#800080";
    pub const GRAY: &str = "#808080";

    pub const BORDER: &str = BLACK;
    pub const OBSTACLE: &str = RED;
    pub const VICTIM: &str = GREEN;
    pub const GATE: &str = PURPLE;
    pub const WAYPOINT: &str = ORANGE;
    pub const TRAJECTORY: &str = BLUE;
    pub const ROBOT: &str = GRAY;
}

/// Style for line rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::TRAJECTORY, "Trajectory")
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Series {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

/// Plot builder; nothing touches gnuplot until the figure is saved or shown
pub struct Visualizer {
    series: Vec<Series>,
    title: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            title: String::new(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Set aspect ratio (None for auto)
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Number of series added so far
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Closed outline of a polygon
    pub fn plot_polygon(&mut self, polygon: &Polygon, style: &PathStyle) -> &mut Self {
        if polygon.is_empty() {
            return self;
        }
        let mut x: Vec<f64> = polygon.vertices.iter().map(|p| p.x).collect();
        let mut y: Vec<f64> = polygon.vertices.iter().map(|p| p.y).collect();
        x.push(polygon.vertices[0].x);
        y.push(polygon.vertices[0].y);
        self.series.push(Series::Lines { x, y, style: style.clone() });
        self
    }

    /// Obstacles share one caption; only the first carries it
    pub fn plot_obstacles(&mut self, obstacles: &[Polygon]) -> &mut Self {
        for (i, obstacle) in obstacles.iter().enumerate() {
            let caption = if i == 0 { "Obstacles" } else { "" };
            self.plot_polygon(obstacle, &PathStyle::new(colors::OBSTACLE, caption).with_line_width(1.5));
        }
        self
    }

    /// Open polyline through `points`
    pub fn plot_polyline(&mut self, points: &[Point2D], style: &PathStyle) -> &mut Self {
        let x = points.iter().map(|p| p.x).collect();
        let y = points.iter().map(|p| p.y).collect();
        self.series.push(Series::Lines { x, y, style: style.clone() });
        self
    }

    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        let x = points.iter().map(|p| p.x).collect();
        let y = points.iter().map(|p| p.y).collect();
        self.series.push(Series::Points { x, y, style: style.clone() });
        self
    }

    pub fn plot_trajectory(&mut self, trajectory: &Trajectory, style: &PathStyle) -> &mut Self {
        self.series.push(Series::Lines {
            x: trajectory.x_coords(),
            y: trajectory.y_coords(),
            style: style.clone(),
        });
        self
    }

    /// Pose marker with a heading tick of length `size`
    pub fn plot_pose(&mut self, pose: &Pose2D, size: f64, caption: &str) -> &mut Self {
        self.plot_points(&[pose.position()], &PointStyle::new(colors::ROBOT, caption).with_size(1.5));
        let tip = Point2D::new(pose.x + size * pose.yaw.cos(), pose.y + size * pose.yaw.sin());
        self.plot_polyline(&[pose.position(), tip], &PathStyle::new(colors::ROBOT, ""))
    }

    pub fn show(&mut self) -> PlanningResult<()> {
        let mut figure = self.render();
        figure
            .show()
            .map(|_| ())
            .map_err(|e| PlanningError::VisualizationError(e.to_string()))
    }

    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> PlanningResult<()> {
        let mut figure = self.render();
        figure
            .save_to_png(path, width, height)
            .map_err(|e| PlanningError::VisualizationError(format!("{}: {}", path, e)))
    }

    pub fn save_svg(&mut self, path: &str) -> PlanningResult<()> {
        let mut figure = self.render();
        figure
            .save_to_svg(path, 800, 600)
            .map_err(|e| PlanningError::VisualizationError(format!("{}: {}", path, e)))
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        let axes = figure.axes2d();
        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label("X [m]", &[]);
        axes.set_y_label("Y [m]", &[]);
        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }

        for series in &self.series {
            match series {
                Series::Lines { x, y, style } => {
                    axes.lines(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        LineWidth(style.line_width),
                    ]);
                }
                Series::Points { x, y, style } => {
                    axes.points(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        PointSymbol(style.symbol),
                        PointSize(style.size),
                    ]);
                }
            }
        }
        figure
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visualizer_creation() {
        let vis = Visualizer::new();
        assert!(vis.aspect_ratio.is_some());
        assert!(vis.is_empty());
    }

    #[test]
    fn test_polygon_outline_is_closed() {
        let mut vis = Visualizer::new();
        vis.plot_polygon(&Polygon::rectangle(0.0, 0.0, 1.0, 1.0), &PathStyle::new(colors::BORDER, "Border"));
        match &vis.series[0] {
            Series::Lines { x, y, .. } => {
                assert_eq!(x.len(), 5);
                assert_eq!((x[0], y[0]), (x[4], y[4]));
            }
            Series::Points { .. } => panic!("expected a line series"),
        }
    }

    #[test]
    fn test_series_accumulate() {
        let mut vis = Visualizer::new();
        vis.plot_obstacles(&[Polygon::rectangle(0.0, 0.0, 1.0, 1.0), Polygon::rectangle(2.0, 2.0, 3.0, 3.0)])
            .plot_pose(&Pose2D::new(0.0, 0.0, 0.0), 0.1, "Robot")
            .plot_polygon(&Polygon::new(vec![]), &PathStyle::default());
        assert_eq!(vis.len(), 4);
    }

    #[test]
    fn test_path_style() {
        let style = PathStyle::new(colors::RED, "Test Path").with_line_width(3.0);
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.color, colors::RED);
        let point = PointStyle::new(colors::VICTIM, "Victims").with_symbol('S').with_size(2.0);
        assert_eq!(point.symbol, 'S');
    }
}
