// Mission planning demo
//
// usage: mission_demo [config.json]
//
// Plans a route through a small arena with two obstacles and three victims
// and saves the result to img/mission_demo.png.

use std::error::Error;
use std::fs;

use dubins_mission::common::LogObserver;
use dubins_mission::utils::{colors, PathStyle, PointStyle, Visualizer};
use dubins_mission::{MissionConfig, MissionInput, PlanningSession, Point2D, Polygon, Pose2D, Victim};

fn load_config() -> Result<MissionConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)?;
            let config: MissionConfig = serde_json::from_str(&text)?;
            log::info!("loaded configuration from {}", path);
            Ok(config)
        }
        None => Ok(MissionConfig::default()),
    }
}

fn sample_arena() -> MissionInput {
    let triangle = Polygon::new(vec![
        Point2D::new(0.45, 0.35),
        Point2D::new(0.65, 0.35),
        Point2D::new(0.55, 0.55),
    ]);
    MissionInput {
        border: Polygon::rectangle(0.0, 0.0, 1.5, 1.05),
        obstacles: vec![triangle, Polygon::rectangle(0.95, 0.55, 1.1, 0.75)],
        victims: vec![
            Victim::new(1, Polygon::rectangle(0.3, 0.75, 0.38, 0.83)),
            Victim::new(2, Polygon::rectangle(0.8, 0.2, 0.88, 0.28)),
            Victim::new(3, Polygon::rectangle(1.2, 0.3, 1.28, 0.38)),
        ],
        gate: Polygon::rectangle(1.45, 0.8, 1.5, 0.95),
        robot: Pose2D::new(0.2, 0.2, 0.0),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = load_config()?;
    let input = sample_arena();
    println!("mission kind: {:?}, max curvature: {}", config.mission_kind, config.multipoint.max_curvature);

    let mut session = PlanningSession::new(config).with_observer(Box::new(LogObserver));
    let plan = session.plan(&input)?;

    println!("visited victims: {:?}", plan.visited);
    println!("waypoints: {}", plan.waypoints.len());
    println!("curves: {}", plan.curves.len());
    println!("length: {:.3} m", plan.total_length);
    println!("score: {:.3}", plan.score);
    println!("samples: {}", plan.trajectory.len());

    let mut vis = Visualizer::new();
    vis.set_title("Mission plan")
        .plot_polygon(&input.border, &PathStyle::new(colors::BORDER, "Border"))
        .plot_polygon(&input.gate, &PathStyle::new(colors::GATE, "Gate"))
        .plot_obstacles(&input.obstacles);
    for (i, victim) in input.victims.iter().enumerate() {
        let caption = if i == 0 { "Victims" } else { "" };
        vis.plot_polygon(&victim.polygon, &PathStyle::new(colors::VICTIM, caption).with_line_width(1.0));
    }
    vis.plot_points(&plan.waypoints, &PointStyle::new(colors::WAYPOINT, "Waypoints").with_symbol('S'))
        .plot_trajectory(&plan.trajectory, &PathStyle::default())
        .plot_pose(&input.robot, 0.1, "Robot");

    fs::create_dir_all("img")?;
    vis.save_png("img/mission_demo.png", 800, 600)?;
    println!("plot saved to img/mission_demo.png");
    Ok(())
}
