use cannon_physics::{PhysicsConfig, ScenarioConfig, World, scene};

use clap::Parser;
use std::path::PathBuf;

/// Fires the cannon once and runs the level without a window.
#[derive(Parser, Debug)]
struct Args {
    /// JSON scenario file; the standard level when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Barrel angle in degrees.
    #[arg(long, default_value_t = 45.0)]
    angle: f32,
    /// Launch speed.
    #[arg(long, default_value_t = 20.0)]
    speed: f32,
    #[arg(long, default_value_t = 300)]
    frames: usize,
    /// Time step per frame; the configured tick when omitted.
    #[arg(long)]
    dt: Option<f32>,
}

fn load_world(args: &Args) -> Result<World, Box<dyn std::error::Error>> {
    let Some(path) = &args.scenario else {
        return Ok(scene::standard_level(PhysicsConfig::default())?);
    };
    let json = std::fs::read_to_string(path)?;
    Ok(ScenarioConfig::from_json(&json)?.build()?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut world = load_world(&args)?;
    let dt = args.dt.unwrap_or(world.config.tick);
    world.launch_projectile(args.angle, args.speed)?;

    let projectile = world.projectile().ok_or("scenario has no projectile")?;
    for _ in 0..args.frames {
        world.advance(dt);
        let pose = world.pose(projectile)?;
        log::debug!(
            "frame {:4} projectile ({:8.2}, {:8.2}) score {}",
            world.frame,
            pose.x,
            pose.y,
            world.score()
        );
    }

    let pose = world.pose(projectile)?;
    let retired = world.bodies().iter().filter(|b| !b.active).count();
    println!(
        "after {} frames: projectile at ({:.2}, {:.2}), {} bodies retired, score {}",
        world.frame, pose.x, pose.y, retired, world.score()
    );
    Ok(())
}
