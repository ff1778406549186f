//! CLI utility for generating mazes, exporting their geometry and walking an
//! agent through them

use anyhow::{anyhow, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use glam::Vec3;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use mazenav_agent::{AgentParams, AgentStep};
use mazenav_common::TriangleSoup;
use mazenav_geometry::{build_scene, SceneConfig};
use mazenav_maze::MazeGrid;
use mazenav_navmesh::{NavMeshBuilder, NavMeshConfig, PathResult, VoxelEngine};
use mazenav_scene::MazeScene;

/// A CLI utility for maze generation, navigation mesh building and agent simulation
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging (overridden by RUST_LOG)
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

/// Maze and navmesh options shared by every command
#[derive(ClapArgs, Debug, Clone)]
struct SceneOptions {
    /// Maze width in cells
    #[clap(long, default_value_t = 9)]
    width: usize,

    /// Maze height in cells
    #[clap(long, default_value_t = 9)]
    height: usize,

    /// Maze seed
    #[clap(long, default_value_t = 0xC0FFEE)]
    seed: u64,

    /// Voxel size used when building the navmesh
    #[clap(long, default_value_t = 0.05)]
    cell_size: f32,

    /// Agent radius; the walkable area is eroded by this much
    #[clap(long, default_value_t = 0.06)]
    agent_radius: f32,

    /// Keep the full walkable area: no erosion, no small-region culling
    #[clap(long)]
    disable_erosion: bool,
}

impl SceneOptions {
    fn scene_config(&self) -> SceneConfig {
        let mut config = SceneConfig::default();
        config.maze.width = self.width;
        config.maze.height = self.height;
        config.maze.seed = self.seed;
        config.spawn_height = self.agent_radius;
        config
    }

    fn navmesh_config(&self) -> NavMeshConfig {
        NavMeshConfig {
            cell_size: self.cell_size,
            agent_radius: self.agent_radius,
            debug_disable_erosion: self.disable_erosion,
            ..Default::default()
        }
    }

    fn agent_params(&self, speed: f32) -> AgentParams {
        AgentParams {
            speed,
            radius: self.agent_radius,
            ..Default::default()
        }
    }
}

/// What to export
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ExportKind {
    /// Triangle soup fed to the navmesh builder
    Scene,
    /// Walkable surface of the built navmesh
    Navmesh,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the maze as ASCII art
    Maze {
        #[clap(flatten)]
        scene: SceneOptions,
    },

    /// Write scene or navmesh geometry as a Wavefront OBJ file
    Export {
        #[clap(flatten)]
        scene: SceneOptions,

        /// Output OBJ file
        #[clap(long, value_parser)]
        output: PathBuf,

        /// Geometry to export
        #[clap(long, value_enum, default_value_t = ExportKind::Scene)]
        kind: ExportKind,
    },

    /// Find a path between two points
    Path {
        #[clap(flatten)]
        scene: SceneOptions,

        /// Build the navmesh from this OBJ mesh instead of the maze scene
        #[clap(long, short, value_parser)]
        input: Option<PathBuf>,

        /// Start position (x,y,z); defaults to the maze spawn point
        #[clap(long, value_parser = parse_vector)]
        start: Option<Vec3>,

        /// Goal position (x,y,z)
        #[clap(long, value_parser = parse_vector)]
        goal: Vec3,

        /// Print the path as JSON
        #[clap(long)]
        json: bool,

        /// Output path file
        #[clap(long, value_parser)]
        output: Option<PathBuf>,
    },

    /// Send the agent to a target and step it until it stops
    Simulate {
        #[clap(flatten)]
        scene: SceneOptions,

        /// Target position (x,y,z)
        #[clap(long, value_parser = parse_vector)]
        target: Vec3,

        /// Agent speed in units per second
        #[clap(long, default_value_t = 0.5)]
        speed: f32,

        /// Seconds per tick
        #[clap(long, default_value_t = 1.0 / 60.0)]
        dt: f32,

        /// Give up after this many ticks
        #[clap(long, default_value_t = 100_000)]
        max_ticks: usize,

        /// Print the agent position every N ticks (0 to disable)
        #[clap(long, default_value_t = 60)]
        report_every: usize,
    },
}

/// Parse a comma-separated vector
fn parse_vector(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();

    if parts.len() != 3 {
        return Err(format!(
            "Vector must have 3 components, got {}",
            parts.len()
        ));
    }

    let x = parts[0].parse::<f32>().map_err(|e| e.to_string())?;
    let y = parts[1].parse::<f32>().map_err(|e| e.to_string())?;
    let z = parts[2].parse::<f32>().map_err(|e| e.to_string())?;

    Ok(Vec3::new(x, y, z))
}

/// Path as printed with `--json`
#[derive(Serialize, Debug)]
struct PathReport<'a> {
    start: Vec3,
    goal: Vec3,
    length: f32,
    path: &'a PathResult,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match args.command {
        Commands::Maze { scene } => print_maze(&scene),
        Commands::Export {
            scene,
            output,
            kind,
        } => export(&scene, &output, kind),
        Commands::Path {
            scene,
            input,
            start,
            goal,
            json,
            output,
        } => find_path(&scene, input.as_deref(), start, goal, json, output.as_deref()),
        Commands::Simulate {
            scene,
            target,
            speed,
            dt,
            max_ticks,
            report_every,
        } => simulate(&scene, target, speed, dt, max_ticks, report_every),
    }
}

fn generate_maze(options: &SceneOptions) -> Result<MazeGrid> {
    MazeGrid::generate(options.scene_config().maze)
        .with_context(|| format!("Failed to generate {}x{} maze", options.width, options.height))
}

fn setup_scene(options: &SceneOptions, speed: f32) -> Result<MazeScene> {
    MazeScene::setup(
        options.scene_config(),
        options.navmesh_config(),
        options.agent_params(speed),
        VoxelEngine::new(),
    )
    .context("Failed to set up maze scene")
}

/// Print the maze as ASCII art
fn print_maze(options: &SceneOptions) -> Result<()> {
    let maze = generate_maze(options)?;
    println!(
        "Maze {}x{} (seed {:#x})",
        maze.width(),
        maze.height(),
        maze.seed()
    );
    print!("{}", maze);
    Ok(())
}

/// Write the scene soup or the navmesh debug surface to an OBJ file
fn export(options: &SceneOptions, output: &Path, kind: ExportKind) -> Result<()> {
    let soup = match kind {
        ExportKind::Scene => {
            let maze = generate_maze(options)?;
            build_scene(&maze, &options.scene_config()).nav_geometry
        }
        ExportKind::Navmesh => setup_scene(options, AgentParams::default().speed)?.navmesh_debug(),
    };

    log::info!(
        "Exporting {} vertices, {} triangles to {}...",
        soup.vertex_count(),
        soup.triangle_count(),
        output.display()
    );
    soup.write_obj(output)
        .with_context(|| format!("Failed to write OBJ file: {}", output.display()))?;
    Ok(())
}

/// Load navmesh input from an OBJ file
fn load_mesh(input: &Path) -> Result<TriangleSoup> {
    log::info!("Loading mesh from {}...", input.display());
    let mesh = TriangleSoup::from_obj(input)
        .with_context(|| format!("Failed to load mesh: {}", input.display()))?;

    let (bmin, bmax) = mesh.calculate_bounds();
    log::info!(
        "Mesh loaded: {} vertices, {} triangles, bounds min={:?} max={:?}",
        mesh.vertex_count(),
        mesh.triangle_count(),
        bmin,
        bmax
    );
    Ok(mesh)
}

/// Build the navmesh and print a path between two points
fn find_path(
    options: &SceneOptions,
    input: Option<&Path>,
    start: Option<Vec3>,
    goal: Vec3,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let (geometry, start) = match input {
        Some(input) => {
            let start = start.ok_or_else(|| anyhow!("--start is required with --input"))?;
            (load_mesh(input)?, start)
        }
        None => {
            let maze = generate_maze(options)?;
            let scene = build_scene(&maze, &options.scene_config());
            (scene.nav_geometry, start.unwrap_or(scene.spawn))
        }
    };

    log::info!("Building navigation mesh...");
    let navmesh = NavMeshBuilder::new()
        .build_soup(&geometry, &options.navmesh_config())
        .context("Failed to build navigation mesh")?;

    let path = navmesh
        .find_path(start, goal)
        .ok_or_else(|| anyhow!("No path from {:?} to {:?}", start, goal))?;

    let text = if json {
        let report = PathReport {
            start,
            goal,
            length: path.length(),
            path: &path,
        };
        serde_json::to_string_pretty(&report).context("Failed to serialize path")? + "\n"
    } else {
        let mut text = format!(
            "# Path from {:?} to {:?}\n# {} waypoints, length {:.3}\n",
            start,
            goal,
            path.len(),
            path.length()
        );
        for (i, p) in path.points().iter().enumerate() {
            text.push_str(&format!("{}: {},{},{}\n", i, p.x, p.y, p.z));
        }
        text
    };

    match output {
        Some(output_path) => {
            log::info!("Saving path to {}...", output_path.display());
            let mut file = File::create(output_path).with_context(|| {
                format!("Failed to create output file: {}", output_path.display())
            })?;
            file.write_all(text.as_bytes())?;
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Tap `target` and tick the scene until the agent stops
fn simulate(
    options: &SceneOptions,
    target: Vec3,
    speed: f32,
    dt: f32,
    max_ticks: usize,
    report_every: usize,
) -> Result<()> {
    if !(dt > 0.0 && dt.is_finite()) {
        return Err(anyhow!("dt must be positive, got {}", dt));
    }

    let mut scene = setup_scene(options, speed)?;
    log::info!("Agent spawned at {:?}", scene.agent().position());

    let waypoints = match scene.tap(target) {
        Some(path) => path.len(),
        None => {
            println!("No path to {:?}; agent stays idle", target);
            return Ok(());
        }
    };
    println!("Following {} waypoints to {:?}", waypoints, target);

    for tick in 1..=max_ticks {
        let step = scene.tick(dt);
        if report_every > 0 && tick % report_every == 0 {
            let agent = scene.agent();
            println!(
                "t={:.2}s pos={:?} waypoint {}/{}",
                tick as f32 * dt,
                agent.position(),
                agent.path_index(),
                agent.path().len()
            );
        }
        if step == AgentStep::Arrived {
            println!(
                "Arrived at {:?} after {} ticks ({:.2}s)",
                scene.agent().position(),
                tick,
                tick as f32 * dt
            );
            return Ok(());
        }
    }

    Err(anyhow!(
        "Agent did not arrive within {} ticks (at {:?})",
        max_ticks,
        scene.agent().position()
    ))
}
