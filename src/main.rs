use anyhow::{Context, Result};
use clap::Parser;
use crossbeam::channel::RecvTimeoutError;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use traffic_viz::client::{
    AgentId, CityLayout, ClientConfig, ClientState, HttpSimulationApi, LightState, Poller,
    Position, SceneSink, ScenePlacement, ServerEvent, TileKind,
};

#[derive(Parser)]
#[command(name = "traffic_viz")]
#[command(about = "Visualization client for a traffic simulation server")]
struct Cli {
    /// Run with the Bevy game engine UI
    #[arg(long)]
    ui: bool,

    /// Number of polling ticks to run in headless mode
    #[arg(long, default_value = "10")]
    ticks: u32,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the simulation server
    #[arg(long)]
    server_url: Option<String>,

    /// Seconds between simulation steps
    #[arg(long)]
    interval: Option<f32>,

    /// City map file to lay out under the server scenery
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Seed for scenery randomness
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Config file values with command line overrides applied
    fn resolve_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.server_url {
            config.server_url = url.clone();
        }
        if let Some(interval) = self.interval {
            config.time_to_update = interval;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if cli.ui {
        launch_ui(&cli, config)
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let layout = load_layout(&cli, &config)?;
        run_headless(config, layout, cli.ticks)
    }
}

#[cfg(feature = "ui")]
fn launch_ui(cli: &Cli, config: ClientConfig) -> Result<()> {
    let layout = load_layout(cli, &config)?;
    run_with_ui(config, layout);
    Ok(())
}

#[cfg(not(feature = "ui"))]
fn launch_ui(_cli: &Cli, _config: ClientConfig) -> Result<()> {
    eprintln!("Error: UI feature is not enabled. Rebuild with --features ui");
    std::process::exit(1);
}

fn load_layout(cli: &Cli, config: &ClientConfig) -> Result<Option<CityLayout>> {
    cli.layout
        .as_deref()
        .map(|path| {
            CityLayout::load(path, config.tile_size, config.building_variants, config.seed)
        })
        .transpose()
}

/// Scene sink for headless mode: proxies are unit values, changes are logged
struct ConsoleSink;

impl SceneSink for ConsoleSink {
    type Car = ();
    type Light = ();

    fn spawn_car(&mut self, id: &AgentId, position: Position) {
        debug!("Car {} appeared at ({:.1}, {:.1})", id, position.x, position.z);
    }

    fn despawn_car(&mut self, id: &AgentId, _car: ()) {
        debug!("Car {} removed", id);
    }

    fn spawn_light(&mut self, id: &AgentId, position: Position) {
        debug!("Traffic light {} at ({:.1}, {:.1})", id, position.x, position.z);
    }

    fn set_light(&mut self, _light: &(), state: LightState) {
        debug!("Traffic light switched to {:?}", state);
    }

    fn place_scenery(&mut self, _placement: &ScenePlacement) {}
}

/// Run the client in headless mode (no graphics)
fn run_headless(config: ClientConfig, layout: Option<CityLayout>, ticks: u32) -> Result<()> {
    println!("Running traffic visualization in headless mode...");
    println!(
        "Server: {}, Ticks: {}, Interval: {}s",
        config.server_url, ticks, config.time_to_update
    );
    println!();

    if let Some(layout) = &layout {
        print_layout_summary(layout);
    }

    let api = HttpSimulationApi::new(config.clone());
    let (mut poller, events) =
        Poller::spawn(api, config.update_interval()).context("Failed to start poller thread")?;

    let mut state: ClientState<(), ()> = ClientState::new(&config);
    let mut sink = ConsoleSink;
    let mut last_frame = Instant::now();

    while state.stats().ticks_polled < ticks {
        match events.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                let tick_done = matches!(event, ServerEvent::TickComplete { .. });
                state.apply(event, &mut sink);
                if tick_done {
                    print_summary(&mut state);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Poller stopped before all ticks completed");
                break;
            }
        }
        let now = Instant::now();
        state.advance((now - last_frame).as_secs_f32());
        last_frame = now;
    }

    poller.shutdown();
    state.stats().log_summary();
    Ok(())
}

fn print_layout_summary(layout: &CityLayout) {
    println!("City layout: {}x{} tiles", layout.width, layout.height);
    println!(
        "  Roads: {}, Traffic lights: {}, Destinations: {}, Buildings: {}",
        layout.count(|k| matches!(k, TileKind::Road { .. })),
        layout.count(|k| matches!(k, TileKind::TrafficLight { .. })),
        layout.count(|k| matches!(k, TileKind::Destination { .. })),
        layout.count(|k| matches!(k, TileKind::Building { .. })),
    );
    if layout.skipped > 0 {
        info!("Layout had {} characters without a tile", layout.skipped);
    }
    println!();
}

fn print_summary(state: &mut ClientState<(), ()>) {
    const SHOWN_CARS: usize = 5;

    let green = state.lights().count_in_state(LightState::Green);
    let red = state.lights().count_in_state(LightState::Red);
    println!("--- Step {} ---", state.last_step());
    println!(
        "Cars: {} active, {} arrived | Lights: {} green, {} red",
        state.cars().len(),
        state.stats().total_cars_arrived,
        green,
        red
    );
    for frame in state.car_frames().iter().take(SHOWN_CARS) {
        println!(
            "  {} at ({:.2}, {:.2}) heading {:.0} deg",
            frame.id,
            frame.position.x,
            frame.position.z,
            frame.heading.to_degrees()
        );
    }
    println!();
}

#[cfg(feature = "ui")]
fn run_with_ui(config: ClientConfig, layout: Option<CityLayout>) {
    use bevy::log::LogPlugin;
    use bevy::prelude::*;

    println!("Starting Traffic Visualization UI...");
    println!("Server: {}", config.server_url);
    println!();
    println!("Camera Controls:");
    println!("  W/A/S/D     - Move camera");
    println!("  Q/E         - Rotate camera around center");
    println!("  Z/X         - Zoom in/out");
    println!("  ESC         - Exit");
    println!();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(LogPlugin {
                    filter: "warn,traffic_viz=debug".to_string(),
                    level: bevy::log::Level::DEBUG,
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Traffic Visualization".into(),
                        resolution: (1280, 720).into(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .add_plugins(traffic_viz::ui::TrafficVizUIPlugin::new(config, layout))
        .run();
}
