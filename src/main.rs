//! Lane Runner entry point
//!
//! Native builds run a headless session with the autopilot at the wheel,
//! which is handy for soak-testing tuning changes:
//!
//! ```text
//! lane-runner [config.json] [runs] [--realtime]
//! ```
//!
//! The browser build drives the simulation through `lane_runner::wasm`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::time::{Duration, Instant};

    use lane_runner::SimConfig;
    use lane_runner::consts::FRAME_DT;
    use lane_runner::sim::{RunStatus, SimEvent, Simulation, autopilot};

    /// Safety stop for a single run (10 simulated minutes)
    const MAX_FRAMES_PER_RUN: u64 = 60 * 60 * 10;
    /// Log the HUD this often
    const HUD_LOG_INTERVAL: u64 = 600;

    /// Wall-clock delta source for realtime mode
    struct FrameClock {
        last: Instant,
    }

    impl FrameClock {
        fn new() -> Self {
            Self { last: Instant::now() }
        }

        /// Seconds since the previous call
        fn delta(&mut self) -> f32 {
            let now = Instant::now();
            let delta = now.duration_since(self.last).as_secs_f32();
            self.last = now;
            delta
        }

        fn restart(&mut self) {
            self.last = Instant::now();
        }
    }

    struct Args {
        config: SimConfig,
        runs: u32,
        realtime: bool,
    }

    fn parse_args() -> Args {
        let mut config = None;
        let mut runs = 3;
        let mut realtime = false;
        for arg in std::env::args().skip(1) {
            if arg == "--realtime" {
                realtime = true;
            } else if let Ok(n) = arg.parse::<u32>() {
                runs = n.max(1);
            } else {
                config = Some(SimConfig::load_or_default(&arg));
            }
        }
        let config = config.unwrap_or_else(|| {
            let seed = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            SimConfig::default().with_seed(seed)
        });
        Args {
            config,
            runs,
            realtime,
        }
    }

    pub fn run() {
        env_logger::init();
        let args = parse_args();
        log::info!("Lane Runner (headless) starting, {} run(s)", args.runs);

        let mut sim = match Simulation::new(args.config) {
            Ok(sim) => sim,
            Err(e) => {
                log::error!("Cannot start: {}", e);
                std::process::exit(1);
            }
        };
        let mut clock = FrameClock::new();
        let mut best = 0;

        for run in 1..=args.runs {
            if run > 1 {
                sim.restart();
                clock.restart();
            }

            let mut spawned = 0usize;
            while sim.status() == RunStatus::Playing && sim.frames() < MAX_FRAMES_PER_RUN {
                let delta = if args.realtime {
                    std::thread::sleep(Duration::from_secs_f32(FRAME_DT));
                    clock.delta()
                } else {
                    FRAME_DT
                };
                let input = autopilot::plan(&sim);
                sim.advance(delta, &input);

                spawned += sim
                    .take_events()
                    .iter()
                    .filter(|e| matches!(e, SimEvent::ObstacleSpawned { .. }))
                    .count();

                if sim.frames() % HUD_LOG_INTERVAL == 0 {
                    let hud = sim.hud();
                    log::info!(
                        "Distance: {}m | Speed: {}% | Obstacles live: {}",
                        hud.distance,
                        hud.speed_percent,
                        sim.obstacles().obstacles().len()
                    );
                }
            }

            let distance = match sim.game_over() {
                Some(over) => over.final_distance,
                None => sim.hud().distance,
            };
            best = best.max(distance);
            println!(
                "Run {}: {}m in {} frames, {} obstacles spawned{}",
                run,
                distance,
                sim.frames(),
                spawned,
                if sim.status() == RunStatus::Playing {
                    " (time limit)"
                } else {
                    ""
                }
            );
        }

        println!("Best distance: {}m", best);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {}
