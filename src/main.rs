//! Noir Camera CLI
//!
//! Drives the whole viewfinder against simulated hardware: a mock capture
//! session, a fixed device inventory and a display surface that logs what
//! it would draw.

use clap::Parser;
use noir_camera::{
    bridge::{FrameSlot, NoirFilter},
    capture::{CaptureGraph, Dimensions, FileConfig, Frame, MockBackend},
    metrics::{MetricsRegistry, MetricsSnapshot},
    render::{RenderTarget, Renderer, Surface},
    session::{AuthorizationStatus, SessionFacade, StaticAuthorization},
    usecase::{Action, Environment, State, StoreHandle},
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const CONFIGURE_TIMEOUT: Duration = Duration::from_secs(5);

/// Live noir viewfinder over a simulated camera.
#[derive(Debug, Parser)]
#[command(name = "noir-camera", version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames to capture before exiting (overrides the config file).
    #[arg(long)]
    frames: Option<u64>,

    /// Run until interrupted.
    #[arg(long)]
    continuous: bool,

    /// Camera permission at launch.
    #[arg(long, value_enum, default_value = "authorized")]
    authorization: AuthorizationStatus,

    /// Answer "no" when access is requested.
    #[arg(long)]
    deny_request: bool,

    /// Switch camera every N frames (0 never switches).
    #[arg(long, default_value_t = 0)]
    switch_every: u64,

    /// Take a picture once this many frames have arrived.
    #[arg(long)]
    picture_at: Option<u64>,

    /// Port for the Prometheus exporter.
    #[cfg(feature = "metrics")]
    #[arg(long)]
    metrics_port: Option<u16>,
}

/// Surface that logs presentations instead of drawing them.
struct LogSurface {
    size: Dimensions,
    presented: AtomicU64,
}

impl Surface for LogSurface {
    fn drawable_size(&self) -> Dimensions {
        self.size
    }

    fn present(&self, frame: &Frame, scale: f64) {
        self.presented.fetch_add(1, Ordering::Relaxed);
        trace!(
            sequence = frame.sequence(),
            source = %frame.connection().source,
            mirrored = frame.connection().mirrored,
            scale,
            "Presented frame"
        );
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    // Initialize logging; RUST_LOG wins over the config file
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .init();

    info!("Noir Camera v{}", noir_camera::VERSION);
    info!("This is a demonstration using a simulated capture session");

    let frame_budget = args.frames.unwrap_or(config.output.frame_count as u64);
    let continuous = args.continuous || config.output.continuous;

    // Capture side
    let backend = MockBackend::new().with_frame_rate(config.capture.fps);
    let graph = CaptureGraph::new(
        Box::new(backend.clone()),
        Arc::new(config.directory()),
        config.capture.clone(),
    );
    let authorization = Arc::new(StaticAuthorization::new(
        args.authorization,
        !args.deny_request,
    ));
    let session = SessionFacade::new(graph, authorization);

    // Display side
    let slot = Arc::new(FrameSlot::new());
    let renderer = Arc::new(Renderer::new(Arc::clone(&slot)));
    let surface = Arc::new(LogSurface {
        size: Dimensions::new(1170, 2532),
        presented: AtomicU64::new(0),
    });

    let registry = match MetricsRegistry::new() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };

    #[cfg(feature = "metrics")]
    let exporter = {
        use noir_camera::metrics::{MetricsServer, MetricsServerConfig};

        let port = args.metrics_port.unwrap_or(config.output.metrics_port);
        if port == 0 {
            None
        } else {
            let server =
                MetricsServer::new(MetricsServerConfig::with_port(port), Arc::clone(&registry));
            let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
            let task = tokio::spawn(server.run(async {
                let _ = stopped.await;
            }));
            Some((stop, task))
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    let (store, store_task) = StoreHandle::spawn(
        State::default(),
        Environment::new(
            session.clone(),
            renderer,
            NoirFilter::new(config.filter.contrast),
        ),
    );

    store.send(Action::ConfigureRenderTarget(RenderTarget::new(
        Arc::clone(&surface) as Arc<dyn Surface>,
    )));
    store.send(Action::ViewDidLoad);
    store.send(Action::ViewWillAppear);

    if continuous {
        info!("Capturing until interrupted");
    } else {
        info!(frames = frame_budget, "Capturing");
    }

    let started = Instant::now();
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut next_switch = args.switch_every;
    let mut picture_requested = false;
    let mut picture_reported = false;
    let mut position = None;

    while running.load(Ordering::SeqCst) {
        ticker.tick().await;

        let state = store.state();
        let stats = slot.stats();
        registry.update(&MetricsSnapshot::from_components(
            &state,
            stats,
            store.actions_processed(),
        ));

        if !state.is_configured {
            let status = session.authorization_status();
            let refused = matches!(
                status,
                AuthorizationStatus::Denied | AuthorizationStatus::Restricted
            );
            if refused && store.actions_processed() >= 3 {
                warn!(status = ?status, "Camera access not available");
                break;
            }
            if started.elapsed() > CONFIGURE_TIMEOUT {
                error!("Capture session did not configure in time");
                break;
            }
            continue;
        }

        let current = session.current_position().await;
        if current != position {
            if let Some(camera) = current {
                info!(position = %camera, "Camera active");
            }
            position = current;
        }

        if args.switch_every > 0 && stats.stored >= next_switch {
            if !state.is_changing_camera {
                store.send(Action::SwitchCameraTapped);
            }
            next_switch = stats.stored + args.switch_every;
        }

        if let Some(at) = args.picture_at {
            if !picture_requested && stats.stored >= at {
                info!(frame = stats.stored, "Taking picture");
                store.send(Action::TakePictureTapped);
                picture_requested = true;
            }
        }

        if !picture_reported {
            if let Some(image) = &state.captured_image {
                info!(
                    sequence = image.sequence(),
                    size = %image.dimensions(),
                    "Picture taken"
                );
                picture_reported = true;
            }
        }

        if !continuous && stats.stored >= frame_budget {
            break;
        }
    }

    store.shutdown();
    if let Err(e) = store_task.await {
        warn!("Store task failed: {}", e);
    }
    backend.stop_running();

    let state = store.state();
    let stats = slot.stats();
    registry.update(&MetricsSnapshot::from_components(
        &state,
        stats,
        store.actions_processed(),
    ));

    #[cfg(feature = "metrics")]
    if let Some((stop, task)) = exporter {
        let _ = stop.send(());
        match task.await {
            Ok(Err(e)) => warn!("Metrics server failed: {}", e),
            Err(e) => warn!("Metrics server task failed: {}", e),
            Ok(Ok(())) => {}
        }
    }

    info!(
        "Received {} frames: {} rendered, {} dropped, {} presented",
        stats.stored,
        stats.rendered,
        stats.dropped,
        surface.presented.load(Ordering::Relaxed)
    );
    info!(
        authorized = state.is_authorized,
        configured = state.is_configured,
        picture = state.captured_image.is_some(),
        actions = store.actions_processed(),
        "Done"
    );

    match registry.encode() {
        Ok(output) => debug!("Final metrics:\n{}", output),
        Err(e) => warn!("Failed to encode metrics: {}", e),
    }
}
