use anyhow::Result;
use clap::Parser;
use photobooth::config::HardwareBackend;
use photobooth::{
    BoothAdapters, BoothConfig, BoothOrchestrator, CaptureAdapter, CommandCamera, EventBus,
    FramebufferDisplay, KeyboardSignals, MockCamera, SignalAdapter, SysfsSignals,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(name = "photobooth")]
#[command(about = "Photo booth kiosk controller")]
#[command(version)]
#[command(long_about = "Drives a photo booth: waits for the button, prompts poses on screen, \
takes a fixed series of photos with LED and flash feedback, replays them and optionally \
uploads them. Designed to run as a systemd service on a Raspberry Pi.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "photobooth.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting the booth")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Dry run mode - initialize but don't wait for triggers
    #[arg(long, help = "Open hardware and run startup, then release everything and exit")]
    dry_run: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Also write logs to daily files in this directory
    #[arg(long, value_name = "DIR", help = "Directory for rotating log files")]
    log_dir: Option<PathBuf>,

    /// Use the space bar as the button
    #[arg(long, help = "Use the keyboard trigger backend regardless of configuration")]
    keyboard: bool,

    /// Replace the camera with one that writes blank images
    #[arg(long, help = "Use a mock camera instead of the still-capture command")]
    mock_camera: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle special modes that don't require full initialization
    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&args)?;

    info!("Starting photo booth v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = match BoothConfig::load_from_file(&args.config) {
        Ok(config) => {
            info!("Configuration loaded successfully from: {}", args.config);
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if args.validate_config {
        info!("Configuration validation successful");
        println!("✓ Configuration is valid");
        return Ok(());
    }

    let config = Arc::new(config);
    let event_bus = Arc::new(if args.debug {
        EventBus::with_debug_logging(config.system.event_bus_capacity)
    } else {
        EventBus::new(config.system.event_bus_capacity)
    });

    let adapters = build_adapters(&args, &config, &event_bus).map_err(|e| {
        error!("Failed to open booth hardware: {}", e);
        e
    })?;

    let mut orchestrator = BoothOrchestrator::new(Arc::clone(&config), event_bus, adapters)
        .map_err(|e| {
            error!("Failed to create orchestrator: {}", e);
            e
        })?;

    if let Err(e) = orchestrator.initialize().await {
        error!("Failed to initialize booth: {}", e);
        orchestrator.shutdown().await?;
        return Err(e.into());
    }

    if args.dry_run {
        let exit_code = orchestrator.shutdown().await?;
        info!("Dry run mode - booth initialized and released");
        println!("✓ Dry run completed successfully - all components initialized");
        std::process::exit(exit_code);
    }

    let exit_code = orchestrator.run().await.map_err(|e| {
        error!("System error during execution: {}", e);
        e
    })?;

    info!("Photo booth exited with code: {}", exit_code);

    // Exit with appropriate code for systemd
    std::process::exit(exit_code);
}

fn build_adapters(
    args: &Args,
    config: &BoothConfig,
    event_bus: &Arc<EventBus>,
) -> Result<BoothAdapters> {
    let backend = if args.keyboard {
        HardwareBackend::Keyboard
    } else {
        config.hardware.backend
    };

    let signals: Arc<dyn SignalAdapter> = match backend {
        HardwareBackend::Sysfs => Arc::new(SysfsSignals::new(&config.hardware)?),
        HardwareBackend::Keyboard => Arc::new(KeyboardSignals::start(Arc::clone(event_bus))),
        HardwareBackend::Evdev => evdev_signals(config)?,
    };
    info!("Using {:?} trigger backend", backend);

    let camera: Arc<dyn CaptureAdapter> = if args.mock_camera {
        warn!("Using mock camera, photos will be blank");
        Arc::new(MockCamera::new().writing_images(config.display.resolution))
    } else {
        Arc::new(CommandCamera::new(&config.camera))
    };

    Ok(BoothAdapters {
        signals,
        camera,
        display: Arc::new(FramebufferDisplay::new(&config.display)?),
        uploader: photobooth::upload::from_config(&config.upload),
    })
}

#[cfg(all(target_os = "linux", feature = "evdev"))]
fn evdev_signals(config: &BoothConfig) -> Result<Arc<dyn SignalAdapter>> {
    Ok(Arc::new(photobooth::hardware::EvdevSignals::new(
        &config.hardware,
    )?))
}

#[cfg(not(all(target_os = "linux", feature = "evdev")))]
fn evdev_signals(_config: &BoothConfig) -> Result<Arc<dyn SignalAdapter>> {
    anyhow::bail!("evdev backend requires Linux and the `evdev` feature")
}

fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("photobooth={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    let (file_layer, guard) = match &args.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "photobooth.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(file_layer)
        .with(env_filter)
        .init();

    Ok(guard)
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# Photo booth configuration file");
    println!("# This is the default configuration with all available options");
    println!();
    print!("{}", toml::to_string_pretty(&BoothConfig::default())?);
    Ok(())
}
