//! Navigation kernel demo.
//!
//! Boots a kernel against an in-memory location, registers a few demo
//! components and routes, then navigates the paths given on the command
//! line (or read from stdin with `--interactive`).

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use nav_kernel::config::validation::validate_config;
use nav_kernel::config::{load_config, ConfigError, KernelConfig, RoutingMode};
use nav_kernel::lifecycle::shutdown_signal;
use nav_kernel::navigation::{MemoryLocation, MemoryOverlay, NavigationOutcome};
use nav_kernel::observability::logging::init_logging;
use nav_kernel::{BoxError, Kernel, KernelContext, RouteContext};

const DEFAULT_ORDER: [&str; 3] = ["settings", "session-store", "routes"];

#[derive(Parser)]
#[command(name = "nav-kernel")]
#[command(about = "Drive the navigation kernel against an in-memory location", long_about = None)]
struct Cli {
    /// TOML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base path the application is served under (e.g. /app)
    #[arg(long)]
    base_path: Option<String>,

    /// Route on the URL fragment instead of the path
    #[arg(long)]
    hash: bool,

    /// Read paths, `back` and `forward` from stdin until EOF or Ctrl+C
    #[arg(short, long)]
    interactive: bool,

    /// Internal paths to navigate, in order
    paths: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "nav-kernel demo starting");

    let base = config.navigation.base_path.clone().unwrap_or_default();
    let start_url = match config.navigation.mode {
        RoutingMode::History => format!("{base}/"),
        RoutingMode::Hash => format!("{base}/#/"),
    };
    let location = Arc::new(MemoryLocation::new(&start_url));
    let overlay = Arc::new(MemoryOverlay::new());
    let kernel = Kernel::new(config, location.clone(), overlay.clone());

    register_components(&kernel);
    let _subscription = kernel.session().on_route_change(|path, params| {
        println!("  route changed: {path} {params:?}");
        Ok(())
    });

    if let Some(initial) = kernel.start().await? {
        report("(initial)", &initial, &overlay);
    }

    for path in &cli.paths {
        let outcome = kernel.session().navigate(path).await;
        report(path, &outcome, &overlay);
    }

    if cli.interactive {
        tokio::select! {
            result = interactive(&kernel, &location, &overlay) => result?,
            _ = shutdown_signal() => {}
        }
    }

    kernel.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_config(cli: &Cli) -> Result<KernelConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => KernelConfig::default(),
    };

    if let Some(base_path) = &cli.base_path {
        config.navigation.base_path = Some(base_path.trim_end_matches('/').to_string());
    }
    if cli.hash {
        config.navigation.mode = RoutingMode::Hash;
    }
    if config.bootstrap.order.is_empty() {
        config.bootstrap.order = DEFAULT_ORDER.iter().map(|n| n.to_string()).collect();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn register_components(kernel: &Kernel) {
    let registry = kernel.registry();

    registry.register(
        "settings",
        |ctx: Arc<KernelContext>| async move {
            tracing::info!(
                mode = ?ctx.config.navigation.mode,
                base_path = %ctx.session.base_path(),
                "Settings ready"
            );
            Ok(())
        },
        &[],
    );

    // Fails once to show the retry path.
    let calls = Arc::new(AtomicU32::new(0));
    registry.register(
        "session-store",
        move |_ctx: Arc<KernelContext>| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    return Err::<(), BoxError>("store not reachable yet".into());
                }
                Ok(())
            }
        },
        &["settings"],
    );

    registry.register(
        "routes",
        |ctx: Arc<KernelContext>| async move {
            let routes = ctx.routes();
            routes.register("/", |_| async { Ok(true) })?;
            routes.register("/users/:id", |ctx: RouteContext| async move {
                Ok(ctx.params.get("id").is_some_and(|id| !id.is_empty()))
            })?;
            routes.register("/files/*", |_| async { Ok(true) })?;
            routes.register("/broken", |_| async { Ok(false) })?;
            routes.register("/slow", |ctx: RouteContext| async move {
                tokio::select! {
                    _ = ctx.cancellation.cancelled() => Ok(false),
                    _ = tokio::time::sleep(Duration::from_secs(60)) => Ok(true),
                }
            })?;
            Ok::<_, BoxError>(())
        },
        &["settings", "session-store"],
    );
}

async fn interactive(
    kernel: &Kernel,
    location: &MemoryLocation,
    overlay: &MemoryOverlay,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "back" => {
                if !location.back() {
                    println!("  no earlier entry");
                }
            }
            "forward" => {
                if !location.forward() {
                    println!("  no later entry");
                }
            }
            path => {
                let outcome = kernel.session().navigate(path).await;
                report(path, &outcome, overlay);
            }
        }
    }
    Ok(())
}

fn report(path: &str, outcome: &NavigationOutcome, overlay: &MemoryOverlay) {
    println!("{path} -> {}", outcome.label());
    for notice in overlay.notices() {
        println!("  [{}] {} (return to {})", notice.title, notice.message, notice.return_path);
    }
    overlay.clear();
}
