//! Pixelpress - an HTTP image transformation service.
//!
//! This binary starts the HTTP server and configures all components.

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixelpress::{
    config::Config,
    pipeline::{Pipeline, PipelineLimits},
    server::{create_router, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    info!("  Deadline: {}s per operation", config.deadline_secs);
    info!("  Max dimension: {}px", config.max_dimension);
    info!(
        "  Max upload: {}MB",
        config.max_upload_bytes / (1024 * 1024)
    );
    info!("  JPEG quality: {}", config.jpeg_quality);

    if config.no_rate_limit {
        warn!("  Rate limiting: DISABLED");
    } else {
        info!(
            "  Rate limit: {} requests per {}s per IP",
            config.rate_limit_max, config.rate_limit_window_secs
        );
    }

    // Create the pipeline
    let pipeline = Pipeline::new(PipelineLimits {
        deadline: config.deadline(),
        max_dimension: config.max_dimension,
        jpeg_quality: config.jpeg_quality,
    });

    // Build router configuration
    let router_config = build_router_config(&config);

    // Create router
    let router = create_router(pipeline, router_config);

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("Server listening on: http://{}", addr);
    info!("");
    info!("Try these endpoints:");
    info!("  curl http://{}/health", addr);
    info!(
        "  curl -F metadata='{{\"angle\": 90}}' -F image=@photo.png http://{}/rotate",
        addr
    );
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    // ConnectInfo is what the rate limiter reads the peer address from.
    if let Err(e) = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "pixelpress=debug,tower_http=debug"
    } else {
        "pixelpress=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_max_upload_bytes(config.max_upload_bytes);

    router_config = if config.no_rate_limit {
        router_config.without_rate_limit()
    } else {
        router_config.with_rate_limit(config.rate_limit_max, config.rate_limit_window())
    };

    // Apply CORS origins
    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    // Apply tracing setting
    router_config = router_config.with_tracing(!config.no_tracing);

    router_config
}
