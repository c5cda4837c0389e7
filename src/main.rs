use pbxd::{Result, args, config, http, log, log_error, log_info, pbx};

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn main() -> Result<ExitCode> {
    let args = args::main_args();

    // Initialize logging
    let logger = log::Logger::new();
    if args.debug {
        logger.enable_debug();
        if let Err(err) = logger.log_debug("Debug mode enabled") {
            eprintln!("Failed to initialize debug logging: {}", err);
            return Ok(ExitCode::FAILURE);
        }
    }
    if args.wire_log {
        logger.enable_wire_logging();
        log_info!("Wire logging enabled");
    }
    drop(logger);

    let listen: SocketAddr = match args.listen.parse() {
        Ok(listen) => listen,
        Err(err) => {
            log_error!("Invalid listen address {}: {}", args.listen, err);
            return Ok(ExitCode::FAILURE);
        }
    };

    let config = config::ConfigLoader::new(args.config)?.load_config()?;

    let mut terminal = pbx::Terminal::new(
        config.connection_command,
        config.pbx_username,
        config.pbx_password,
        config.command_timeout,
    );

    // Connect before taking traffic, like the original worker model: a
    // worker that cannot reach its PBX should not look ready.
    if let Err(err) = terminal.connect() {
        if err.to_string().contains("Too many logins") {
            // Give the stale login a chance to age out, then let the
            // supervisor respawn this worker.
            log_error!("{}", err);
            std::thread::sleep(Duration::from_secs(10));
            return Ok(ExitCode::FAILURE);
        }
        log_error!("Unable to connect to PBX. {}", err);
        return Ok(ExitCode::FAILURE);
    }

    let state = http::AppState {
        terminal: Arc::new(Mutex::new(terminal)),
        pbx_name: config.pbx_name,
    };
    let app = http::build_router(state.clone(), &config.application_root);

    let runtime = tokio::runtime::Runtime::new()?;
    let served = runtime.block_on(serve(listen, app));

    // Log out of the pbx once the server has drained.
    let mut terminal = state.terminal.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if terminal.connected_mode().is_some() {
        log_info!("Logging out of pbx");
        terminal.disconnect();
    }

    served?;
    Ok(ExitCode::SUCCESS)
}

async fn serve(listen: SocketAddr, app: axum::Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    log_info!("pbxd listening on {}", listen);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await
}

/// Resolves on SIGINT or SIGTERM; axum then stops accepting and drains.
async fn shutdown_signal() {
    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
    log_info!("Shutdown signal received");
}
