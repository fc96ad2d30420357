//! Pairlink relay client.
//!
//! Run the end-to-end smoke test:
//! ```not_rust
//! cargo run --bin pairlink-client -- smoke --url ws://localhost:3001/ws
//! ```
//!
//! Or open an interactive prompt:
//! ```not_rust
//! cargo run --bin pairlink-client -- repl --url ws://localhost:3001/ws
//! ```

use std::time::Duration;

use clap::{Parser, Subcommand};
use pairlink_client::{SmokeTest, run_repl};
use pairlink_shared::logger::setup_logger;

/// Overall limit for a smoke run
const SMOKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Parser)]
#[command(name = "pairlink-client", version, about = "Client for the Pairlink relay server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pair two connections through the relay and check every event
    Smoke {
        /// WebSocket endpoint of the relay
        #[arg(long, env = "WEBSOCKET_URL", default_value = "ws://localhost:3001/ws")]
        url: String,

        /// Session to use; defaults to test-session-<millis>
        #[arg(long)]
        session: Option<String>,
    },
    /// Interactive prompt
    Repl {
        /// WebSocket endpoint of the relay
        #[arg(long, env = "WEBSOCKET_URL", default_value = "ws://localhost:3001/ws")]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let cli = Cli::parse();
    let code = match cli.command {
        Command::Smoke { url, session } => smoke(url, session).await,
        Command::Repl { url } => match run_repl(&url).await {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!("Client error: {}", e);
                1
            }
        },
    };
    std::process::exit(code);
}

async fn smoke(url: String, session: Option<String>) -> i32 {
    let smoke = SmokeTest::new(url, session);

    let report = match tokio::time::timeout(SMOKE_TIMEOUT, smoke.run()).await {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            println!("Connection failed: {e}");
            return 1;
        }
        Err(_) => {
            println!("Test timeout reached");
            return 1;
        }
    };

    println!();
    println!("Test Results:");
    println!("Tests passed: {}", report.passed());
    println!("Tests failed: {}", report.failed());
    println!("Success rate: {:.1}%", report.success_rate());

    if report.all_passed() {
        println!("All tests passed! WebSocket server is working correctly.");
        0
    } else {
        println!("Some tests failed. Check the server logs for details.");
        1
    }
}
