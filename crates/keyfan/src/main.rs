//! keyfan CLI application
//!
//! Copies access keys from Azure resources into an Azure Key Vault. See the
//! readme for manifest formats and flag usage.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod run;

use clap::Parser;
use cli::{Cli, EXIT_OK, exit_code_for, render_error};

/// Exit code for SIGINT (128 + signal number 2)
const EXIT_SIGINT: i32 = 130;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing
    // infrastructure may be corrupted during a panic.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = Cli::parse();
    init_tracing(&cli);

    let exit_code = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt.block_on(run_with_signals(cli)),
        Err(e) => {
            eprintln!("Fatal error: failed to create tokio runtime: {e}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Run the CLI, preferring signal handling over normal completion so a
/// Ctrl-C mid-batch exits promptly with the conventional code.
async fn run_with_signals(cli: Cli) -> i32 {
    let json_mode = cli.json;
    tokio::select! {
        biased;

        _ = tokio::signal::ctrl_c() => EXIT_SIGINT,
        result = run::run(cli) => match result {
            Ok(()) => EXIT_OK,
            Err(err) => {
                render_error(&err, json_mode);
                exit_code_for(&err)
            }
        },
    }
}

/// Initialize tracing to stderr. `RUST_LOG` overrides `--level`.
fn init_tracing(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}
