/* 📖 # Why is the CLI minimal and hardcoded?

There is no argument parsing. `chessdesk` reads `chessdesk.toml` from the
current directory (or runs with defaults when there is none), seeds the staff
accounts, validates the module registry and serves the console until the
process is stopped.

Exit codes:
- 1: the configuration could not be loaded or the server could not start
*/

use std::env;
use std::process;
use std::thread;
use std::time::Duration;

use chessdesk_base::tracing::init_tracing;
use chessdesk_base::{FilePath, PalHandle, RealPal};
use chessdesk_engine::{ConsoleContext, ConsoleService, Registry, load_config, seed_users};
use tracing::{info, warn};

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Error: Failed to initialize tracing: {}", e);
        process::exit(1);
    }

    let current_dir = env::current_dir().unwrap_or_else(|e| {
        eprintln!("Error: Failed to get current directory: {}", e);
        process::exit(1);
    });

    let pal = PalHandle::new(RealPal::new(current_dir));

    let config = match load_config(&pal, &FilePath::from("chessdesk.toml")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config from chessdesk.toml: {}", e);
            process::exit(1);
        }
    };

    let context = ConsoleContext::in_memory();
    if let Err(e) = seed_users(&context.records, &config.users) {
        eprintln!("Error: Failed to seed staff accounts: {}", e);
        process::exit(1);
    }

    let registry = Registry::new();
    for issue in registry.validate() {
        warn!(%issue, "registry issue");
    }

    let service = ConsoleService::new(config.title.clone(), registry, &context);
    let handle = match pal.start_http_server(Box::new(service), config.http_config()) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: Failed to start HTTP server: {}", e);
            process::exit(1);
        }
    };

    let address = handle.address(&config.server.host);
    info!(%address, "console started");
    println!("{} running at http://{}/api/site", config.title, address);

    while !handle.is_shutdown() {
        thread::sleep(Duration::from_millis(500));
    }
}
