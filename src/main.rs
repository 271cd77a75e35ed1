use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use wgpeers::cli::{self, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string().to_lowercase()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_path();
    let file = cli.file.as_deref();

    let result = match cli.command {
        Commands::List { json } => cli::commands::cmd_list(config, file, json),
        Commands::Show { ref selector, json } => {
            cli::commands::cmd_show(config, file, selector, json)
        }
        Commands::Add(args) => cli::commands::cmd_add(config, file, args),
        Commands::Delete { public_key } => cli::commands::cmd_delete(config, file, public_key),
        Commands::NextIp => cli::commands::cmd_next_ip(config, file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
