use clap::Parser;
use credswap::cli::{commands, output, Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `credswap=debug`).
const LOG_ENV: &str = "CREDSWAP_LOG";

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Status => commands::status::execute(&cli),
        Commands::Current => commands::current::execute(&cli),
        Commands::List { ref service } => commands::list::execute(&cli, service.as_deref()),
        Commands::Save {
            ref service,
            ref name,
        } => commands::save::execute(&cli, service, name),
        Commands::Switch {
            ref service,
            ref name,
        } => commands::switch::execute(&cli, service, name),
        Commands::Delete {
            ref service,
            ref name,
            force,
        } => commands::delete::execute(&cli, service, name, force),
        Commands::Password { ref action } => commands::password::execute(&cli, action),
        Commands::Export { ref output } => commands::export::execute(&cli, output.as_deref()),
        Commands::Import { ref file } => commands::import_cmd::execute(&cli, file),
        Commands::Usage => commands::usage::execute(&cli),
        Commands::Audit {
            last,
            ref since,
            ref service,
        } => commands::audit_cmd::execute(&cli, last, since.as_deref(), service.as_deref()),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays clean for `export -o -` and completions.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("credswap=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
