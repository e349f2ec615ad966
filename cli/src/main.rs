use cmdtree_core::{CmdOption, Command, DefinitionError, HelpConfig, Invocation};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings the `config get` command can read back.
const KNOWN_SETTINGS: &[(&str, &str)] = &[
    ("host", "127.0.0.1"),
    ("port", "8080"),
    ("workers", "4"),
];

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("CMDTREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let root = match build_cli() {
        Ok(root) => root,
        Err(err) => {
            eprintln!("error: invalid command tree: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = root.run(std::env::args()) {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

fn build_cli() -> Result<Command, DefinitionError> {
    let serve = Command::new("serve")
        .with_description("Start the demo service in the foreground")
        .with_option(
            CmdOption::string(Some("host"), None)
                .with_env("DEMO_HOST")
                .with_description("Address to bind")
                .with_default("127.0.0.1"),
        )?
        .with_option(
            CmdOption::int(Some("port"), Some('p'))
                .with_env("DEMO_PORT")
                .with_description("Port to listen on")
                .with_default(8080),
        )?
        .with_option(
            CmdOption::int(Some("workers"), Some('w'))
                .with_description("Worker thread count")
                .with_default(4),
        )?
        .with_option(
            CmdOption::float(Some("timeout"), Some('t'))
                .with_description("Request timeout in seconds")
                .with_default(30.0),
        )?
        .with_option(
            CmdOption::boolean(Some("verbose"), Some('v'))
                .with_description("Log every request")
                .with_default(false),
        )?
        .with_action(run_serve);

    let status = Command::new("status")
        .with_description("Show service status")
        .with_option(
            CmdOption::string(Some("format"), Some('f'))
                .with_description("Output format: text or json")
                .with_default("text"),
        )?
        .with_action(run_status);

    let get = Command::new("get")
        .with_description("Print a setting")
        .with_option(CmdOption::string(Some("key"), Some('k')).with_description("Setting name"))?
        .with_action(run_config_get);

    let set = Command::new("set")
        .with_description("Change a setting (dry run)")
        .with_option(CmdOption::string(Some("key"), Some('k')).with_description("Setting name"))?
        .with_option(CmdOption::string(Some("value"), None).with_description("New value"))?
        .with_action(run_config_set);

    let config = Command::new("config")
        .with_description("Inspect or change settings")
        .with_subcommand(get)?
        .with_subcommand(set)?;

    let help = Command::new("help")
        .with_description("Show usage for the current command")
        .with_action(run_help);

    let describe = Command::new("describe")
        .with_description("Print the command tree as JSON")
        .with_action(run_describe);

    let version = Command::new("version")
        .with_description("Print the version")
        .with_action(|_| {
            println!("cmdtree-demo {PACKAGE_VERSION}");
            0
        });

    Command::new("")
        .with_description("Control a demo service")
        .with_help_config(HelpConfig {
            column_width: 28,
            ..HelpConfig::default()
        })
        .with_subcommand(serve)?
        .with_subcommand(status)?
        .with_subcommand(config)?
        .with_subcommand(version)?
        .with_public_subcommand(help)?
        .with_public_subcommand(describe)
}

fn run_serve(inv: &Invocation<'_>) -> i32 {
    let host = inv.get_str("host").unwrap_or_default();
    let port = inv.get_int("port").unwrap_or_default();
    let workers = inv.get_int("workers").unwrap_or_default();
    let timeout = inv.get_float("timeout").unwrap_or_default();

    if workers == 0 {
        eprintln!("error: --workers must be at least 1");
        return 2;
    }

    info!(host, port, workers, "starting service");
    println!("serving on {host}:{port} with {workers} workers (timeout {timeout}s)");
    if inv.get_bool("verbose").unwrap_or_default() {
        println!("request logging enabled");
    }
    0
}

fn run_status(inv: &Invocation<'_>) -> i32 {
    match inv.get_str("format").unwrap_or("text") {
        "text" => {
            println!("status: stopped");
            0
        }
        "json" => {
            let status = serde_json::json!({ "state": "stopped", "version": PACKAGE_VERSION });
            println!("{status}");
            0
        }
        other => {
            eprintln!("error: unsupported format '{other}'");
            2
        }
    }
}

fn run_config_get(inv: &Invocation<'_>) -> i32 {
    let key = inv.get_str("key").unwrap_or_default();
    match KNOWN_SETTINGS.iter().find(|(name, _)| *name == key) {
        Some((_, value)) => {
            println!("{value}");
            0
        }
        None => {
            eprintln!("error: unknown setting '{key}'");
            1
        }
    }
}

fn run_config_set(inv: &Invocation<'_>) -> i32 {
    let key = inv.get_str("key").unwrap_or_default();
    let value = inv.get_str("value").unwrap_or_default();
    if !KNOWN_SETTINGS.iter().any(|(name, _)| *name == key) {
        eprintln!("error: unknown setting '{key}'");
        return 1;
    }
    debug!(key, value, "dry run, nothing written");
    println!("would set {key}={value}");
    0
}

fn run_help(inv: &Invocation<'_>) -> i32 {
    print!("{}", inv.parent_usage().unwrap_or_else(|| inv.usage()));
    0
}

fn run_describe(inv: &Invocation<'_>) -> i32 {
    let root = inv.chain()[0];
    match root.describe().to_json_pretty() {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(err) => {
            eprintln!("error: failed to serialize command tree: {err}");
            1
        }
    }
}
