//! Public subcommand example.
//!
//! Builds a small tree with a public `help` command registered on the root
//! and resolves a few argument vectors against it, showing how `help`
//! becomes reachable below every command and how an own subcommand of the
//! same name takes priority.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cmdtree-core --example public_help
//! ```

use cmdtree_core::{CmdOption, Command, DefinitionError};

fn main() -> Result<(), DefinitionError> {
    let db = Command::new("db")
        .with_description("Database maintenance")
        .with_subcommand(
            Command::new("migrate")
                .with_description("Apply pending migrations")
                .with_option(
                    CmdOption::string(Some("url"), Some('u'))
                        .with_env("DATABASE_URL")
                        .with_description("Connection string"),
                )?
                .with_option(CmdOption::boolean(Some("dry"), Some('d')).with_default(false))?
                .with_action(|inv| {
                    let url = inv.get_str("url").unwrap_or_default();
                    let dry = inv.get_bool("dry").unwrap_or_default();
                    println!("migrating {url} (dry run: {dry})");
                    0
                }),
        )?
        .with_subcommand(
            Command::new("help").with_action(|_| {
                println!("db has its own help");
                0
            }),
        )?;

    let root = Command::new("")
        .with_description("Operations toolbox")
        .with_subcommand(db)?
        .with_public_subcommand(
            Command::new("help")
                .with_description("Show usage for the current command")
                .with_action(|inv| {
                    print!("{}", inv.parent_usage().unwrap_or_else(|| inv.usage()));
                    0
                }),
        )?;

    let runs: [&[&str]; 5] = [
        &["ops", "help"],
        &["ops", "db", "migrate", "help"],
        &["ops", "db", "help"],
        &["ops", "db", "migrate", "-d", "--url=postgres://localhost/app"],
        &["ops", "db", "migrate"],
    ];

    for args in runs {
        println!("$ {}", args.join(" "));
        if let Err(err) = root.run(args.iter().copied()) {
            println!("error: {err} (exit code {})", err.exit_code());
        }
        println!();
    }

    Ok(())
}
