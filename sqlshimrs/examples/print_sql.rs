use std::{env, fs, path::PathBuf};

use sqlshim::{Command, DialectKind, SqlshimConfig, Translator};
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!("Usage: print_sql <dialect> <command_json> [datasource]");
    eprintln!("Example: cargo run --example print_sql -- oracle demos/paged_select.json");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    if args.len() < 2 {
        usage();
        std::process::exit(1);
    }

    let dialect: DialectKind = args.remove(0).parse()?;
    let command_path = PathBuf::from(args.remove(0));
    let config = match args.first() {
        Some(datasource) => SqlshimConfig::load_default().for_datasource(datasource),
        None => SqlshimConfig::load_default().defaults,
    };

    let command_str = fs::read_to_string(command_path)?;
    let command: Command = serde_json::from_str(&command_str)?;

    let translator = Translator::new(dialect, &config)?;
    let translated = translator.translate(&command)?;
    println!("{}", translated.sql);
    if !translated.bind_values.is_empty() {
        println!("{}", serde_json::to_string_pretty(&translated.bind_values)?);
    }
    Ok(())
}
