//! `form-watch`: inspect how a form change maps onto watch paths.
//!
//! Usage:
//!   form-watch [--flatten]        < '{"schema": ..., "changed": ..., "all": ...}'
//!   form-watch variants '<path>'  < schema.json
//!
//! Set `RUST_LOG=form_watch=debug` to trace flattening and dispatch.

use form_watch::cli::{map_request, variants_request};
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let result = match args.first().map(String::as_str) {
        Some("variants") => match args.get(1) {
            Some(path) => variants_request(buf.trim(), path),
            None => {
                eprintln!("`variants` needs a path argument.");
                std::process::exit(1);
            }
        },
        Some("--flatten") => map_request(buf.trim(), true),
        None => map_request(buf.trim(), false),
        Some(other) => {
            eprintln!("Unknown argument: {other}");
            std::process::exit(1);
        }
    };

    match result {
        Ok(out) => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{out}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
