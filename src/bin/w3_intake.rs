use std::{env, process};

use w3_intake::{cli::run_cli, init};

#[tokio::main]
async fn main() {
    init();

    if let Err(err) = run_cli(env::args().skip(1)).await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
