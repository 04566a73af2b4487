#![forbid(unsafe_code)]

use clap::Parser;
use dragsort_harness::cli::{Cli, run};

fn main() {
    let cli = Cli::parse();
    dragsort_harness::logging::init(cli.log_json);
    let json_errors = cli.log_json;
    if let Err(error) = run(cli, &mut std::io::stdout().lock()) {
        if json_errors {
            eprintln!(
                "{}",
                serde_json::json!({
                    "status": "error",
                    "error": error.to_string(),
                    "exit_code": error.exit_code(),
                })
            );
        } else {
            eprintln!("{error}");
        }
        std::process::exit(error.exit_code());
    }
}
