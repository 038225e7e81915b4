//! Boleto interchange CLI
//!
//! # Usage
//!
//! ```bash
//! boleto-interchange remit --profile beneficiary.toml --boletos boletos.csv --sequence 12
//! boleto-interchange reconcile --return-file RETORNO.RET --boletos boletos.csv --output updated.csv
//! boleto-interchange reconcile --strategy sync --as-of 2024-06-30 --return-file RETORNO.RET --boletos boletos.csv
//! boleto-interchange sweep-overdue --boletos boletos.csv --output updated.csv
//! ```
//!
//! Logs are written to stderr; set `RUST_LOG` to override `--log-level`.
//!
//! # Exit Codes
//!
//! - 0: Success (rejected events do not change the exit code)
//! - 1: Error (bad arguments, missing files, structurally invalid return file, etc.)

use boleto_interchange::{cli, telemetry};
use std::process;

fn main() {
    let args = cli::parse_args();
    telemetry::init(&args.log_level);

    if let Err(e) = cli::run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
