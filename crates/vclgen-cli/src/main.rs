//! `vclgen` binary entrypoint.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = vclgen_cli::run().await;
    process::exit(exit_code);
}
