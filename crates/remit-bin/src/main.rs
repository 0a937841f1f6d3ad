// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! remit - payments portal and employee review portal.

use remit_bin::error::report_error_and_exit;
use remit_bin::{Cli, Commands, commands, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // hash-password prints the hash on stdout; keep logs out of it
    if !matches!(cli.command, Some(Commands::HashPassword(_)) | Some(Commands::Version)) {
        init_logging(cli.effective_log_level(), cli.log_format);
    }

    if let Err(e) = commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
