// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! ualink - OPC UA endpoint discovery and value coding
//!
//! Main binary entry point.

use ualink_bin::error::report_error_and_exit;
use ualink_bin::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    if let Err(error) = ualink_bin::run(cli).await {
        report_error_and_exit(error);
    }
}
