// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version() -> BinResult<()> {
    println!("ualink - OPC UA endpoint discovery and value coding");
    println!();
    println!("Version Information:");
    println!("  ualink-bin:    {}", crate::VERSION);
    println!("  ualink-core:   {}", ualink_core::VERSION);
    println!("  ualink-opcua:  {}", ualink_opcua::VERSION);
    println!("  ualink-config: {}", ualink_config::VERSION);
    println!();
    println!("Build Information:");
    println!("  Rust Edition: 2024");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
