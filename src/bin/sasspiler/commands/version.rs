//! `sasspiler version` command

use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("sasspiler v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
