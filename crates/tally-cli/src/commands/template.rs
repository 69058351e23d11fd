//! Template command implementation

use anyhow::Result;

/// Execute the template command. Needs no config file.
pub async fn execute() -> Result<()> {
    let path = tally_ledger::template_path();
    if !path.exists() {
        eprintln!("Warning: migration template is missing: {}", path.display());
    }
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
