//! Export command implementation.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use somnair_store::Store;

/// Write every observation as CSV, oldest first.
///
/// The output is CSV regardless of `--format`.
pub fn cmd_export(store: &Store, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            store.export_csv(&mut writer)?;
            writer.flush()?;
            debug!("CSV written to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            store.export_csv(&mut stdout)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
