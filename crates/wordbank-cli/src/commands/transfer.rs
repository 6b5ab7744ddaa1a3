//! The `wordbank export` and `wordbank import` commands.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::Globals;

pub async fn export(globals: &Globals, output: Option<PathBuf>) -> Result<()> {
    let (_, repository) = globals.open_repository().await?;

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let count = repository.export_json(BufWriter::new(file)).await?;
            println!("Exported {count} entries to {}", path.display());
        }
        None => {
            let count = repository.export_json(std::io::stdout().lock()).await?;
            println!();
            eprintln!("Exported {count} entries");
        }
    }
    Ok(())
}

pub async fn import(globals: &Globals, file: PathBuf) -> Result<()> {
    let (_, repository) = globals.open_repository().await?;
    let reader = File::open(&file).with_context(|| format!("failed to open {}", file.display()))?;
    let count = repository
        .import_json(BufReader::new(reader))
        .await
        .with_context(|| format!("failed to import {}", file.display()))?;
    println!("Imported {count} entries");
    Ok(())
}
