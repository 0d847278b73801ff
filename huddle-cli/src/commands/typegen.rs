//! `huddle typegen` writes the browser-side protocol declarations

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

/// Default output file, relative to the working directory
pub const DEFAULT_OUT: &str = "models.ts";

#[derive(Debug, Args)]
pub struct TypegenArgs {
    /// File to write the declarations to
    #[arg(short, long, default_value = DEFAULT_OUT)]
    pub out: PathBuf,
}

pub fn run(args: TypegenArgs) -> Result<()> {
    write_declarations(&args.out)?;
    println!("Wrote {}", args.out.display());
    Ok(())
}

fn write_declarations(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, huddle_core::typegen::render())
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "Wrote TypeScript declarations");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_namespace_to_nested_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("web").join("src").join("models.ts");

        write_declarations(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("export namespace ServerTypes {"));
        assert!(contents.contains("export interface BroadcastFromSessionMsg {"));
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models.ts");
        std::fs::write(&path, "stale").unwrap();

        write_declarations(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("stale"));
    }
}
