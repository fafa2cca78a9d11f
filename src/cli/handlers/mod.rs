use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::InfoJson;
use crate::io::{paths, recovery, tab_io};
use crate::model::{Tablature, VisibleMeta};
use crate::tui::render::staff::render_text;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Print(args) => cmd_print(args),
        Commands::Info(args) => cmd_info(args),
        Commands::Recovery(args) => cmd_recovery(args, &paths::state_dir()),
    }
}

/// Unlike the editor, the read commands need the file to exist
fn load_existing(path: &Path) -> Result<Tablature, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("{}: no such file", path.display()).into());
    }
    Ok(tab_io::load(path)?)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_print(args: PrintArgs) -> Result<(), Box<dyn std::error::Error>> {
    let meta = VisibleMeta::parse(&args.meta)
        .ok_or_else(|| format!("unknown meta kind '{}' (meter, number, label, length)", args.meta))?;
    if args.width < 8 {
        return Err(format!("width {} is too narrow", args.width).into());
    }
    let tab = load_existing(&args.file)?;
    print!("{}", render_text(&tab, args.width, meta));
    Ok(())
}

fn cmd_info(args: InfoArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tab = load_existing(&args.file)?;
    let info = InfoJson::from_tab(&tab);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", args.file.display());
        for line in info.lines() {
            println!("  {line}");
        }
    }
    Ok(())
}

fn cmd_recovery(args: RecoveryArgs, state_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut entries = recovery::read_recovery_entries(state_dir, Some(args.limit));
    if entries.is_empty() {
        println!("no recovery entries");
        return Ok(());
    }
    // Oldest first, so the latest entry ends up next to the prompt
    entries.reverse();
    for entry in &entries {
        println!("{}", entry.summary());
        if args.full {
            println!("{}", entry.body);
        }
    }
    Ok(())
}
