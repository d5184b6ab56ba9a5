use crate::config::{GridConfig, load_config};
use crate::interaction::GridSession;
use crate::ir::{LayoutDocument, parse_document};
use crate::layout::{CompactType, GridSize, LayoutItem, find_first_fit, find_nearest_fit};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gridlr", version, about = "Grid layout packing and collision resolution")]
pub struct Args {
    /// Input JSON (layout array or {layout, children}) or '-' for stdin
    #[arg(short = 'i', long = "input", global = true)]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output", global = true)]
    pub output: Option<PathBuf>,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    /// Column count
    #[arg(long = "cols", global = true)]
    pub cols: Option<i32>,

    /// Compaction mode: vertical, horizontal or none
    #[arg(long = "compact", global = true, value_parser = parse_compact)]
    pub compact: Option<CompactType>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compact a layout
    Compact,
    /// Move one item, then compact
    Move {
        #[arg(long)]
        id: String,
        #[arg(long)]
        x: i32,
        #[arg(long)]
        y: i32,
        /// Revert the move instead of pushing neighbours
        #[arg(long)]
        prevent_collision: bool,
    },
    /// Find a free slot for a w x h box
    Fit {
        #[arg(long)]
        w: i32,
        #[arg(long)]
        h: i32,
        /// Target point "X,Y" for a nearest-fit search
        #[arg(long, value_parser = parse_point)]
        near: Option<(f64, f64)>,
    },
    /// Rebuild the layout from the document's children
    Sync,
    /// Summarize rows, collisions and pixel geometry
    Dump,
}

fn parse_compact(token: &str) -> std::result::Result<CompactType, String> {
    CompactType::from_token(token)
        .ok_or_else(|| format!("unknown compact type `{token}` (vertical, horizontal, none)"))
}

fn parse_point(token: &str) -> std::result::Result<(f64, f64), String> {
    let (x, y) = token
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got `{token}`"))?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(cols) = args.cols {
        anyhow::ensure!(cols > 0, "--cols must be positive, got {cols}");
        config.cols = cols;
    }
    if let Some(compact_type) = args.compact {
        config.compact_type = compact_type;
        config.vertical_compact = true;
    }

    let input = read_input(args.input.as_deref())?;
    let document = parse_document(&input)?;
    tracing::debug!(
        message = "cli.input",
        items = document.layout.len(),
        children = document.children.as_ref().map(Vec::len)
    );

    match args.command {
        Command::Compact => {
            let session = GridSession::new(config, document.layout);
            write_json(&session.into_layout(), args.output.as_deref())
        }
        Command::Move {
            id,
            x,
            y,
            prevent_collision,
        } => {
            config.prevent_collision |= prevent_collision;
            let layout = run_move(config, document, &id, x, y)?;
            write_json(&layout, args.output.as_deref())
        }
        Command::Fit { w, h, near } => {
            let size = GridSize::new(w, h);
            let found = match near {
                Some((x, y)) => {
                    find_nearest_fit(&document.layout, size, config.cols, x, y, config.max_rows)
                }
                None => find_first_fit(&document.layout, size, config.cols, config.max_rows),
            };
            write_json(&found, args.output.as_deref())
        }
        Command::Sync => {
            let children = document
                .children
                .ok_or_else(|| anyhow::anyhow!("sync needs a document with `children`"))?;
            let mut session = GridSession::new(config, document.layout);
            session.sync_children(&children);
            write_json(&session.into_layout(), args.output.as_deref())
        }
        Command::Dump => {
            let session = GridSession::new(config, document.layout);
            match args.output.as_deref() {
                Some(path) => write_layout_dump(path, session.layout(), session.config()),
                None => write_json(
                    &LayoutDump::from_layout(session.layout(), session.config()),
                    None,
                ),
            }
        }
    }
}

fn run_move(
    config: GridConfig,
    document: LayoutDocument,
    id: &str,
    x: i32,
    y: i32,
) -> Result<Vec<LayoutItem>> {
    let mut session = GridSession::new(config, document.layout);
    if session.drag_start(id)?.is_none() {
        tracing::warn!(message = "cli.move.skipped", id);
        return Ok(session.into_layout());
    }
    session.drag_stop(id, x, y);
    Ok(session.into_layout())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GRIDLR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}
