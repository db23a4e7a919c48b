use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use kingdom_core::core_api::{CellEntry, Engine, Session};
use kingdom_core::serialization::PatchValue;
use serde_json::{Map as JsonMap, Value as JsonValue};

#[derive(Debug, Parser)]
#[command(version, about = "Inspect and edit Kingdoms and Castles save files")]
struct Cli {
    #[arg(value_name = "SAVE")]
    path: PathBuf,
    #[arg(long = "town-name")]
    town_name: bool,
    #[arg(long)]
    grid: bool,
    #[arg(long)]
    cells: bool,
    #[arg(long)]
    roots: bool,
    #[arg(long)]
    json: bool,
    /// Cell index that subsequent --set edits apply to.
    #[arg(long, value_name = "N")]
    cell: Option<usize>,
    /// Edit spec: `member=value` with --cell, or `CLASS.member=value` for a
    /// root object. Values are `true`, `false`, or a 32-bit integer.
    #[arg(long = "set", value_name = "TARGET=VALUE")]
    sets: Vec<String>,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug)]
enum EditTarget {
    Cell { index: usize, member: String },
    Root { class: String, member: String },
}

#[derive(Debug)]
struct Edit {
    target: EditTarget,
    value: PatchValue,
}

fn main() {
    let cli = Cli::parse();

    if !cli.sets.is_empty() && cli.output.is_none() {
        eprintln!("--set requires --output <PATH>");
        process::exit(2);
    }
    if cli.sets.is_empty() && cli.output.is_some() {
        eprintln!("--output requires at least one --set");
        process::exit(2);
    }
    if cli.cell.is_some() && cli.sets.is_empty() {
        eprintln!("--cell requires at least one --set");
        process::exit(2);
    }

    let edits: Vec<Edit> = cli
        .sets
        .iter()
        .map(|spec| parse_edit(spec, cli.cell))
        .collect::<Result<_, _>>()
        .unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(2);
        });

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let engine = Engine::new();
    let mut session = engine.open_bytes(bytes).unwrap_or_else(|e| {
        eprintln!("Error parsing save file: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    for edit in &edits {
        apply_edit(&mut session, edit).unwrap_or_else(|e| {
            eprintln!("Error applying edit: {e}");
            process::exit(1);
        });
    }

    if let Some(out_path) = &cli.output {
        fs::write(out_path, session.to_bytes()).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
    }

    if cli.json {
        let json = JsonValue::Object(to_json(&session, cli.cells));
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    let field_mode = cli.town_name || cli.grid || cli.cells || cli.roots;
    if field_mode {
        print_fields(&session, &cli);
        return;
    }

    if let Some(out_path) = &cli.output {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    print_summary(&session);
}

fn parse_edit(spec: &str, cell: Option<usize>) -> Result<Edit, String> {
    let (target, raw_value) = spec
        .split_once('=')
        .ok_or_else(|| format!("invalid --set '{spec}', expected TARGET=VALUE"))?;

    let value = parse_value(raw_value)
        .ok_or_else(|| format!("invalid value '{raw_value}', expected true, false, or an integer"))?;

    let target = match cell {
        Some(index) => EditTarget::Cell {
            index,
            member: target.to_string(),
        },
        None => {
            let (class, member) = target.split_once('.').ok_or_else(|| {
                format!("invalid --set target '{target}', expected CLASS.member (or use --cell N)")
            })?;
            EditTarget::Root {
                class: class.to_string(),
                member: member.to_string(),
            }
        }
    };

    Ok(Edit { target, value })
}

fn parse_value(raw: &str) -> Option<PatchValue> {
    match raw {
        "true" => Some(PatchValue::Boolean(true)),
        "false" => Some(PatchValue::Boolean(false)),
        _ => raw.parse::<i32>().ok().map(PatchValue::Int32),
    }
}

fn apply_edit(session: &mut Session, edit: &Edit) -> Result<(), kingdom_core::core_api::CoreError> {
    match &edit.target {
        EditTarget::Cell { index, member } => session.set_cell_field(*index, member, edit.value),
        EditTarget::Root { class, member } => session.set_field(class, member, edit.value),
    }
}

fn print_fields(session: &Session, cli: &Cli) {
    let snapshot = session.snapshot();

    if cli.town_name {
        let name = snapshot.town_name.as_deref().unwrap_or("unknown");
        println!("town_name={name}");
    }
    if cli.grid {
        let width = snapshot
            .grid_width
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let height = snapshot
            .grid_height
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("grid_width={width}");
        println!("grid_height={height}");
    }
    if cli.roots {
        for class in &snapshot.root_classes {
            println!("root={class}");
        }
    }
    if cli.cells {
        for cell in session.cells() {
            println!(
                "cell={} fertile={} deep_water={} salt_water={} amount={}",
                cell.index,
                opt_bool(cell.fertile),
                opt_bool(cell.deep_water),
                opt_bool(cell.salt_water),
                cell.amount
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );
        }
    }
}

fn print_summary(session: &Session) {
    let snapshot = session.snapshot();

    println!(
        "Town: {}",
        snapshot.town_name.as_deref().unwrap_or("(unnamed)")
    );
    match (snapshot.grid_width, snapshot.grid_height) {
        (Some(w), Some(h)) => println!("Grid: {w}x{h}"),
        _ => println!("Grid: unknown"),
    }
    println!("Cells: {}", snapshot.cell_count);
    println!("Root objects:");
    for class in &snapshot.root_classes {
        println!("  {class}");
    }

    let issues = &session.capabilities().issues;
    if !issues.is_empty() {
        println!("Issues:");
        for issue in issues {
            println!("  {issue:?}");
        }
    }
}

fn to_json(session: &Session, include_cells: bool) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    out.insert(
        "town_name".to_string(),
        match &snapshot.town_name {
            Some(name) => JsonValue::String(name.clone()),
            None => JsonValue::Null,
        },
    );
    out.insert(
        "grid_width".to_string(),
        snapshot.grid_width.map(JsonValue::from).unwrap_or(JsonValue::Null),
    );
    out.insert(
        "grid_height".to_string(),
        snapshot.grid_height.map(JsonValue::from).unwrap_or(JsonValue::Null),
    );
    out.insert("cell_count".to_string(), JsonValue::from(snapshot.cell_count));
    out.insert(
        "root_classes".to_string(),
        JsonValue::Array(
            snapshot
                .root_classes
                .iter()
                .map(|c| JsonValue::String(c.clone()))
                .collect(),
        ),
    );
    if include_cells {
        out.insert(
            "cells".to_string(),
            JsonValue::Array(session.cells().iter().map(cell_to_json).collect()),
        );
    }

    out
}

fn cell_to_json(cell: &CellEntry) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("index".to_string(), JsonValue::from(cell.index));
    m.insert("object_id".to_string(), JsonValue::from(cell.object_id));
    m.insert(
        "fertile".to_string(),
        cell.fertile.map(JsonValue::Bool).unwrap_or(JsonValue::Null),
    );
    m.insert(
        "deep_water".to_string(),
        cell.deep_water.map(JsonValue::Bool).unwrap_or(JsonValue::Null),
    );
    m.insert(
        "salt_water".to_string(),
        cell.salt_water.map(JsonValue::Bool).unwrap_or(JsonValue::Null),
    );
    m.insert(
        "amount".to_string(),
        cell.amount.map(JsonValue::from).unwrap_or(JsonValue::Null),
    );
    JsonValue::Object(m)
}

fn opt_bool(v: Option<bool>) -> String {
    match v {
        Some(true) => "true".to_string(),
        Some(false) => "false".to_string(),
        None => "-".to_string(),
    }
}
