#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for Card Defence.
//!
//! Loads the balance tables, lays out a demo path, places scripted towers and
//! plays waves until the requested number is cleared, the frame budget runs
//! out or the player loses.

mod tower_spec;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use card_defence_core::{BalanceConfig, Event, FieldConfig, Path, TileCoord};
use card_defence_session::Session;
use card_defence_world::{query, Tower};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::tower_spec::TowerSpec;

#[derive(Debug, Parser)]
#[command(name = "card-defence", about = "Runs a Card Defence session without a display")]
struct Args {
    /// TOML file overriding parts of the default balance tables.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Session seed driving crits, spawn jitter and loot.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Number of waves to clear before stopping.
    #[arg(long, default_value_t = 5)]
    waves: u32,
    /// Upper bound on simulated frames.
    #[arg(long, default_value_t = 36_000)]
    max_frames: u64,
    /// Overrides the starting money.
    #[arg(long)]
    money: Option<u32>,
    /// Field-wide slow in `[0, 1]` applied to every enemy.
    #[arg(long, default_value_t = 0.0)]
    global_slow: f32,
    /// Tower to place, as `COLUMN,ROW=CARD+CARD`, e.g. `3,2=fire:1+ice:2`.
    #[arg(long = "tower", value_name = "TOWER")]
    towers: Vec<TowerSpec>,
}

#[derive(Debug, Default)]
struct Summary {
    frames: u64,
    waves_cleared: u32,
    kills: u32,
    escapes: u32,
    game_over: bool,
}

/// Entry point for the Card Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut session = prepare(&args)?;
    let summary = play(&mut session, &args);
    report(&session, &summary);
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<BalanceConfig> {
    let Some(path) = path else {
        return Ok(BalanceConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read balance file {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("failed to parse balance file {}", path.display()))
}

fn prepare(args: &Args) -> Result<Session> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(money) = args.money {
        config.economy.start_money = money;
    }
    let path = demo_path(&config.field)?;

    let mut session =
        Session::new(config, path, args.seed).context("invalid balance configuration")?;
    session.set_global_slow(args.global_slow);

    for spec in &args.towers {
        let tower = session.place_tower(spec.tile).with_context(|| {
            format!(
                "failed to place tower at {},{}",
                spec.tile.column(),
                spec.tile.row()
            )
        })?;
        debug!(tower = tower.get(), cards = spec.cards.len(), "scripted tower placed");
    }

    while query::towers(session.world()).iter().any(Tower::is_building) {
        let _ = session.tick();
    }

    let placed: Vec<_> = query::towers(session.world())
        .iter()
        .map(Tower::id)
        .collect();
    for (tower, spec) in placed.into_iter().zip(&args.towers) {
        for card in &spec.cards {
            let _ = session
                .attach_card(tower, *card)
                .with_context(|| format!("failed to attach {card} to tower {}", tower.get()))?;
        }
    }

    Ok(session)
}

fn play(session: &mut Session, args: &Args) -> Summary {
    let mut summary = Summary::default();
    let _ = session.start_next_wave();

    while session.frame() < args.max_frames && summary.waves_cleared < args.waves {
        for event in session.tick() {
            match event {
                Event::EnemyKilled { .. } => summary.kills += 1,
                Event::EnemyEscaped { .. } => summary.escapes += 1,
                Event::WaveCleared { wave } => {
                    summary.waves_cleared += 1;
                    info!(wave, "wave cleared");
                }
                Event::GameOver { .. } => summary.game_over = true,
                _ => {}
            }
        }
        if summary.game_over {
            break;
        }
        if !session.waves().is_active() && summary.waves_cleared < args.waves {
            let _ = session.start_next_wave();
        }
    }

    summary.frames = session.frame();
    summary
}

fn report(session: &Session, summary: &Summary) {
    let world = session.world();
    println!("Card Defence run summary");
    println!("seed:          {}", session.seed());
    println!("frames:        {}", summary.frames);
    println!("waves cleared: {}", summary.waves_cleared);
    println!("kills:         {}", summary.kills);
    println!("escapes:       {}", summary.escapes);
    println!("money:         {}", query::money(world));
    println!("lives:         {}", query::lives(world));
    println!(
        "hand:          {}",
        query::hand(world)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    );
    for tower in query::towers(world) {
        println!(
            "tower {} at {},{}: {:.1} damage",
            tower.id().get(),
            tower.tile().column(),
            tower.tile().row(),
            tower.cumulative_damage()
        );
    }
    if summary.game_over {
        println!("game over");
    }
}

/// Snaking path through the field built from axis-aligned legs.
fn demo_path(field: &FieldConfig) -> Result<Path> {
    if field.columns < 8 || field.rows < 6 {
        bail!(
            "field of {}x{} tiles is too small for the demo path",
            field.columns,
            field.rows
        );
    }
    let right = field.columns - 5;
    let middle = field.rows / 2;
    let bottom = field.rows - 2;
    let corners = [
        (0, 1),
        (right, 1),
        (right, middle),
        (3, middle),
        (3, bottom),
        (field.columns - 1, bottom),
    ];
    Ok(Path::from_tiles(manhattan_tiles(&corners), field.tile_size))
}

fn manhattan_tiles(corners: &[(u32, u32)]) -> Vec<TileCoord> {
    let Some(&(start_column, start_row)) = corners.first() else {
        return Vec::new();
    };
    let (mut column, mut row) = (start_column, start_row);
    let mut tiles = vec![TileCoord::new(column, row)];
    for &(to_column, to_row) in &corners[1..] {
        while column != to_column {
            column = if column < to_column { column + 1 } else { column - 1 };
            tiles.push(TileCoord::new(column, row));
        }
        while row != to_row {
            row = if row < to_row { row + 1 } else { row - 1 };
            tiles.push(TileCoord::new(column, row));
        }
    }
    tiles
}
