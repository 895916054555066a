use anyhow::{Context, Result};
use arena_physics::assets::{load_levels, load_models, Level, SpawnKind};
use arena_physics::config::{Config, PhysicsConfig};
use arena_physics::foundation::logging;
use arena_physics::foundation::math::Vec3;
use arena_physics::physics::{Integrator, KinematicState};
use clap::{Arg, ArgAction, Command};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Box used when dropping a test body at the player start
const DROP_HALF_EXTENTS: Vec3 = Vec3::new(16.0, 28.0, 16.0);

fn main() -> Result<()> {
    logging::init();

    let matches = Command::new("level_inspector")
        .about("Decodes compiled level or model files and prints what they contain")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("File of concatenated compiled levels (or models with --models)")
                .required(true),
        )
        .arg(
            Arg::new("models")
                .long("models")
                .help("Treat the file as compiled models instead of levels")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("drop-test")
                .long("drop-test")
                .value_name("TICKS")
                .help("Drop a player-sized body at each player start and simulate this many ticks")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("physics")
                .long("physics")
                .value_name("CONFIG")
                .help("Physics configuration (.toml or .ron) for the drop test"),
        )
        .get_matches();

    let path = PathBuf::from(
        matches
            .get_one::<String>("file")
            .context("missing input file")?,
    );

    if matches.get_flag("models") {
        return inspect_models(&path);
    }

    let physics = match matches.get_one::<String>("physics") {
        Some(config) => PhysicsConfig::load_from_file(config)
            .with_context(|| format!("failed to load physics config {}", config))?,
        None => PhysicsConfig::default(),
    };

    let levels = load_levels(&path).with_context(|| format!("failed to load {}", path.display()))?;
    for (index, level) in levels.iter().enumerate() {
        print_level(index, level);
        if let Some(&ticks) = matches.get_one::<u32>("drop-test") {
            drop_test(level, &physics, ticks);
        }
    }
    Ok(())
}

fn print_level(index: usize, level: &Level) {
    println!("Level {}", index);
    println!("  textures: {:?}", level.textures);

    let grouped = level.volumes.iter().filter(|v| v.group().is_some()).count();
    println!("  volumes:  {} ({} animated)", level.volumes.len(), grouped);
    if let Some(bounds) = level.bounds() {
        println!("  bounds:   {:?} .. {:?}", bounds.min.as_slice(), bounds.max.as_slice());
    }

    let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
    for spawn in &level.spawns {
        *kinds.entry(spawn_label(spawn.kind)).or_default() += 1;
    }
    println!("  spawns:   {}", level.spawns.len());
    for (kind, count) in kinds {
        println!("    {:<14} {}", kind, count);
    }
}

fn spawn_label(kind: SpawnKind) -> String {
    match kind {
        SpawnKind::Enemy(variant) => format!("enemy {}", variant),
        SpawnKind::Pickup(variant) => format!("pickup {}", variant),
        other => format!("{:?}", other).to_lowercase(),
    }
}

fn drop_test(level: &Level, physics: &PhysicsConfig, ticks: u32) {
    let Some(start) = level.player_start() else {
        log::warn!("Level has no player start, skipping drop test");
        return;
    };

    let world = level.collision_world();
    let integrator = Integrator::new(physics.clone());
    let dt = physics.tick_duration();
    let center = start.position + Vec3::new(0.0, DROP_HALF_EXTENTS.y, 0.0);
    let mut body = KinematicState::new(center, DROP_HALF_EXTENTS);

    let mut landed_at = None;
    for tick in 0..ticks {
        let report = integrator.step(&mut body, &world, dt);
        if report.on_ground && landed_at.is_none() {
            landed_at = Some(tick);
        }
    }

    match landed_at {
        Some(tick) => println!(
            "  drop test: landed after {} tick(s), resting at {:?}",
            tick + 1,
            body.position.as_slice()
        ),
        None => println!(
            "  drop test: still airborne after {} tick(s) at {:?}",
            ticks,
            body.position.as_slice()
        ),
    }
}

fn inspect_models(path: &Path) -> Result<()> {
    let models = load_models(path).with_context(|| format!("failed to load {}", path.display()))?;
    for (index, model) in models.iter().enumerate() {
        println!("Model {}", index);
        println!("  frames:   {}", model.frames.len());
        println!("  vertices: {}", model.vertex_count());
        println!("  faces:    {}", model.faces.len());
        println!("  box:      {:?}", model.half_extents(1.0).as_slice());
    }
    Ok(())
}
