use anyhow::Context;
use colored::Colorize;
use oregen_engine::{EngineConfig, OreGenerationManager};
use oregen_ledger::{ChunkLedger, ChunkStatus, MarkOutcome, SqliteLedger};
use oregen_scan::InMemoryBlockRegistry;
use oregen_types::{ChunkKey, EntrySource};
use serde_json::json;

use crate::cli::*;

type Manager = OreGenerationManager<SqliteLedger, InMemoryBlockRegistry>;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config_path();
    let config = EngineConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    if let Command::Rules = cli.command {
        return cmd_rules(&config, cli.format);
    }

    let manager = open(&cli, &config)?;
    let result = match cli.command {
        Command::Init => cmd_init(&cli, &config, &manager),
        Command::Rules => Ok(()),
        Command::List(ref args) => cmd_list(&manager, args, cli.format),
        Command::Check(ref args) => cmd_check(&manager, args, cli.format),
        Command::Mark(ref args) => cmd_mark(&manager, args, cli.format),
        Command::LegacyImport(ref args) => cmd_legacy_import(&manager, args, cli.format),
    };
    manager.shutdown();
    result
}

fn open(cli: &Cli, config: &EngineConfig) -> anyhow::Result<Manager> {
    let manager = OreGenerationManager::from_config(config, InMemoryBlockRegistry::new())?;
    manager
        .initialize(&cli.data_dir)
        .with_context(|| format!("opening ledger in {}", cli.data_dir.display()))?;
    Ok(manager)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn chunk_key(args: &ChunkArgs) -> ChunkKey {
    ChunkKey::new(args.ore_type.clone(), args.world, args.chunk_x, args.chunk_z)
}

fn cmd_init(cli: &Cli, config: &EngineConfig, manager: &Manager) -> anyhow::Result<()> {
    let path = cli.data_dir.join(&config.database_file);
    if cli.format == OutputFormat::Json {
        return print_json(&json!({
            "database": path,
            "ores": manager.rules().ore_types().collect::<Vec<_>>(),
            "legacy_ore": config.legacy.ore_type,
        }));
    }
    println!("{} Initialized ore ledger at {}", "✓".green().bold(), path.display().to_string().bold());
    println!("  Ore types: {}", manager.rules().len().to_string().cyan());
    match &config.legacy.ore_type {
        Some(ore) => println!("  Legacy: {} ({})", ore.to_string().yellow(), config.legacy.table),
        None => println!("  Legacy: {}", "disabled".dimmed()),
    }
    Ok(())
}

fn cmd_rules(config: &EngineConfig, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(&config.ores);
    }
    if config.ores.is_empty() {
        println!("No ore types configured.");
        return Ok(());
    }
    for (name, ore) in &config.ores {
        let rules = &ore.rules;
        println!("{} (as {})", name.yellow().bold(), ore.appearance);
        println!("  Height: {}..={}", rules.min_y(), rules.max_y());
        println!(
            "  Spawn: {} primary, {} secondary, cluster {}",
            rules.spawn_probability(),
            rules.secondary_probability(),
            rules.cluster_size()
        );
        println!(
            "  Quota: {}..={}, populated at {} matches",
            rules.min_quota(),
            rules.max_quota(),
            rules.populated_threshold()
        );
        let targets: Vec<&str> = rules.target_materials().iter().map(|m| m.as_str()).collect();
        println!("  Targets: {}", targets.join(", "));
        if !rules.excluded_materials().is_empty() {
            let excluded: Vec<&str> = rules.excluded_materials().iter().map(|m| m.as_str()).collect();
            println!("  Excluded: {}", excluded.join(", ").dimmed());
        }
    }
    Ok(())
}

fn cmd_list(manager: &Manager, args: &ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let entries: Vec<_> = manager
        .ledger()
        .load_entries(args.ore_type.as_str())?
        .into_iter()
        .filter(|e| args.world.map_or(true, |w| e.key.world == w))
        .collect();

    if format == OutputFormat::Json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No chunks recorded for {}.", args.ore_type.to_string().yellow());
        return Ok(());
    }
    for entry in &entries {
        let source = match entry.source {
            EntrySource::Ledger => "ledger".green(),
            EntrySource::Legacy => "legacy".yellow(),
        };
        println!(
            "{} {:>6},{:<6} {}  {}",
            entry.key.world.short_id().dimmed(),
            entry.key.chunk_x,
            entry.key.chunk_z,
            entry.generated_at.format("%Y-%m-%d %H:%M:%S"),
            source
        );
    }
    println!("{} chunk(s)", entries.len().to_string().bold());
    Ok(())
}

fn cmd_check(manager: &Manager, args: &ChunkArgs, format: OutputFormat) -> anyhow::Result<()> {
    let key = chunk_key(args);
    let status = manager.ledger().status(&key)?;
    let label = match status {
        ChunkStatus::Unseen => "unseen",
        ChunkStatus::Recorded => "recorded",
        ChunkStatus::LegacyCovered => "legacy",
    };
    if format == OutputFormat::Json {
        return print_json(&json!({ "key": key, "status": label }));
    }
    let shown = match status {
        ChunkStatus::Unseen => label.dimmed(),
        ChunkStatus::Recorded => label.green(),
        ChunkStatus::LegacyCovered => label.yellow(),
    };
    println!("{key}: {shown}");
    Ok(())
}

fn cmd_mark(manager: &Manager, args: &ChunkArgs, format: OutputFormat) -> anyhow::Result<()> {
    let key = chunk_key(args);
    let outcome = manager.ledger().mark_chunk_generated(&key)?;
    let label = match outcome {
        MarkOutcome::Inserted => "inserted",
        MarkOutcome::AlreadyPresent => "already_present",
        MarkOutcome::LegacyCovered => "legacy",
    };
    if format == OutputFormat::Json {
        return print_json(&json!({ "key": key, "outcome": label }));
    }
    match outcome {
        MarkOutcome::Inserted => println!("{} Recorded {key}", "✓".green().bold()),
        MarkOutcome::AlreadyPresent => println!("{key} was already recorded"),
        MarkOutcome::LegacyCovered => println!("{key} is covered by the legacy table"),
    }
    Ok(())
}

fn cmd_legacy_import(
    manager: &Manager,
    args: &LegacyImportArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut inserted = 0usize;
    for &(chunk_x, chunk_z) in &args.chunks {
        if manager.ledger().insert_legacy(args.world, chunk_x, chunk_z)? {
            inserted += 1;
        }
    }
    let skipped = args.chunks.len() - inserted;
    if format == OutputFormat::Json {
        return print_json(&json!({ "inserted": inserted, "skipped": skipped }));
    }
    println!(
        "{} Imported {} legacy chunk(s) into {} ({} already present)",
        "✓".green().bold(),
        inserted.to_string().bold(),
        manager.ledger().legacy().table,
        skipped
    );
    Ok(())
}
