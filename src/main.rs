// src/main.rs
use clap::Parser;
use group_miner_rs::config::GroupConfig;
use group_miner_rs::{self, *};
use log::LevelFilter;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main entry point for the group miner
///
/// Parses command line arguments, delegates to the subcommand handler and
/// propagates any errors upward.
fn main() -> Result<(), MinerError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Run(opts) => run_schedule(opts),
        cli::Action::Endpoint(opts) => print_endpoint(opts),
        cli::Action::Devices(opts) => list_devices(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Builds every configured group and replays the switch schedule
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads configuration and the device registry
/// 3. Builds one switcher per group, each on its own thread
/// 4. Broadcasts each scheduled switch when it falls due
/// 5. Holds, then stops and tears down every group
fn run_schedule(opts: cli::RunOptions) -> Result<(), MinerError> {
    utils::init_logging_with_level(if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let config = config::load(&opts.config)?;
    let location = opts
        .location
        .unwrap_or_else(|| config.general.location.clone());
    let worker_label = opts
        .worker
        .unwrap_or_else(|| config.general.worker_label.clone());

    let registry = InMemoryDeviceRegistry::from_config(&config.devices, config.general.detect_cpu);
    let factory = Arc::new(ConfiguredMinerFactory::new(config.miners.clone()));
    let resolver = EndpointResolver::default();
    let lifecycle = WorkerLifecycle::new(config.restart_delay(), Arc::new(ThreadSleep));

    let mut scheduler = GroupScheduler::new();
    for group_config in &config.groups {
        let miners = build_group(group_config, &registry, &factory, &resolver, &lifecycle)?;
        log::info!("Group {}: {}", group_config.name, miners.group());
        scheduler.spawn_group(miners);
    }
    if scheduler.is_empty() {
        return Err(MinerError::ConfigError("No device groups configured".into()));
    }

    let started = Instant::now();
    for entry in config.sorted_schedule() {
        let due = Duration::from_secs(entry.after_secs);
        if let Some(wait) = due.checked_sub(started.elapsed()) {
            std::thread::sleep(wait);
        }

        let location = entry.location.unwrap_or_else(|| location.clone());
        log::info!("Switching to {} ({})", entry.algorithm, location);
        scheduler.broadcast(&SwitchCommand::Start {
            algorithm: entry.algorithm,
            location,
            worker_label: worker_label.clone(),
        })?;
    }

    std::thread::sleep(Duration::from_secs(opts.hold));
    scheduler.broadcast(&SwitchCommand::Stop)?;
    scheduler.shutdown()
}

/// Builds the switcher for one `[[groups]]` entry
///
/// CPU groups get every configured CPU miner up front, since they never
/// create miners on demand.
fn build_group(
    group_config: &GroupConfig,
    registry: &InMemoryDeviceRegistry,
    factory: &Arc<ConfiguredMinerFactory>,
    resolver: &EndpointResolver,
    lifecycle: &WorkerLifecycle,
) -> Result<GroupMiners, MinerError> {
    let uuids: BTreeSet<String> = group_config.devices.iter().cloned().collect();
    let group = DeviceGroup::new(&uuids, registry)?;

    let shared_factory: Arc<dyn MinerFactory> = factory.clone();
    let mut miners = GroupMiners::new(group, shared_factory, resolver.clone(), lifecycle.clone());
    if miners.group().class() == DeviceClass::Cpu {
        for miner in factory.provision_cpu_miners() {
            miners.provision(miner);
        }
    }
    Ok(miners)
}

/// Prints the stratum URL for an algorithm and location
fn print_endpoint(opts: cli::EndpointOptions) -> Result<(), MinerError> {
    let url = EndpointResolver::default().resolve(opts.algorithm, &opts.location)?;
    println!("{}", url);
    Ok(())
}

/// Lists registry devices, per-name counts and group labels
fn list_devices(opts: cli::DevicesOptions) -> Result<(), MinerError> {
    utils::init_logging_with_level(LevelFilter::Warn);

    let config = config::load(&opts.config)?;
    let registry = InMemoryDeviceRegistry::from_config(&config.devices, config.general.detect_cpu);

    let mut name_counts = BTreeMap::new();
    for device in registry.devices() {
        name_counts
            .entry(device.name.clone())
            .or_insert_with(|| registry.count_by_name(&device.name));
    }

    let mut groups = Vec::new();
    for group_config in &config.groups {
        let uuids: BTreeSet<String> = group_config.devices.iter().cloned().collect();
        let group = DeviceGroup::new(&uuids, &registry)?;
        groups.push((group_config.name.clone(), group));
    }

    if opts.json {
        let groups: Vec<_> = groups
            .iter()
            .map(|(name, group)| {
                serde_json::json!({
                    "name": name,
                    "class": group.class(),
                    "label": group.display_label(),
                    "devices": group.device_uuids(),
                })
            })
            .collect();
        let report = serde_json::json!({
            "devices": registry.devices(),
            "name_counts": name_counts,
            "groups": groups,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for device in registry.devices() {
        let state = if device.enabled { "enabled" } else { "disabled" };
        println!("{:<40} {:<8} {:<9} {}", device.uuid, device.class, state, device.name);
    }
    println!();
    for (name, count) in &name_counts {
        println!("{} * {}", count, name);
    }
    println!();
    for (name, group) in &groups {
        println!("{}: {} [{}]", name, group, group.device_uuids().join(", "));
    }
    Ok(())
}

/// Writes the configuration template to the requested path
fn generate_config(opts: cli::ConfigOptions) -> Result<(), MinerError> {
    let config = config::generate_template();
    std::fs::write(opts.output, config)?;
    Ok(())
}
