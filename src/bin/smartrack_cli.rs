use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use smartrack_wms::{
    commands::{
        AssignLocationCommand, Command, DispatchCommand, ReceivePalletCommand, ReceivePalletResult,
    },
    config::{self, AppConfig},
    models::{
        inventory_item::{InventoryItem, MixedItem},
        product,
        rack::SlotStatus,
        zone::ZoneCategory,
    },
    persistence::JsonFileStore,
    repositories::topology::{NewRack, NewZone},
    seed,
    services::{
        expiration::{self, ExpirationStatus},
        scan_session::{ScanOutcome, ScanSession, SlotSelection},
    },
    LpnSequence, Warehouse,
};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let app_config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(app_config.log_level(), app_config.log_json);

    let mut context = CliContext::open(app_config, matches!(cli.command, Commands::Init(_)))?;

    match cli.command {
        Commands::Init(args) => handle_init(&mut context, args, cli.json)?,
        Commands::Zones(command) => handle_zones_command(&mut context, command, cli.json)?,
        Commands::Racks(command) => handle_racks_command(&mut context, command, cli.json)?,
        Commands::Receive(args) => handle_receive(&mut context, args, cli.json)?,
        Commands::Assign(args) => handle_assign(&mut context, args, cli.json)?,
        Commands::Scan(args) => handle_scan(&mut context, args)?,
        Commands::Label(args) => handle_label(&context, args, cli.json)?,
        Commands::Slots(args) => handle_slots(&context, args, cli.json)?,
        Commands::Pending => handle_pending(&context, cli.json)?,
        Commands::Expiring(args) => handle_expiring(&context, args, cli.json)?,
        Commands::Dispatch(args) => handle_dispatch(&mut context, args, cli.json)?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "smartrack", about = "SmartRack warehouse putaway console", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data file with the demo zones, racks and pallets
    Init(InitArgs),
    #[command(subcommand)]
    Zones(ZonesCommands),
    #[command(subcommand)]
    Racks(RacksCommands),
    /// Receive a pallet and issue its LPN
    Receive(ReceiveArgs),
    /// Assign a pending pallet to a scanned location code
    Assign(AssignArgs),
    /// Interactive scan loop: LPN first, then location
    Scan(ScanArgs),
    /// Print the location code for a rack slot
    Label(SlotArgs),
    /// Show the slot map of a rack
    Slots(RackArg),
    /// List pallets waiting for a location
    Pending,
    /// List expired and soon-to-expire pallets
    Expiring(ExpiringArgs),
    /// Remove pallets from the active inventory
    Dispatch(DispatchArgs),
}

#[derive(Args)]
struct InitArgs {
    #[arg(long, action = ArgAction::SetTrue, help = "Overwrite an existing data file")]
    force: bool,
}

#[derive(Subcommand)]
enum ZonesCommands {
    /// List configured zones
    List,
    /// Add a storage zone
    Add(AddZoneArgs),
    /// Delete an empty zone and its racks
    Delete {
        #[arg(help = "Zone identifier, e.g. zone-2")]
        id: String,
    },
}

#[derive(Args)]
struct AddZoneArgs {
    #[arg(long, help = "Display name of the chamber")]
    name: String,
    #[arg(long, value_parser = parse_category, help = "DRY, COLD or FROZEN")]
    category: ZoneCategory,
    #[arg(long, help = "Free-form temperature note")]
    temperature: Option<String>,
}

#[derive(Subcommand)]
enum RacksCommands {
    /// List racks with their occupancy
    List,
    /// Add a rack to a zone
    Add(AddRackArgs),
    /// Delete an empty rack
    Delete(RackArg),
    /// Block or unblock a slot
    Block(SlotArgs),
}

#[derive(Args)]
struct AddRackArgs {
    #[arg(long, help = "Zone identifier the rack belongs to")]
    zone: String,
    #[arg(long, help = "Aisle label printed on location codes")]
    aisle: String,
    #[arg(long, default_value_t = 6, help = "Number of levels")]
    levels: u32,
    #[arg(long, default_value_t = 9, help = "Positions per level")]
    positions: u32,
}

#[derive(Args)]
struct RackArg {
    #[arg(long, help = "Rack identifier")]
    rack: u32,
}

#[derive(Args)]
struct SlotArgs {
    #[arg(long, help = "Rack identifier")]
    rack: u32,
    #[arg(long, help = "Level, counted from the floor")]
    level: u32,
    #[arg(long, help = "Position along the level")]
    position: u32,
}

#[derive(Args)]
struct ReceiveArgs {
    #[arg(long, help = "Product code (EAN) for a single-product pallet")]
    product: Option<String>,
    #[arg(long, help = "Product name; defaults to the catalog entry")]
    name: Option<String>,
    #[arg(long, help = "Units on the pallet")]
    qty: Option<u32>,
    #[arg(long, value_parser = parse_date, help = "Expiration date (YYYY-MM-DD)")]
    expires: Option<NaiveDate>,
    #[arg(
        long = "line",
        value_parser = parse_mixed_line,
        help = "Mixed pallet line as CODE:QTY:YYYY-MM-DD; repeat for each product"
    )]
    lines: Vec<MixedItem>,
    #[arg(long, help = "Operator receiving the pallet; defaults to the configured operator")]
    by: Option<String>,
}

#[derive(Args)]
struct AssignArgs {
    #[arg(long, help = "Pallet LPN")]
    lpn: String,
    #[arg(long, help = "Scanned location code, e.g. SE-A-1-5")]
    location: String,
}

#[derive(Args)]
struct ScanArgs {
    #[arg(long, help = "Pre-fill the location from a rack slot as RACK:LEVEL:POSITION")]
    slot: Option<String>,
}

#[derive(Args)]
struct ExpiringArgs {
    #[arg(long, help = "Warning window in days; defaults to the configured value")]
    days: Option<i64>,
}

#[derive(Args)]
struct DispatchArgs {
    #[arg(required = true, help = "LPNs to dispatch")]
    lpns: Vec<String>,
}

struct CliContext {
    config: AppConfig,
    store: JsonFileStore,
    warehouse: Warehouse,
}

impl CliContext {
    /// Opens the data file. A missing snapshot is seeded with the demo data
    /// unless `init` is about to write one explicitly.
    fn open(config: AppConfig, initializing: bool) -> Result<Self> {
        let path = config.data_path();
        let mut store = JsonFileStore::open(&path)
            .with_context(|| format!("failed to open data file {}", path.display()))?;
        let loaded = Warehouse::load(&store).context("failed to load warehouse state")?;

        let warehouse = match loaded {
            Some(warehouse) => warehouse,
            None => {
                let warehouse = fresh_warehouse(&config);
                if !initializing {
                    debug!(path = %path.display(), "No saved state; seeding demo data");
                    warehouse
                        .save(&mut store)
                        .context("failed to write initial state")?;
                }
                warehouse
            }
        };

        Ok(Self {
            config,
            store,
            warehouse,
        })
    }

    fn save(&mut self) -> Result<()> {
        self.warehouse
            .save(&mut self.store)
            .with_context(|| format!("failed to save {}", self.store.path().display()))
    }

    fn operator(&self, by: Option<String>) -> String {
        by.unwrap_or_else(|| self.config.operator.clone())
    }
}

fn fresh_warehouse(config: &AppConfig) -> Warehouse {
    let mut warehouse = seed::demo_warehouse();
    warehouse.sequence = LpnSequence::starting_at(config.initial_sequence);
    warehouse
}

fn handle_init(context: &mut CliContext, args: InitArgs, json: bool) -> Result<()> {
    if !context.store.is_empty() && !args.force {
        bail!(
            "{} already holds warehouse data; pass --force to overwrite it",
            context.store.path().display()
        );
    }
    context.warehouse = fresh_warehouse(&context.config);
    context.save()?;

    if json {
        print_json(&serde_json::json!({
            "path": context.store.path(),
            "zones": context.warehouse.topology.zones().len(),
            "racks": context.warehouse.topology.racks().len(),
            "items": context.warehouse.inventory.len(),
        }))?;
    } else {
        println!("Initialized {}", context.store.path().display());
    }
    Ok(())
}

fn handle_zones_command(context: &mut CliContext, command: ZonesCommands, json: bool) -> Result<()> {
    match command {
        ZonesCommands::List => {
            let zones = context.warehouse.topology.zones();
            if json {
                return print_json(&zones);
            }
            for zone in zones {
                let racks = context.warehouse.topology.racks_in_zone(&zone.id).count();
                println!(
                    "{:<8} {:<3} {:<7} {:<28} {} rack(s)",
                    zone.id,
                    zone.zone_code(),
                    zone.category,
                    zone.name,
                    racks
                );
            }
        }
        ZonesCommands::Add(args) => {
            let zone = context
                .warehouse
                .topology
                .add_zone(NewZone {
                    name: args.name,
                    category: args.category,
                    temperature: args.temperature,
                })
                .context("failed to add zone")?
                .clone();
            context.save()?;
            if json {
                print_json(&zone)?;
            } else {
                println!("Zone {} created ({})", zone.id, zone.category);
            }
        }
        ZonesCommands::Delete { id } => {
            let Warehouse {
                topology,
                inventory,
                ..
            } = &mut context.warehouse;
            let zone = topology
                .delete_zone(&id, inventory)
                .with_context(|| format!("failed to delete zone {id}"))?;
            context.save()?;
            if json {
                print_json(&zone)?;
            } else {
                println!("Zone {} deleted", zone.id);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RackRow {
    id: u32,
    zone_id: String,
    aisle: String,
    levels: u32,
    positions_per_level: u32,
    total: usize,
    occupied: usize,
    blocked: usize,
    free: usize,
}

fn handle_racks_command(context: &mut CliContext, command: RacksCommands, json: bool) -> Result<()> {
    match command {
        RacksCommands::List => {
            let warehouse = &context.warehouse;
            let rows = warehouse
                .topology
                .racks()
                .iter()
                .map(|rack| {
                    let occupancy = warehouse.topology.occupancy(rack.id, &warehouse.inventory)?;
                    Ok::<_, anyhow::Error>(RackRow {
                        id: rack.id,
                        zone_id: rack.zone_id.clone(),
                        aisle: rack.aisle.clone(),
                        levels: rack.levels,
                        positions_per_level: rack.positions_per_level,
                        total: occupancy.total,
                        occupied: occupancy.occupied,
                        blocked: occupancy.blocked,
                        free: occupancy.free,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            if json {
                return print_json(&rows);
            }
            for row in rows {
                println!(
                    "Rack {:<3} {:<8} aisle {:<3} {}x{}  {}/{} occupied, {} blocked",
                    row.id,
                    row.zone_id,
                    row.aisle,
                    row.levels,
                    row.positions_per_level,
                    row.occupied,
                    row.total,
                    row.blocked
                );
            }
        }
        RacksCommands::Add(args) => {
            let rack = context
                .warehouse
                .topology
                .add_rack(NewRack {
                    zone_id: args.zone,
                    aisle: args.aisle,
                    levels: args.levels,
                    positions_per_level: args.positions,
                })
                .context("failed to add rack")?;
            let (id, aisle, capacity) = (rack.id, rack.aisle.clone(), rack.capacity());
            context.save()?;
            if json {
                print_json(&serde_json::json!({ "id": id, "aisle": aisle, "capacity": capacity }))?;
            } else {
                println!("Rack {id} created in aisle {aisle} with {capacity} slots");
            }
        }
        RacksCommands::Delete(args) => {
            let Warehouse {
                topology,
                inventory,
                ..
            } = &mut context.warehouse;
            let rack = topology
                .delete_rack(args.rack, inventory)
                .with_context(|| format!("failed to delete rack {}", args.rack))?;
            context.save()?;
            if json {
                print_json(&rack)?;
            } else {
                println!("Rack {} deleted", rack.id);
            }
        }
        RacksCommands::Block(args) => {
            let Warehouse {
                topology,
                inventory,
                ..
            } = &mut context.warehouse;
            let blocked = topology
                .toggle_slot_block(args.rack, args.level, args.position, inventory)
                .context("failed to toggle slot")?;
            context.save()?;
            if json {
                print_json(&serde_json::json!({
                    "rack": args.rack,
                    "level": args.level,
                    "position": args.position,
                    "blocked": blocked,
                }))?;
            } else {
                let state = if blocked { "blocked" } else { "unblocked" };
                println!(
                    "Rack {} level {} position {} {state}",
                    args.rack, args.level, args.position
                );
            }
        }
    }
    Ok(())
}

fn handle_receive(context: &mut CliContext, args: ReceiveArgs, json: bool) -> Result<()> {
    let received_by = context.operator(args.by);
    let command = if args.lines.is_empty() {
        let code = args
            .product
            .ok_or_else(|| anyhow!("--product is required unless --line is given"))?;
        let quantity = args.qty.ok_or_else(|| anyhow!("--qty is required"))?;
        let expires = args.expires.ok_or_else(|| anyhow!("--expires is required"))?;
        let name = args.name.unwrap_or_else(|| catalog_name(&code));
        ReceivePalletCommand::single(code, name, quantity, expires, received_by)
    } else {
        if args.product.is_some() {
            bail!("--product cannot be combined with --line");
        }
        ReceivePalletCommand::mixed(args.lines, received_by)
    };
    let command = command.with_warning_days(context.config.expiry_warning_days);

    let ReceivePalletResult { item, warnings } = command
        .execute(&mut context.warehouse)
        .context("failed to receive pallet")?;
    context.save()?;

    if json {
        print_json(&serde_json::json!({ "item": item, "warnings": warnings }))?;
    } else {
        println!("LPN {} issued for {}", item.lpn, item.contents.display_name());
        println!(
            "  {} unit(s), expires {}, pending location",
            item.quantity(),
            item.expiration_date
        );
        for warning in warnings {
            println!("  warning: {warning}");
        }
    }
    Ok(())
}

fn catalog_name(code: &str) -> String {
    let catalog = seed::catalog();
    product::find_by_code(&catalog, code)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| code.to_string())
}

fn handle_assign(context: &mut CliContext, args: AssignArgs, json: bool) -> Result<()> {
    let command = context
        .warehouse
        .resolver()
        .resolve(&args.location, &args.lpn)
        .map_err(|err| anyhow!("{} [{}]", err, err.code()))?;
    apply_assignment(context, command, json)
}

fn apply_assignment(context: &mut CliContext, command: AssignLocationCommand, json: bool) -> Result<()> {
    let location = command
        .execute(&mut context.warehouse)
        .context("failed to apply assignment")?;
    context.save()?;
    if json {
        print_json(&serde_json::json!({ "lpn": command.lpn, "location": location }))?;
    } else {
        println!("LPN {} stored at {}", command.lpn, location);
    }
    Ok(())
}

fn handle_scan(context: &mut CliContext, args: ScanArgs) -> Result<()> {
    let mut session = ScanSession::new();

    if let Some(raw) = args.slot {
        let (rack, level, position) = parse_slot_ref(&raw)?;
        let selection = session
            .select_slot(
                &context.warehouse.topology,
                &context.warehouse.inventory,
                rack,
                level,
                position,
            )
            .context("failed to select slot")?;
        match selection {
            SlotSelection::Prefilled(code) => println!("Location {code} selected"),
            SlotSelection::Occupied(lpn) => println!("Slot holds {lpn}; no location pre-filled"),
        }
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        let prompt = if session.lpn().is_some() {
            "location> "
        } else {
            "lpn> "
        };
        print!("{prompt}");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let input = line?;
        let input = input.trim();
        match input.to_ascii_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "cancel" => {
                session.cancel();
                println!("Scan cancelled");
                continue;
            }
            _ => {}
        }

        let ready = if session.lpn().is_some() {
            session
                .scan_location(&context.warehouse.topology, &context.warehouse.inventory, input)
                .map(Some)
        } else {
            session
                .scan_lpn(&context.warehouse.topology, &context.warehouse.inventory, input)
                .map(|outcome| match outcome {
                    ScanOutcome::AwaitingLocation { lpn } => {
                        println!("LPN {lpn} accepted; scan the location");
                        None
                    }
                    ScanOutcome::Ready(command) => Some(command),
                })
        };

        match ready {
            Ok(Some(command)) => {
                if let Err(err) = apply_assignment(context, command, false) {
                    println!("error: {err:#}");
                }
            }
            Ok(None) => {}
            Err(err) => println!("error: {err}"),
        }
    }
    Ok(())
}

fn handle_label(context: &CliContext, args: SlotArgs, json: bool) -> Result<()> {
    let code = context
        .warehouse
        .topology
        .label_for_slot(args.rack, args.level, args.position)
        .context("failed to build label")?;
    if json {
        print_json(&serde_json::json!({ "code": code }))
    } else {
        println!("{code}");
        Ok(())
    }
}

#[derive(Serialize)]
struct SlotRow {
    level: u32,
    position: u32,
    code: String,
    status: SlotStatus,
}

fn handle_slots(context: &CliContext, args: RackArg, json: bool) -> Result<()> {
    let topology = &context.warehouse.topology;
    let inventory = &context.warehouse.inventory;
    let rack = topology
        .rack(args.rack)
        .ok_or_else(|| anyhow!("rack {} not found", args.rack))?;

    if json {
        let mut rows = Vec::with_capacity(rack.capacity());
        for level in 1..=rack.levels {
            for position in 1..=rack.positions_per_level {
                rows.push(SlotRow {
                    level,
                    position,
                    code: topology.label_for_slot(rack.id, level, position)?.to_string(),
                    status: topology.slot_status(rack, level, position, inventory),
                });
            }
        }
        return print_json(&rows);
    }

    println!("Rack {} aisle {} ({}x{})", rack.id, rack.aisle, rack.levels, rack.positions_per_level);
    for level in (1..=rack.levels).rev() {
        let cells: String = (1..=rack.positions_per_level)
            .map(|position| match topology.slot_status(rack, level, position, inventory) {
                SlotStatus::Empty => " .",
                SlotStatus::Occupied(_) => " #",
                SlotStatus::Blocked => " X",
            })
            .collect();
        println!("L{level:<2}{cells}");
    }
    Ok(())
}

fn handle_pending(context: &CliContext, json: bool) -> Result<()> {
    let pending: Vec<&InventoryItem> = context.warehouse.inventory.pending().collect();
    if json {
        return print_json(&pending);
    }
    if pending.is_empty() {
        println!("No pallets pending");
    }
    for item in pending {
        println!(
            "{}  {:<30} {:>5}  exp {}",
            item.lpn,
            item.contents.display_name(),
            item.quantity(),
            item.expiration_date
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct ExpiringRow<'a> {
    lpn: &'a str,
    product: String,
    expiration_date: NaiveDate,
    status: ExpirationStatus,
    days_left: i64,
    location: Option<String>,
}

fn handle_expiring(context: &CliContext, args: ExpiringArgs, json: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let days = args.days.unwrap_or(context.config.expiry_warning_days);
    let rows: Vec<ExpiringRow<'_>> = expiration::expiring_items(&context.warehouse.inventory, today, days)
        .into_iter()
        .map(|(item, check)| ExpiringRow {
            lpn: item.lpn.as_str(),
            product: item.contents.display_name(),
            expiration_date: item.expiration_date,
            status: check.status,
            days_left: check.days_left,
            location: item.location.as_ref().map(ToString::to_string),
        })
        .collect();

    if json {
        return print_json(&rows);
    }
    let (expired, warning, ok) = expiration::status_counts(&context.warehouse.inventory, today, days);
    println!("{expired} expired, {warning} expiring within {days} day(s), {ok} ok");
    if rows.is_empty() {
        println!("Nothing expires within {days} day(s)");
    }
    for row in rows {
        println!(
            "{:<8} {}  {:<30} {:>4}d  {}",
            row.status,
            row.lpn,
            row.product,
            row.days_left,
            row.location.as_deref().unwrap_or("pending")
        );
    }
    Ok(())
}

fn handle_dispatch(context: &mut CliContext, args: DispatchArgs, json: bool) -> Result<()> {
    let result = DispatchCommand { lpns: args.lpns }
        .execute(&mut context.warehouse)
        .context("failed to dispatch")?;
    context.save()?;
    if json {
        return print_json(&result);
    }
    for lpn in &result.dispatched {
        println!("Dispatched {lpn}");
    }
    for lpn in &result.missing {
        println!("Not found: {lpn}");
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}

fn parse_category(raw: &str) -> Result<ZoneCategory, String> {
    raw.parse::<ZoneCategory>()
        .map_err(|_| format!("unknown category '{raw}' (expected DRY, COLD or FROZEN)"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("invalid date '{raw}': {err}"))
}

fn parse_mixed_line(raw: &str) -> Result<MixedItem, String> {
    let mut parts = raw.splitn(3, ':');
    let (Some(code), Some(quantity), Some(date)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected CODE:QTY:YYYY-MM-DD, got '{raw}'"));
    };
    let quantity = quantity
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid quantity in '{raw}': {err}"))?;
    let code = code.trim().to_string();
    Ok(MixedItem {
        product_name: catalog_name(&code),
        product_code: code,
        quantity,
        expiration_date: parse_date(date)?,
    })
}

fn parse_slot_ref(raw: &str) -> Result<(u32, u32, u32)> {
    let parts = raw
        .split(':')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid slot reference '{raw}'"))?;
    match parts.as_slice() {
        [rack, level, position] => Ok((*rack, *level, *position)),
        _ => bail!("slot reference must be RACK:LEVEL:POSITION, got '{raw}'"),
    }
}
