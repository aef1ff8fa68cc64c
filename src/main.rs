use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use coyote_ledger::{
    config::EngineConfig,
    event::TracingSink,
    ledger::SledLedger,
    service::Dispatcher,
    shipment::{GpsReading, LatitudeDir, LongitudeDir, TemperatureReading},
    transaction::{Receipt, Transaction},
    types::{Role, TimeStamp},
};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "coyote", about = "Shipment settlement ledger")]
struct Cli {
    /// Ledger database directory, overrides COYOTE_DB_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Destination port coordinate, overrides COYOTE_DESTINATION_PORT
    #[arg(long, global = true)]
    port: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed the demo participants, contract and shipment
    Setup,
    Accept { shipment: String },
    Depart { shipment: String },
    /// Record a temperature reading in centigrade
    Temperature {
        shipment: String,
        #[arg(allow_negative_numbers = true)]
        centigrade: Decimal,
    },
    /// Record a GPS position, e.g. `gps SHIP_001 40.6840 n 74.0062 w`
    Gps {
        shipment: String,
        latitude: String,
        latitude_dir: Lat,
        longitude: String,
        longitude_dir: Long,
    },
    /// Mark the shipment received now and settle the contract
    Receive { shipment: String },
    /// Print a shipment, its contract and the participant balances
    Show { shipment: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Lat {
    N,
    S,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Long {
    E,
    W,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = EngineConfig::load();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(port) = cli.port {
        config.destination_port = port;
    }

    let ledger = SledLedger::open(&config.db_path)
        .with_context(|| format!("failed to open ledger at {}", config.db_path.display()))?;
    let mut dispatcher = Dispatcher::new(ledger, TracingSink, &config);
    let now = TimeStamp::now();

    let tx = match cli.command {
        Command::Setup => Transaction::SetupDemo { timestamp: now },
        Command::Accept { shipment } => Transaction::ShipmentAccepted {
            shipment_id: shipment,
        },
        Command::Depart { shipment } => Transaction::ShipmentDeparted {
            shipment_id: shipment,
        },
        Command::Temperature {
            shipment,
            centigrade,
        } => Transaction::TemperatureReading(TemperatureReading {
            shipment_id: shipment,
            centigrade,
            timestamp: now,
        }),
        Command::Gps {
            shipment,
            latitude,
            latitude_dir,
            longitude,
            longitude_dir,
        } => Transaction::GpsReading(GpsReading {
            shipment_id: shipment,
            latitude,
            latitude_dir: match latitude_dir {
                Lat::N => LatitudeDir::N,
                Lat::S => LatitudeDir::S,
            },
            longitude,
            longitude_dir: match longitude_dir {
                Long::E => LongitudeDir::E,
                Long::W => LongitudeDir::W,
            },
            timestamp: now,
        }),
        Command::Receive { shipment } => Transaction::ShipmentReceived {
            shipment_id: shipment,
            timestamp: now,
        },
        Command::Show { shipment } => return show(&dispatcher, &shipment),
    };

    let kind = tx.kind();
    let receipt = dispatcher
        .submit(tx)
        .with_context(|| format!("{kind} failed"))?;
    print_receipt(&receipt);

    Ok(())
}

fn print_receipt(receipt: &Receipt) {
    match receipt.rejection() {
        None => println!("{} {} committed", receipt.kind, receipt.transaction_id),
        Some(reason) => println!(
            "{} {} rejected: {}",
            receipt.kind, receipt.transaction_id, reason
        ),
    }
    for event in &receipt.events {
        println!("  {}: {}", event.kind(), event.message());
    }
}

fn show<E>(dispatcher: &Dispatcher<SledLedger, E>, shipment_id: &str) -> anyhow::Result<()>
where
    E: coyote_ledger::event::EventSink,
{
    let shipment = dispatcher.shipment(shipment_id)?;
    let contract = dispatcher.contract(&shipment.contract_id)?;

    println!(
        "{} {:?} x{} status {}",
        shipment.id, shipment.product, shipment.unit_count, shipment.status()
    );
    println!(
        "  {} temperature readings, {} gps readings",
        shipment.temperature_readings().len(),
        shipment.gps_readings().len()
    );
    println!(
        "{} due {} at {} per unit, {}..{} C",
        contract.id,
        contract.arrival_deadline,
        contract.unit_price,
        contract.min_temperature,
        contract.max_temperature
    );
    for (role, id) in [
        (Role::Customer, &contract.customer_id),
        (Role::Broker, &contract.broker_id),
        (Role::Carrier, &contract.carrier_id),
    ] {
        let participant = dispatcher.participant(role, id)?;
        println!("  {role} {id}: {}", participant.account_balance);
    }

    Ok(())
}
