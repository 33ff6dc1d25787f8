// This is the command-line entry point for the evidence ledger
// The ledger itself is in-memory, so each command builds a fresh one from the config,
// drives it through the public operations, and prints what happened as JSON
use audit_chain::utils::to_json_pretty;
use audit_chain::{
    Block, Command, Ledger, LedgerConfig, LedgerEvent, Opt, Result, TransactionRequest,
    TransactionType,
};
use clap::Parser;
use log::{error, info, LevelFilter};
use serde_json::json;
use std::fs;
use std::process;
use std::sync::mpsc::Receiver;

fn main() {
    let opt = Opt::parse();

    // I need the config before the logger so the configured level applies; RUST_LOG still wins
    let config = LedgerConfig::load(opt.config.as_deref());
    let level = config
        .as_ref()
        .map(LedgerConfig::log_level_filter)
        .unwrap_or(LevelFilter::Info);
    env_logger::builder()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .init();

    let result = config.and_then(|config| run_command(opt.command, config));
    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command, config: LedgerConfig) -> Result<()> {
    match command {
        // The end-to-end scenario: three verified evidence submissions, three audits, one block
        Command::Demo { miner } => {
            let ledger = Ledger::new(config)?;
            let events = ledger.subscribe();

            for exhibit in 1..=3 {
                let evidence_hash = ledger.submit_transaction(
                    TransactionRequest::new("A", "evidence-vault", 0, TransactionType::Evidence)
                        .with_data(json!({
                            "evidenceHash": format!("sha256:exhibit-{exhibit}"),
                            "verifiedBy": "forensics-lab",
                        })),
                )?;
                ledger.submit_transaction(
                    TransactionRequest::new("auditor", "A", 0, TransactionType::Audit)
                        .with_data(json!({ "reviewed": evidence_hash })),
                )?;
            }

            let block = mine_in_background(&ledger, &miner)?;
            print_result(&ledger, &block, &miner)?;
            report_events(&events);
        }
        // When I want to push a prepared batch through the ledger
        Command::Replay { file, miner } => {
            let contents = fs::read_to_string(&file)?;
            let requests: Vec<TransactionRequest> = serde_json::from_str(&contents)?;
            info!("Loaded {} transactions from {}", requests.len(), file.display());

            let ledger = Ledger::new(config)?;
            let events = ledger.subscribe();
            for request in requests {
                ledger.submit_transaction(request)?;
            }

            let block = mine_in_background(&ledger, &miner)?;
            print_result(&ledger, &block, &miner)?;
            report_events(&events);
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
        }
    }
    Ok(())
}

// The nonce search runs on its own thread; this thread just waits for the outcome
fn mine_in_background(ledger: &Ledger, miner: &str) -> Result<Block> {
    let handle = ledger.spawn_mining(miner)?;
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(audit_chain::LedgerError::Io(
            "mining thread panicked".to_string(),
        )),
    }
}

fn print_result(ledger: &Ledger, block: &Block, miner: &str) -> Result<()> {
    println!("{}", to_json_pretty(block)?);
    println!("{}", to_json_pretty(&ledger.stats())?);
    println!("Balance of {miner}: {}", ledger.balance_of(miner));
    Ok(())
}

fn report_events(events: &Receiver<LedgerEvent>) {
    let names: Vec<&str> = events.try_iter().map(|event| event.name()).collect();
    info!("Published {} events: {}", names.len(), names.join(", "));
}
