//! Arcade Demo
//!
//! This demo plays one mini-game session: roll (or pass) a score, show the
//! progress hint toward the next tier, grant a reward when a tier is met,
//! and persist the reward store for the cart demo to pick up.
//!
//! Use `-s` to fix the score instead of rolling one
//! Use `-g` / `-p` to pick the game tag and target product

use std::fs::create_dir_all;

use anyhow::Result;
use clap::Parser;
use jiff::Timestamp;
use rand::Rng;

use cocoon::{
    games::{DEFAULT_VALIDITY, GameOutcome, grant},
    products::ProductId,
    store::RewardStore,
    tiers::TierTable,
    utils::DemoArcadeArgs,
};

#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = DemoArcadeArgs::parse();
    let table = TierTable::standard();

    let score = match args.score {
        Some(score) => score,
        None => rand::thread_rng().gen_range(0..80),
    };

    let outcome = GameOutcome::new(args.game, ProductId::new(args.product), score)?;

    println!(
        "{} session finished with score {}",
        outcome.game(),
        outcome.score()
    );

    match table.progress_toward(outcome.score()) {
        Some(progress) => println!(
            "{} more points would unlock {} off",
            progress.points_needed, progress.percent
        ),
        None => println!("top tier reached"),
    }

    let now = Timestamp::now();

    match grant(&outcome, &table, now, DEFAULT_VALIDITY)? {
        Some(record) => {
            println!(
                "earned {} off {} until {}",
                record.percent(),
                record.product(),
                record.expires_at()
            );

            if let Some(parent) = args.store.parent() {
                create_dir_all(parent)?;
            }

            let mut store = RewardStore::load(&args.store).unwrap_or_default();

            store.grant(record);
            store.save(&args.store)?;

            println!("stored {} reward(s) in {}", store.len(), args.store.display());
        }
        None => println!("no discount earned this time"),
    }

    Ok(())
}
