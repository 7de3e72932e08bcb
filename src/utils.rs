//! Utils

use std::path::PathBuf;

use clap::Parser;

/// Arguments for the cart demo
#[derive(Debug, Parser)]
pub struct DemoCartArgs {
    /// Number of items to add to the cart
    #[clap(short, long)]
    pub n: Option<usize>,

    /// Fixture set to use for the cart & rewards
    #[clap(short, long, default_value = "storefront")]
    pub fixture: String,
}

/// Arguments for the arcade demo
#[derive(Debug, Parser)]
pub struct DemoArcadeArgs {
    /// Mini-game tag to report
    #[clap(short, long, default_value = "card-cull")]
    pub game: String,

    /// Product the session is played for
    #[clap(short, long, default_value = "gummy-grubs")]
    pub product: String,

    /// Use a fixed score instead of rolling one
    #[clap(short, long)]
    pub score: Option<i64>,

    /// Path of the persisted reward store
    #[clap(long, default_value = "target/caterpillar-ranch.rewards")]
    pub store: PathBuf,
}
