use clap::{Args, Parser, Subcommand};

use crate::domain::TraitRatings;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rate a public figure on four traits and see the general rating")]
pub struct Cli {
    #[clap(flatten)]
    pub options: GlobalOptions,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, PartialEq, Default)]
pub struct GlobalOptions {
    /// Local store file (overrides GENERAL_RATING_STORE_PATH)
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Ratings database URL (overrides GENERAL_RATING_DATABASE_URL)
    #[arg(long, global = true)]
    pub database_url: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Submit this device's rating (once)
    Vote(VoteArgs),
    /// Show this device's rating and the general rating
    Show,
    /// Show the general rating only
    Results,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct VoteArgs {
    /// 0 = humble, 100 = narcissist
    #[arg(long, default_value_t = TraitRatings::NEUTRAL, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub humble: u8,
    /// 0 = considerate, 100 = bully
    #[arg(long, default_value_t = TraitRatings::NEUTRAL, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub considerate: u8,
    /// 0 = kind, 100 = bad
    #[arg(long, default_value_t = TraitRatings::NEUTRAL, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub kind: u8,
    /// 0 = smart, 100 = stupid
    #[arg(long, default_value_t = TraitRatings::NEUTRAL, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub smart: u8,
}

impl VoteArgs {
    pub fn ratings(&self) -> TraitRatings {
        TraitRatings::new(self.humble, self.considerate, self.kind, self.smart)
    }
}
