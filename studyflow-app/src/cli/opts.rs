use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(name = "studyflow", version, about = "StudyFlow flashcard CLI")]
pub struct Cli {
    /// Deck file (overrides the config's store_path)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Deck operations
    #[command(subcommand)]
    Deck(DeckCmd),
    /// Card operations
    #[command(subcommand)]
    Card(CardCmd),
    /// Interactive study session
    Study(StudyCmd),
    /// Export decks
    #[command(subcommand)]
    Export(ExportCmd),
    /// Import decks
    #[command(subcommand)]
    Import(ImportCmd),
}

#[derive(Debug, Subcommand, Clone)]
pub enum DeckCmd {
    Add { name: String },
    List,
    Rm { deck: String },
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add(CardAdd),
    List { #[arg(long)] deck: Option<String> },
    Edit(CardEdit),
    Rm { card_id: String },
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    #[arg(long)]
    pub deck: String,
    #[arg(long)]
    pub front: String,
    #[arg(long)]
    pub back: String,
}

#[derive(Debug, Args, Clone)]
pub struct CardEdit {
    pub card_id: String,
    #[arg(long)]
    pub front: Option<String>,
    #[arg(long)]
    pub back: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct StudyCmd {
    /// Deck id or name
    #[arg(long)]
    pub deck: String,
    /// Start in free review (all cards, no scheduling)
    #[arg(long)]
    pub free: bool,
    /// Reveal answers automatically after SECS seconds
    #[arg(long, value_name = "SECS")]
    pub auto_flip: Option<u32>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ExportCmd {
    Json { path: PathBuf, #[arg(long)] deck: Option<String> },
    Csv { path: PathBuf, #[arg(long)] deck: Option<String> },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ImportCmd {
    Json { path: PathBuf },
    Csv { path: PathBuf, #[arg(long)] deck: Option<String> },
}
