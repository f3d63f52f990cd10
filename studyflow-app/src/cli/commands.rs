use crate::cli::opts::*;
use crate::cli::study;
use crate::config::Config;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use studyflow_core::{CardPatch, Deck, Flashcard, Repository, SchedulingState};
use studyflow_json::{decode_decks, encode_decks, paths, JsonStore};

pub async fn run_cli(args: Cli, config: Config) -> Result<()> {
    let repo = open_repo(args.store.clone(), &config).await?;
    match args.cmd {
        Command::Deck(cmd) => deck_cmd(repo, cmd).await,
        Command::Card(cmd) => card_cmd(repo, cmd).await,
        Command::Study(cmd) => study::run(repo, cmd, &config).await,
        Command::Export(cmd) => export_cmd(repo, cmd).await,
        Command::Import(cmd) => import_cmd(repo, cmd).await,
    }
}

pub async fn open_repo(store: Option<PathBuf>, config: &Config) -> Result<Arc<dyn Repository>> {
    let (file, backups) = match store.or_else(|| config.store_path.clone()) {
        Some(p) => {
            let backups = paths::backups_for(&p);
            (p, backups)
        }
        None => paths::default_store_file(),
    };
    let s = JsonStore::open_with(file.clone(), backups, config.max_backups)
        .await
        .with_context(|| format!("failed to open deck store {}", file.display()))?;
    Ok(Arc::new(s))
}

async fn deck_cmd(repo: Arc<dyn Repository>, cmd: DeckCmd) -> Result<()> {
    match cmd {
        DeckCmd::Add { name } => {
            let d = repo.create_deck(&name).await?;
            println!("{}", d.id);
        }
        DeckCmd::List => {
            let now = Utc::now();
            for d in repo.list_decks().await? {
                println!("{}\t{}\tcards={}\tdue={}", d.id, d.name, d.cards.len(), d.due_count(now));
            }
        }
        DeckCmd::Rm { deck } => {
            let d = resolve_deck(&*repo, &deck).await?;
            repo.delete_deck(&d.id).await?;
            println!("ok");
        }
    }
    Ok(())
}

async fn card_cmd(repo: Arc<dyn Repository>, cmd: CardCmd) -> Result<()> {
    match cmd {
        CardCmd::Add(a) => {
            let deck = resolve_deck(&*repo, &a.deck).await?;
            let c = repo.add_card(&deck.id, &a.front, &a.back).await?;
            println!("{}", c.id);
        }
        CardCmd::List { deck } => {
            let decks = match deck {
                Some(sel) => vec![resolve_deck(&*repo, &sel).await?],
                None => repo.list_decks().await?,
            };
            for d in decks {
                for c in &d.cards {
                    println!("{}\t{}\t{}\tdeck={}\t{}", c.id, c.front, c.back, d.name, describe_schedule(c));
                }
            }
        }
        CardCmd::Edit(e) => {
            let patch = CardPatch {
                front: e.front,
                back: e.back,
                ..CardPatch::default()
            };
            if patch.is_empty() {
                bail!("nothing to change: pass --front and/or --back");
            }
            repo.update_card(&e.card_id, patch).await?;
            println!("ok");
        }
        CardCmd::Rm { card_id } => {
            repo.delete_card(&card_id).await?;
            println!("ok");
        }
    }
    Ok(())
}

fn describe_schedule(c: &Flashcard) -> String {
    let state = match c.state {
        Some(s) => format!("interval={}d ease={:.2} reps={}", s.interval, s.ease, s.repetitions),
        None => "new".to_string(),
    };
    match c.next_review {
        Some(at) => format!("{state}\tdue={}", at.format("%Y-%m-%d %H:%M")),
        None => state,
    }
}

async fn export_cmd(repo: Arc<dyn Repository>, cmd: ExportCmd) -> Result<()> {
    match cmd {
        ExportCmd::Json { path, deck } => {
            let decks = select_decks(&*repo, deck).await?;
            std::fs::write(&path, encode_decks(&decks)?)?;
            println!("wrote {}", path.display());
        }
        ExportCmd::Csv { path, deck } => {
            let decks = select_decks(&*repo, deck).await?;
            let mut wtr = csv::Writer::from_path(&path)?;
            wtr.write_record(["deck", "front", "back", "interval", "ease", "repetitions", "next_review"])?;
            for d in &decks {
                for c in &d.cards {
                    let (interval, ease, reps) = match c.state {
                        Some(s) => (s.interval.to_string(), s.ease.to_string(), s.repetitions.to_string()),
                        None => (String::new(), String::new(), String::new()),
                    };
                    let next = c.next_review.map(|at| at.to_rfc3339()).unwrap_or_default();
                    wtr.write_record([
                        d.name.as_str(),
                        c.front.as_str(),
                        c.back.as_str(),
                        interval.as_str(),
                        ease.as_str(),
                        reps.as_str(),
                        next.as_str(),
                    ])?;
                }
            }
            wtr.flush()?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

async fn import_cmd(repo: Arc<dyn Repository>, cmd: ImportCmd) -> Result<()> {
    match cmd {
        ImportCmd::Json { path } => {
            let data = std::fs::read_to_string(&path)?;
            let decks = decode_decks(&data)?;
            let mut count = 0usize;
            for d in decks {
                let target = ensure_deck_by_name(&*repo, &d.name).await?;
                for c in d.cards {
                    import_card(&*repo, &target, c).await?;
                    count += 1;
                }
            }
            println!("imported {count} card(s)");
        }
        ImportCmd::Csv { path, deck } => {
            let mut rdr = csv::Reader::from_path(&path)?;
            let target_deck = match deck {
                Some(sel) => Some(resolve_deck(&*repo, &sel).await?),
                None => None,
            };
            let mut count = 0usize;
            for rec in rdr.records() {
                let rec = rec?;
                let deck_name = rec.get(0).unwrap_or("").trim();
                let card = card_from_record(&rec);
                let target = match &target_deck {
                    Some(d) => d.clone(),
                    None => ensure_deck_by_name(&*repo, deck_name).await?,
                };
                import_card(&*repo, &target, card).await?;
                count += 1;
            }
            println!("imported {count} card(s)");
        }
    }
    Ok(())
}

/// Rebuilds a card from an exported CSV row. Scheduling columns are optional.
fn card_from_record(rec: &csv::StringRecord) -> Flashcard {
    let mut card = Flashcard::new(rec.get(1).unwrap_or(""), rec.get(2).unwrap_or(""));
    let field = |i: usize| rec.get(i).map(str::trim).filter(|s| !s.is_empty());
    if let (Some(i), Some(e), Some(r)) = (field(3), field(4), field(5)) {
        if let (Ok(i), Ok(e), Ok(r)) = (i.parse::<u32>(), e.parse::<f64>(), r.parse::<u32>()) {
            card.state = Some(SchedulingState::new(i, e, r));
        }
    }
    card.next_review = field(6)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    card
}

async fn import_card<R: Repository + ?Sized>(repo: &R, deck: &Deck, card: Flashcard) -> Result<()> {
    let added = repo.add_card(&deck.id, &card.front, &card.back).await?;
    if card.state.is_some() || card.next_review.is_some() {
        let patch = CardPatch {
            state: card.state,
            next_review: card.next_review,
            ..CardPatch::default()
        };
        repo.update_card(&added.id, patch).await?;
    }
    Ok(())
}

// ===== Helpers =====

pub(crate) async fn resolve_deck<R: Repository + ?Sized>(repo: &R, sel: &str) -> Result<Deck> {
    if let Ok(d) = repo.get_deck(sel).await {
        return Ok(d);
    }
    let decks = repo.list_decks().await?;
    if let Some(d) = decks.into_iter().find(|d| d.name.eq_ignore_ascii_case(sel)) {
        return Ok(d);
    }
    bail!("deck not found: {}", sel)
}

async fn ensure_deck_by_name<R: Repository + ?Sized>(repo: &R, name: &str) -> Result<Deck> {
    let name = if name.trim().is_empty() { "Imported" } else { name.trim() };
    let decks = repo.list_decks().await?;
    if let Some(d) = decks.into_iter().find(|d| d.name.eq_ignore_ascii_case(name)) {
        return Ok(d);
    }
    Ok(repo.create_deck(name).await?)
}

async fn select_decks<R: Repository + ?Sized>(repo: &R, sel: Option<String>) -> Result<Vec<Deck>> {
    match sel {
        Some(s) => Ok(vec![resolve_deck(repo, &s).await?]),
        None => Ok(repo.list_decks().await?),
    }
}
