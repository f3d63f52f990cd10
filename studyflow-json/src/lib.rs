use async_trait::async_trait;
use parking_lot::RwLock;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use studyflow_core::{
    find_card_mut, has_deck_named, remove_card, CardPatch, CoreError, Deck, Flashcard, Repository,
};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tokio::task;

pub mod legacy;
pub mod paths;

pub use legacy::{decode_decks, encode_decks};

/// Deck store backed by a single JSON file holding the deck array. Every
/// mutation rewrites the file atomically and drops a timestamped backup.
/// Mutations work on a copy of the deck list that replaces the in-memory one
/// only once it is on disk.
pub struct JsonStore {
    path: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
    decks: RwLock<Vec<Deck>>,
    // serializes read-modify-write cycles across awaits
    writer: Mutex<()>,
}

impl JsonStore {
    pub async fn open_default() -> Result<Self, CoreError> {
        let (file, backups) = paths::default_store_file();
        Self::open_with(file, backups, 10).await
    }

    pub async fn open_with(path: PathBuf, backups_dir: PathBuf, max_backups: usize) -> Result<Self, CoreError> {
        ensure_parent_dirs(&path)?;
        ensure_dir(&backups_dir)?;
        let decks = load_or_init(&path).await?;
        tracing::debug!(path = %path.display(), decks = decks.len(), "deck store opened");
        Ok(Self {
            path,
            backups_dir,
            max_backups: max_backups.max(1),
            decks: RwLock::new(decks),
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` on a copy of the decks, saves the copy, and only then makes it
    /// current. Errors from `f` or from the write leave the store untouched.
    async fn mutate<T, F>(&self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut Vec<Deck>) -> Result<T, CoreError>,
    {
        let _guard = self.writer.lock().await;
        let mut next = self.decks.read().clone();
        let out = f(&mut next)?;
        self.save(&next).await?;
        *self.decks.write() = next;
        Ok(out)
    }

    async fn save(&self, decks: &[Deck]) -> Result<(), CoreError> {
        let json = encode_decks(decks)?;
        let path = self.path.clone();
        let backups = self.backups_dir.clone();
        let keep = self.max_backups;

        task::spawn_blocking(move || write_with_backup(&path, &backups, keep, &json))
            .await
            .map_err(|_| CoreError::Storage("io"))?
            .map_err(|e| {
                tracing::error!(error = %e, "deck store write failed");
                CoreError::Storage("io")
            })
    }
}

fn ensure_parent_dirs(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|_| CoreError::Storage("io"))
}

async fn load_or_init(path: &Path) -> Result<Vec<Deck>, CoreError> {
    if path.exists() {
        let p = path.to_path_buf();
        let buf = task::spawn_blocking(move || fs::read_to_string(&p))
            .await
            .map_err(|_| CoreError::Storage("io"))?
            .map_err(|_| CoreError::Storage("io"))?;
        if buf.trim().is_empty() {
            return Ok(Vec::new());
        }
        decode_decks(&buf)
    } else {
        write_atomic(path, b"[]").map_err(|_| CoreError::Storage("io"))?;
        Ok(Vec::new())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    // rename replaces the previous file in one step
    tmp.persist(path)?;
    Ok(())
}

fn write_with_backup(path: &Path, backups_dir: &Path, max_backups: usize, json: &[u8]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::create_dir_all(backups_dir)?;

    write_atomic(path, json)?;

    // Backup rotation
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
    let backup_path = backups_dir.join(format!("studyflow-{ts}.json"));
    write_atomic(&backup_path, json)?;

    rotate_backups(backups_dir, max_backups)
}

fn rotate_backups(dir: &Path, keep: usize) -> Result<(), std::io::Error> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    // names embed the timestamp, so name order is age order
    entries.sort_by_key(|e| e.file_name());
    if entries.len() > keep {
        for e in &entries[0..entries.len() - keep] {
            let _ = fs::remove_file(e.path());
        }
    }
    Ok(())
}

#[async_trait]
impl Repository for JsonStore {
    async fn create_deck(&self, name: &str) -> Result<Deck, CoreError> {
        self.mutate(|decks| {
            if has_deck_named(decks, name) {
                return Err(CoreError::Conflict("deck name already exists"));
            }
            let deck = Deck::new(name);
            decks.push(deck.clone());
            Ok(deck)
        })
        .await
    }

    async fn get_deck(&self, id: &str) -> Result<Deck, CoreError> {
        let s = self.decks.read();
        s.iter().find(|d| d.id == id).cloned().ok_or(CoreError::NotFound("deck"))
    }

    async fn list_decks(&self) -> Result<Vec<Deck>, CoreError> {
        Ok(self.decks.read().clone())
    }

    async fn delete_deck(&self, id: &str) -> Result<(), CoreError> {
        self.mutate(|decks| {
            let Some(pos) = decks.iter().position(|d| d.id == id) else {
                return Err(CoreError::NotFound("deck"));
            };
            decks.remove(pos);
            Ok(())
        })
        .await
    }

    async fn add_card(&self, deck_id: &str, front: &str, back: &str) -> Result<Flashcard, CoreError> {
        self.mutate(|decks| {
            let Some(deck) = decks.iter_mut().find(|d| d.id == deck_id) else {
                return Err(CoreError::NotFound("deck"));
            };
            let card = Flashcard::new(front, back);
            deck.cards.push(card.clone());
            Ok(card)
        })
        .await
    }

    async fn update_card(&self, card_id: &str, patch: CardPatch) -> Result<Flashcard, CoreError> {
        self.mutate(|decks| {
            let Some(c) = find_card_mut(decks, card_id) else {
                return Err(CoreError::NotFound("card"));
            };
            c.apply(&patch);
            Ok(c.clone())
        })
        .await
    }

    async fn delete_card(&self, card_id: &str) -> Result<(), CoreError> {
        self.mutate(|decks| match remove_card(decks, card_id) {
            Some(_) => Ok(()),
            None => Err(CoreError::NotFound("card")),
        })
        .await
    }
}
