use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::*;

/// Flat keys of the persisted session record.
pub mod keys {
    pub const DATE_PLAYED: &str = "unveil:datePlayed";
    pub const STILL_PLAYING: &str = "unveil:stillPlaying";
    pub const CLICKS: &str = "unveil:clicks";
    pub const WRONG_GUESSES: &str = "unveil:wrongGuesses";
    pub const GUESSED_RIGHT: &str = "unveil:guessedRight";
    pub const IMAGE_SNAPSHOT: &str = "unveil:imageSnapshot";
    pub const REGION_SET: &str = "unveil:regionSet";
}

const DAY_FORMAT: &str = "%Y-%m-%d";

/// `YYYY-MM-DD`, zero-padded. Also keys the puzzle API.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DAY_FORMAT).ok()
}

/// Progress of a puzzle interrupted mid-play today.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumeRecord {
    pub clicks: u32,
    pub wrong_guesses: u32,
    pub snapshot: Snapshot,
    pub regions: Vec<RegionSpan>,
}

/// Outcome of a puzzle already completed today.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FinishedRecord {
    pub clicks: u32,
    pub wrong_guesses: u32,
    pub guessed_right: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionLoad {
    Fresh,
    Resuming(ResumeRecord),
    Finished(FinishedRecord),
}

/// Today's session record on top of a [`KeyValueStore`].
#[derive(Debug)]
pub struct SessionStore<K> {
    store: K,
    today: NaiveDate,
}

impl<K: KeyValueStore> SessionStore<K> {
    pub fn new(store: K, today: NaiveDate) -> Self {
        Self { store, today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn into_inner(self) -> K {
        self.store
    }

    /// Classifies the stored record against today's date. A record from
    /// another day, or one with a missing or malformed field, reads as
    /// fresh.
    pub fn load_for_today(&self) -> SessionLoad {
        let date_played = self.store.get(keys::DATE_PLAYED);
        if date_played.as_deref().and_then(parse_day_key) != Some(self.today) {
            log::debug!("no session for {} (stored: {:?})", self.today, date_played);
            return SessionLoad::Fresh;
        }

        let loaded = match self.required::<bool>(keys::STILL_PLAYING) {
            Ok(true) => self.load_resuming().map(SessionLoad::Resuming),
            Ok(false) => self.load_finished().map(SessionLoad::Finished),
            Err(err) => Err(err),
        };

        loaded.unwrap_or_else(|err| {
            log::warn!("discarding session for {}: {}", self.today, err);
            SessionLoad::Fresh
        })
    }

    /// Starts today's record from the freshly seeded surface.
    pub fn init_fresh(&mut self, snapshot: &Snapshot, regions: &[RegionSpan]) -> Result<()> {
        self.store.set(keys::DATE_PLAYED, &day_key(self.today))?;
        self.write(keys::STILL_PLAYING, &true)?;
        self.write(keys::CLICKS, &0u32)?;
        self.write(keys::WRONG_GUESSES, &0u32)?;
        self.write(keys::GUESSED_RIGHT, &false)?;
        self.write(keys::IMAGE_SNAPSHOT, snapshot)?;
        self.write(keys::REGION_SET, regions)
    }

    /// Stores the click count together with the surface and live set it
    /// produced.
    pub fn record_click(
        &mut self,
        clicks: u32,
        snapshot: &Snapshot,
        regions: &[RegionSpan],
    ) -> Result<()> {
        self.write(keys::IMAGE_SNAPSHOT, snapshot)?;
        self.write(keys::REGION_SET, regions)?;
        self.write(keys::CLICKS, &clicks)
    }

    pub fn record_wrong_guess(&mut self, wrong_guesses: u32) -> Result<()> {
        self.write(keys::WRONG_GUESSES, &wrong_guesses)
    }

    /// Marks today's puzzle as done and drops the fields only needed to
    /// resume it.
    pub fn finish(&mut self, guessed_right: bool) -> Result<()> {
        self.write(keys::STILL_PLAYING, &false)?;
        self.write(keys::GUESSED_RIGHT, &guessed_right)?;
        self.store.remove(keys::IMAGE_SNAPSHOT);
        self.store.remove(keys::REGION_SET);
        Ok(())
    }

    fn load_resuming(&self) -> Result<ResumeRecord> {
        Ok(ResumeRecord {
            clicks: self.required(keys::CLICKS)?,
            wrong_guesses: self.required(keys::WRONG_GUESSES)?,
            snapshot: self.required(keys::IMAGE_SNAPSHOT)?,
            regions: self.required(keys::REGION_SET)?,
        })
    }

    fn load_finished(&self) -> Result<FinishedRecord> {
        Ok(FinishedRecord {
            clicks: self.required(keys::CLICKS)?,
            wrong_guesses: self.required(keys::WRONG_GUESSES)?,
            guessed_right: self.required(keys::GUESSED_RIGHT)?,
        })
    }

    fn read<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        serde_json::from_str(&self.store.get(key)?).ok()
    }

    fn required<T: DeserializeOwned>(&self, key: &'static str) -> Result<T> {
        self.read(key).ok_or(GameError::MalformedRecord(key))
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let encoded =
            serde_json::to_string(value).map_err(|err| GameError::Storage(err.to_string()))?;
        self.store.set(key, &encoded)
    }
}
