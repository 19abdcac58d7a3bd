use chrono::NaiveDate;
use gloo::storage::{LocalStorage, Storage};
use serde::Serialize;
use serde::de::DeserializeOwned;
use unveil_core::{GameError, KeyValueStore};

/// Types persisted as one JSON value in `localStorage`.
pub(crate) trait StorageKey {
    const KEY: &'static str;
}

pub(crate) trait LocalOrDefault: Sized {
    fn local_or_default() -> Self;
    fn local_save(&self);
}

impl<T: StorageKey + Serialize + DeserializeOwned + Default> LocalOrDefault for T {
    fn local_or_default() -> Self {
        LocalStorage::get(T::KEY).unwrap_or_default()
    }

    fn local_save(&self) {
        if let Err(err) = LocalStorage::set(T::KEY, self) {
            log::error!("Could not save {} to local storage: {:?}", T::KEY, err);
        }
    }
}

/// Raw string access to `localStorage` for the session record.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct LocalKeyValueStore;

impl KeyValueStore for LocalKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> unveil_core::Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| GameError::Storage(format!("{} ({:?})", key, err)))
    }

    fn remove(&mut self, key: &str) {
        if let Err(err) = LocalStorage::raw().remove_item(key) {
            log::warn!("could not remove {}: {:?}", key, err);
        }
    }
}

/// Today's date in the browser's local time zone.
pub(crate) fn local_today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
}
