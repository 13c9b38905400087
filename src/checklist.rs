//! Client-local self-care checklist.
//!
//! The checklist never touches the server: checked items live in whatever
//! durable key-value store the front end provides, together with the
//! timestamp of the last edit. Stored state expires twelve hours after that
//! edit, so the window rolls forward on every toggle rather than resetting
//! at a fixed time of day.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Storage key for the persisted checklist blob.
pub const STORAGE_KEY: &str = "selfcare.checklist";

/// How long stored state stays valid after the last edit.
const EXPIRY_MS: i64 = 12 * 60 * 60 * 1000;

/// The default checklist offered to every user.
pub const DEFAULT_ITEMS: [Item; 5] = [
	Item { id: 1, label: "Drink water" },
	Item { id: 2, label: "Take a break" },
	Item { id: 3, label: "Move your body" },
	Item { id: 4, label: "Connect with someone" },
	Item { id: 5, label: "Practice mindfulness" },
];

/// Shown once every item is checked.
pub const COMPLETION_MESSAGE: &str = "Amazing job! You've completed all items today.";

/// A durable key-value store, such as browser local storage.
pub trait Store {
	fn get(&self, key: &str) -> Option<String>;
	fn set(&mut self, key: &str, value: &str);
	fn remove(&mut self, key: &str);
}

/// A single checklist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
	pub id: u32,
	pub label: &'static str,
}

/// The persisted `{items, timestamp}` blob.
#[derive(Debug, Serialize, Deserialize)]
struct Persisted {
	items: BTreeSet<u32>,
	/// Milliseconds since the Unix epoch, refreshed on every toggle.
	timestamp: i64,
}

/// The self-care checklist with its expiring checked-item state.
///
/// Two states: *active* (stored state younger than twelve hours, checked
/// items restored) and *expired* (no stored state, or stored state at
/// least twelve hours old, checked items empty). The only transition back
/// to expired outside the timer is an explicit [`reset`](Self::reset).
pub struct Checklist<S> {
	store: S,
	items: &'static [Item],
	checked: BTreeSet<u32>,
}

impl<S: Store> Checklist<S> {
	/// Restores the checklist from the store, discarding stored state that
	/// has expired or cannot be parsed.
	pub fn load(store: S, now: DateTime<Utc>) -> Self {
		let mut checklist = Self {
			store,
			items: &DEFAULT_ITEMS,
			checked: BTreeSet::new(),
		};

		let Some(raw) = checklist.store.get(STORAGE_KEY) else {
			return checklist;
		};

		match serde_json::from_str::<Persisted>(&raw) {
			Ok(persisted) if now.timestamp_millis() - persisted.timestamp < EXPIRY_MS => {
				checklist.checked = persisted.items;
			}
			Ok(_) => checklist.store.remove(STORAGE_KEY),
			Err(error) => {
				tracing::warn!(%error, "discarding unreadable checklist state");
				checklist.store.remove(STORAGE_KEY);
			}
		}

		checklist
	}

	/// Flips one item and persists the full checked set.
	///
	/// Persisting stamps the state with `now`, so the twelve-hour window
	/// rolls forward from the last edit.
	pub fn toggle(&mut self, id: u32, now: DateTime<Utc>) {
		if !self.checked.remove(&id) {
			self.checked.insert(id);
		}

		let persisted = Persisted {
			items: self.checked.clone(),
			timestamp: now.timestamp_millis(),
		};

		match serde_json::to_string(&persisted) {
			Ok(raw) => self.store.set(STORAGE_KEY, &raw),
			Err(error) => tracing::warn!(%error, "failed to persist checklist state"),
		}
	}

	/// Clears all checked items and the stored state, independent of the timer.
	pub fn reset(&mut self) {
		self.checked.clear();
		self.store.remove(STORAGE_KEY);
	}

	pub fn is_checked(&self, id: u32) -> bool {
		self.checked.contains(&id)
	}

	pub fn items(&self) -> &[Item] {
		self.items
	}

	pub fn checked_count(&self) -> usize {
		self.checked.len()
	}

	/// Completion percentage, 0 to 100.
	pub fn progress(&self) -> f64 {
		self.checked.len() as f64 / self.items.len() as f64 * 100.0
	}

	pub fn is_complete(&self) -> bool {
		self.checked.len() == self.items.len()
	}

	/// Time left until the stored state expires, if any is stored and
	/// still valid.
	pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
		let raw = self.store.get(STORAGE_KEY)?;
		let persisted = serde_json::from_str::<Persisted>(&raw).ok()?;
		let remaining = EXPIRY_MS - (now.timestamp_millis() - persisted.timestamp);

		(remaining > 0).then(|| Duration::milliseconds(remaining))
	}
}
