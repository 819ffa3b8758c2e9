//! Key-based child matching.
//!
//! Given the keys of the previous and the next children, [`plan`] decides which previous children are reused,
//! which of those have to move, and which children are inserted or deleted.
//! Reused children on the longest increasing run of previous positions stay where they are, so the number of moves is minimal.
//!
//! Time is O(n log n) in the number of children, plus hashing.

use core::hash::Hash;
use hashbrown::HashMap;

/// One step of a [`KeyedPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
	/// Reuse the previous child `old_idx` for `new_idx` without moving it.
	Keep { old_idx: usize, new_idx: usize },
	/// Reuse the previous child `old_idx` for `new_idx` and move it into place.
	Move { old_idx: usize, new_idx: usize },
	/// Create `new_idx`.
	Insert { new_idx: usize },
	/// Remove the previous child `old_idx`.
	Delete { old_idx: usize },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlanStats {
	pub kept: usize,
	pub moved: usize,
	pub inserted: usize,
	pub deleted: usize,
}
impl PlanStats {
	#[must_use]
	pub fn is_noop(&self) -> bool {
		self.moved + self.inserted + self.deleted == 0
	}
}

/// Deletions first (in previous order), then one edit per next child (in next order).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyedPlan {
	pub edits: Vec<Edit>,
	pub stats: PlanStats,
}
impl KeyedPlan {
	/// The edits for the next children, in next order.
	pub fn placements(&self) -> impl DoubleEndedIterator<Item = &Edit> {
		self.edits.iter().filter(|edit| !matches!(edit, Edit::Delete { .. }))
	}
}

/// A key occurred more than once among the next children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateKey {
	pub new_idx: usize,
}

/// Plans the transition from `old` to `new` keys.
///
/// Duplicate previous keys are tolerated: only the first occurrence can be reused, later ones are deleted.
///
/// # Errors
///
/// Iff a key occurs more than once in `new`.
pub fn plan<K: Hash + Eq>(old: &[K], new: &[K]) -> Result<KeyedPlan, DuplicateKey> {
	let mut new_index = HashMap::with_capacity(new.len());
	for (new_idx, key) in new.iter().enumerate() {
		if new_index.insert(key, new_idx).is_some() {
			return Err(DuplicateKey { new_idx });
		}
	}

	// For each next child, the previous position it reuses.
	let mut sources = vec![None; new.len()];
	let mut edits = Vec::with_capacity(old.len().max(new.len()));
	let mut stats = PlanStats::default();
	for (old_idx, key) in old.iter().enumerate() {
		match new_index.get(key) {
			Some(&new_idx) if sources[new_idx].is_none() => sources[new_idx] = Some(old_idx),
			_ => {
				edits.push(Edit::Delete { old_idx });
				stats.deleted += 1;
			}
		}
	}

	let reused: Vec<usize> = sources.iter().flatten().copied().collect();
	let mut stable = longest_increasing_run(&reused).into_iter().map(|i| reused[i]).peekable();

	for (new_idx, source) in sources.into_iter().enumerate() {
		edits.push(match source {
			None => {
				stats.inserted += 1;
				Edit::Insert { new_idx }
			}
			Some(old_idx) if stable.peek() == Some(&old_idx) => {
				stable.next();
				stats.kept += 1;
				Edit::Keep { old_idx, new_idx }
			}
			Some(old_idx) => {
				stats.moved += 1;
				Edit::Move { old_idx, new_idx }
			}
		});
	}

	Ok(KeyedPlan { edits, stats })
}

/// Indices into `sequence` of one of its longest strictly increasing subsequences, ascending.
fn longest_increasing_run(sequence: &[usize]) -> Vec<usize> {
	// `tails[l]`: index of the smallest tail of an increasing run of length `l + 1`.
	let mut tails: Vec<usize> = Vec::new();
	let mut predecessors = vec![None; sequence.len()];
	for (i, &value) in sequence.iter().enumerate() {
		let length = tails.partition_point(|&tail| sequence[tail] < value);
		if length > 0 {
			predecessors[i] = Some(tails[length - 1]);
		}
		if length == tails.len() {
			tails.push(i);
		} else {
			tails[length] = i;
		}
	}

	let mut run = Vec::with_capacity(tails.len());
	let mut cursor = tails.last().copied();
	while let Some(i) = cursor {
		run.push(i);
		cursor = predecessors[i];
	}
	run.reverse();
	run
}
