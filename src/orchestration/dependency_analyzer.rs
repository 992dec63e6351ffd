//! # Dependency Analyzer
//!
//! Partitions a shot list into ordered groups whose members can render
//! concurrently.
//!
//! ## Grouping Rule
//!
//! A single left-to-right pass keeps one open group. Shot `i` opens a new
//! group when its scene differs from shot `i - 1`, or when its primary
//! character is non-empty and already appears in the open group. Otherwise it
//! joins the open group.
//!
//! Only the open group is consulted for character reuse. A character used in
//! an earlier, closed group does not force a split, because the barrier
//! between groups already orders those shots.
//!
//! The secondary character (`character2`) does not take part in exclusivity.
//!
//! ## Properties
//!
//! - Every index in `0..N` belongs to exactly one group.
//! - Groups are contiguous index ranges in shot order.
//! - Each group after the first depends on exactly the group before it.

use crate::models::ShotConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A set of shots safe to render concurrently
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGroup {
    pub group_id: usize,
    pub shot_indices: BTreeSet<usize>,
    /// Groups that must finish before this one starts
    pub dependencies: BTreeSet<usize>,
}

impl DependencyGroup {
    fn open(group_id: usize, first_shot: usize) -> Self {
        let dependencies = if group_id == 0 {
            BTreeSet::new()
        } else {
            BTreeSet::from([group_id - 1])
        };

        Self {
            group_id,
            shot_indices: BTreeSet::from([first_shot]),
            dependencies,
        }
    }

    pub fn len(&self) -> usize {
        self.shot_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shot_indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.shot_indices.contains(&index)
    }
}

/// Ordered groups covering the whole shot index range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionGraph {
    pub groups: Vec<DependencyGroup>,
}

impl ExecutionGraph {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyGroup> {
        self.groups.iter()
    }

    /// Number of shots covered by the graph
    pub fn shot_count(&self) -> usize {
        self.groups.iter().map(DependencyGroup::len).sum()
    }

    pub fn largest_group_size(&self) -> usize {
        self.groups.iter().map(DependencyGroup::len).max().unwrap_or(0)
    }

    /// Group holding `index`, if any
    pub fn group_of(&self, index: usize) -> Option<&DependencyGroup> {
        self.groups.iter().find(|group| group.contains(index))
    }
}

/// Stateless grouping of shot lists
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyAnalyzer;

impl DependencyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, shots: &[ShotConfig]) -> ExecutionGraph {
        let mut groups: Vec<DependencyGroup> = Vec::new();
        let mut open_characters: HashSet<&str> = HashSet::new();

        for (index, shot) in shots.iter().enumerate() {
            let starts_group = match index.checked_sub(1).map(|prev| &shots[prev]) {
                None => true,
                Some(previous) => {
                    previous.scene != shot.scene
                        || (shot.has_character()
                            && open_characters.contains(shot.character.as_str()))
                }
            };

            if starts_group {
                groups.push(DependencyGroup::open(groups.len(), index));
                open_characters.clear();
            } else if let Some(open) = groups.last_mut() {
                open.shot_indices.insert(index);
            }

            if shot.has_character() {
                open_characters.insert(shot.character.as_str());
            }
        }

        ExecutionGraph { groups }
    }
}
