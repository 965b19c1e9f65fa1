//! Particle groups.
//!
//! A group is an ordered, stable, duplicate-free set of particle tags. Force
//! engines act on groups rather than on the whole system, so the same system
//! can carry several engines driving disjoint (or overlapping) subsets.
//!
//! # Example
//!
//! ```
//! use abpe::group::Group;
//!
//! let swimmers = Group::new(vec![0, 2, 4], 6).unwrap();
//! assert_eq!(swimmers.len(), 3);
//! assert!(swimmers.contains(2));
//! assert!(!swimmers.contains(1));
//! ```

use crate::error::ConfigError;

/// An ordered, stable set of particle tags.
///
/// Member order is the order given at construction and never changes; force
/// engines index their per-member state by position in this order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    tags: Vec<u32>,
}

impl Group {
    /// Create a group from explicit tags.
    ///
    /// Every tag must exist in a system of `system_size` particles and may
    /// appear at most once. An empty tag list is allowed here; engines that
    /// cannot act on an empty group reject it at their own construction.
    pub fn new(tags: Vec<u32>, system_size: usize) -> Result<Self, ConfigError> {
        let mut seen = vec![false; system_size];
        for &tag in &tags {
            let idx = tag as usize;
            if idx >= system_size {
                return Err(ConfigError::TagOutOfRange { tag, system_size });
            }
            if seen[idx] {
                return Err(ConfigError::DuplicateTag(tag));
            }
            seen[idx] = true;
        }
        Ok(Self { tags })
    }

    /// The group containing every particle, in tag order.
    pub fn all(system_size: usize) -> Self {
        Self {
            tags: (0..system_size as u32).collect(),
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Member tags in group order.
    pub fn tags(&self) -> &[u32] {
        &self.tags
    }

    /// True if `tag` is a member.
    pub fn contains(&self, tag: u32) -> bool {
        self.tags.contains(&tag)
    }

    /// Position of `tag` in the group, if it is a member.
    pub fn position_of(&self, tag: u32) -> Option<usize> {
        self.tags.iter().position(|&t| t == tag)
    }
}
