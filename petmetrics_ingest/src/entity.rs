//! Owners and their pets.
use petmetrics_store::Dimension;
use rand::Rng;

use crate::error::{InvalidConfigSnafu, Result};

pub const OWNER_DIMENSION: &str = "userId";
pub const DEPENDENT_DIMENSION: &str = "petId";

/// An owner and one of their pets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    pub owner_id: String,
    pub dependent_id: String,
}

impl Entity {
    pub fn new(owner_id: impl Into<String>, dependent_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            dependent_id: dependent_id.into(),
        }
    }

    /// The dimensions identifying this entity on a record.
    pub fn dimensions(&self) -> Vec<Dimension> {
        vec![
            Dimension::new(OWNER_DIMENSION, &self.owner_id),
            Dimension::new(DEPENDENT_DIMENSION, &self.dependent_id),
        ]
    }
}

/// The fixed set of entities that events are drawn from.
///
/// Owners are named `user_1..=user_N`, their pets `pet_{owner}_{k}` with
/// `k` in `1..=dependents_per_owner`.
#[derive(Debug, Clone)]
pub struct EntityPool {
    owners: Vec<String>,
    dependents_per_owner: u32,
}

impl EntityPool {
    pub fn new(owners: u32, dependents_per_owner: u32) -> Result<Self> {
        if owners == 0 || dependents_per_owner == 0 {
            return InvalidConfigSnafu {
                message: format!(
                    "entity pool needs at least one owner and one dependent, got {owners} owners and {dependents_per_owner} dependents"
                ),
            }
            .fail();
        }

        Ok(Self {
            owners: (1..=owners).map(|i| format!("user_{i}")).collect(),
            dependents_per_owner,
        })
    }

    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    pub fn dependents_per_owner(&self) -> u32 {
        self.dependents_per_owner
    }

    /// Pick an owner uniformly, then one of their pets uniformly.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Entity {
        let owner = &self.owners[rng.gen_range(0..self.owners.len())];
        let dependent = rng.gen_range(1..=self.dependents_per_owner);

        Entity::new(owner.clone(), format!("pet_{owner}_{dependent}"))
    }
}

impl Default for EntityPool {
    fn default() -> Self {
        Self {
            owners: (1..=19).map(|i| format!("user_{i}")).collect(),
            dependents_per_owner: 5,
        }
    }
}
