//! Seeded synthetic inputs for benchmarking.
//!
//! [`SyntheticSets`] produces families of near-duplicate id sets so overlap
//! conditions find a realistic mix of edges. [`SyntheticRanking`] produces a
//! ranked list whose scores fall in tiers separated by steep drops.

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng, rngs::SmallRng, seq::index::sample};
use shoal_core::{IdSetIndex, IdentifiableIdSet, ScoredElement, sort_descending};

/// Errors that may occur during synthetic input generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum SyntheticError {
    /// The requested set count was zero.
    #[error("set count must be greater than zero")]
    ZeroSets,
    /// The requested family count was zero.
    #[error("family count must be greater than zero")]
    ZeroFamilies,
    /// The requested members-per-set was zero.
    #[error("members per set must be greater than zero")]
    ZeroMembers,
    /// More families than sets were requested.
    #[error("family count ({family_count}) must not exceed set count ({set_count})")]
    FamilyCountExceedsSetCount {
        /// Number of families requested.
        family_count: usize,
        /// Number of sets requested.
        set_count: usize,
    },
    /// The member universe cannot supply a full set.
    #[error("universe ({universe}) must hold at least {members} members")]
    UniverseTooSmall {
        /// Size of the member universe.
        universe: usize,
        /// Members required per set.
        members: usize,
    },
    /// The mutation rate was outside `[0, 1]`.
    #[error("mutation rate {rate} must lie within [0, 1]")]
    InvalidMutationRate {
        /// Rejected rate.
        rate: f64,
    },
    /// The requested element count was zero.
    #[error("element count must be greater than zero")]
    ZeroElements,
    /// The requested tier count was zero.
    #[error("tier count must be greater than zero")]
    ZeroTiers,
    /// A generated identifier did not fit in `u64`.
    #[error("generated identifier overflows u64")]
    Overflow,
}

/// Configuration for near-duplicate id set generation.
#[derive(Clone, Debug)]
pub struct SyntheticSetConfig {
    /// Number of sets to generate.
    pub set_count: usize,
    /// Number of prototype sets the generated sets derive from.
    pub family_count: usize,
    /// Members drawn for each prototype.
    pub members_per_set: usize,
    /// Members are drawn from `0..universe`.
    pub universe: usize,
    /// Probability that a prototype member is replaced in a derived set.
    pub mutation_rate: f64,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// A generated index of id sets.
#[derive(Clone, Debug)]
pub struct SyntheticSets {
    index: IdSetIndex,
}

impl SyntheticSets {
    /// Generates sets from the supplied configuration.
    ///
    /// Set ids run from zero in generation order.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is invalid.
    pub fn generate(config: &SyntheticSetConfig) -> Result<Self, SyntheticError> {
        validate_set_config(config)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let prototypes = (0..config.family_count)
            .map(|_| draw_members(&mut rng, config.universe, config.members_per_set))
            .collect::<Result<Vec<_>, _>>()?;

        let mut index = IdSetIndex::new();
        for position in 0..config.set_count {
            let id = u64::try_from(position).map_err(|_| SyntheticError::Overflow)?;
            let family = rng.gen_range(0..prototypes.len());
            let Some(prototype) = prototypes.get(family) else {
                continue;
            };
            let members = mutate(&mut rng, prototype, config)?;
            index.insert(IdentifiableIdSet::new(id, members));
        }
        Ok(Self { index })
    }

    /// Returns the generated index.
    #[must_use]
    pub const fn index(&self) -> &IdSetIndex {
        &self.index
    }

    /// Consumes the generator output.
    #[must_use]
    pub fn into_index(self) -> IdSetIndex {
        self.index
    }
}

fn validate_set_config(config: &SyntheticSetConfig) -> Result<(), SyntheticError> {
    if config.set_count == 0 {
        return Err(SyntheticError::ZeroSets);
    }
    if config.family_count == 0 {
        return Err(SyntheticError::ZeroFamilies);
    }
    if config.members_per_set == 0 {
        return Err(SyntheticError::ZeroMembers);
    }
    if config.family_count > config.set_count {
        return Err(SyntheticError::FamilyCountExceedsSetCount {
            family_count: config.family_count,
            set_count: config.set_count,
        });
    }
    if config.universe < config.members_per_set {
        return Err(SyntheticError::UniverseTooSmall {
            universe: config.universe,
            members: config.members_per_set,
        });
    }
    if !(0.0..=1.0).contains(&config.mutation_rate) {
        return Err(SyntheticError::InvalidMutationRate {
            rate: config.mutation_rate,
        });
    }
    Ok(())
}

fn draw_members(
    rng: &mut SmallRng,
    universe: usize,
    amount: usize,
) -> Result<Vec<u64>, SyntheticError> {
    sample(rng, universe, amount)
        .into_iter()
        .map(|member| u64::try_from(member).map_err(|_| SyntheticError::Overflow))
        .collect()
}

fn mutate(
    rng: &mut SmallRng,
    prototype: &[u64],
    config: &SyntheticSetConfig,
) -> Result<BTreeSet<u64>, SyntheticError> {
    let mut members = BTreeSet::new();
    for &member in prototype {
        if rng.gen_bool(config.mutation_rate) {
            let replacement = rng.gen_range(0..config.universe);
            members.insert(u64::try_from(replacement).map_err(|_| SyntheticError::Overflow)?);
        } else {
            members.insert(member);
        }
    }
    Ok(members)
}

/// Configuration for tiered ranked-list generation.
#[derive(Clone, Debug)]
pub struct SyntheticRankingConfig {
    /// Number of elements to generate.
    pub element_count: usize,
    /// Number of score tiers.
    pub tiers: u32,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// A generated ranked list, sorted by descending score.
#[derive(Clone, Debug)]
pub struct SyntheticRanking {
    elements: Vec<ScoredElement>,
}

impl SyntheticRanking {
    /// Generates a ranked list from the supplied configuration.
    ///
    /// Scores within a tier differ by less than `0.1`; adjacent tiers are a
    /// whole unit apart.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is invalid.
    #[expect(
        clippy::float_arithmetic,
        reason = "scores are tier offsets plus uniform jitter"
    )]
    pub fn generate(config: &SyntheticRankingConfig) -> Result<Self, SyntheticError> {
        if config.element_count == 0 {
            return Err(SyntheticError::ZeroElements);
        }
        if config.tiers == 0 {
            return Err(SyntheticError::ZeroTiers);
        }
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut elements = Vec::with_capacity(config.element_count);
        for position in 0..config.element_count {
            let id = u64::try_from(position).map_err(|_| SyntheticError::Overflow)?;
            let tier = rng.gen_range(0..config.tiers);
            let score = f64::from(config.tiers - tier) + rng.gen_range(0.0..0.1);
            elements.push(ScoredElement::new(id, score));
        }
        sort_descending(&mut elements);
        Ok(Self { elements })
    }

    /// Returns the ranked elements.
    #[must_use]
    pub fn elements(&self) -> &[ScoredElement] {
        &self.elements
    }
}
