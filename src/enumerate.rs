//! Combinatorial generators over the people of a pedigree.
//!
//! People are addressed by their index in the compiled
//! [`Network`](crate::Network), so every set of people is a bitmask and every
//! subset sequence is produced lazily by walking the submasks of a universe.
//! Nothing is materialized: a full search over `N` people visits `2^N` trait
//! hypotheses times `3^N` gene labelings, which is what bounds practical
//! pedigrees to roughly fifteen people.

use crate::genetics::GeneCount;

/// Largest population a [`PersonSet`] can address.
pub const MAX_PEOPLE: usize = 64;

/// A set of people, one bit per person index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PersonSet(u64);

impl PersonSet {
    pub fn empty() -> Self {
        Self(0)
    }

    /// The set `{0, 1, .., n - 1}`.
    pub fn first(n: usize) -> Self {
        debug_assert!(n <= MAX_PEOPLE);
        if n >= MAX_PEOPLE {
            Self(u64::MAX)
        } else {
            Self((1u64 << n) - 1)
        }
    }

    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn contains(self, person: usize) -> bool {
        person < MAX_PEOPLE && self.0 & (1u64 << person) != 0
    }

    pub fn insert(&mut self, person: usize) {
        debug_assert!(person < MAX_PEOPLE);
        self.0 |= 1u64 << person;
    }

    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Member indices in increasing order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let person = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(person)
        })
    }

    /// Every subset of this set, each exactly once.
    pub fn subsets(self) -> Subsets {
        Subsets::of(self)
    }
}

impl FromIterator<usize> for PersonSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Self::empty();
        for person in iter {
            set.insert(person);
        }
        set
    }
}

/// Lazy sequence of all subsets of a universe, starting with the empty set.
///
/// A clone continues independently from the same position; call
/// [`Subsets::of`] again for a fresh pass.
#[derive(Clone, Debug)]
pub struct Subsets {
    universe: u64,
    next: Option<u64>,
}

impl Subsets {
    pub fn of(universe: PersonSet) -> Self {
        Self {
            universe: universe.0,
            next: Some(0),
        }
    }
}

impl Iterator for Subsets {
    type Item = PersonSet;

    fn next(&mut self) -> Option<PersonSet> {
        let current = self.next?;
        // Increment within the universe's bits only; wrapping back to zero ends the walk.
        let successor = (current | !self.universe).wrapping_add(1) & self.universe;
        self.next = if successor == 0 {
            None
        } else {
            Some(successor)
        };
        Some(PersonSet(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            None => (0, Some(0)),
            Some(_) => (1, None),
        }
    }
}

/// A labeling of every person with 0, 1 or 2 gene copies.
///
/// Only the one- and two-copy groups are stored; everyone else carries zero
/// copies, so the three groups always partition the population.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeneAssignment {
    one: PersonSet,
    two: PersonSet,
}

impl GeneAssignment {
    /// Returns `None` when the two groups overlap.
    pub fn new(one: PersonSet, two: PersonSet) -> Option<Self> {
        if one.intersection(two).is_empty() {
            Some(Self { one, two })
        } else {
            None
        }
    }

    pub fn one_gene(&self) -> PersonSet {
        self.one
    }

    pub fn two_genes(&self) -> PersonSet {
        self.two
    }

    pub fn count(&self, person: usize) -> GeneCount {
        if self.one.contains(person) {
            GeneCount::One
        } else if self.two.contains(person) {
            GeneCount::Two
        } else {
            GeneCount::Zero
        }
    }
}

/// Every disjoint labeling of `universe` into 0/1/2-copy groups, each exactly once.
pub fn gene_assignments(universe: PersonSet) -> impl Iterator<Item = GeneAssignment> + Clone {
    Subsets::of(universe).flat_map(move |one| {
        Subsets::of(universe.difference(one)).map(move |two| GeneAssignment { one, two })
    })
}

/// Observed trait values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Evidence {
    known: PersonSet,
    expressed: PersonSet,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, person: usize, expressed: bool) {
        self.known.insert(person);
        if expressed {
            self.expressed.insert(person);
        }
    }

    /// People with an observed trait value.
    pub fn known(&self) -> PersonSet {
        self.known
    }

    /// Whether a trait hypothesis agrees with every observation.
    pub fn admits(&self, have_trait: PersonSet) -> bool {
        have_trait.intersection(self.known) == self.expressed
    }
}
