#![crate_name = "heredity"]
use std::collections::{BTreeMap, HashMap};

pub mod prelude;

pub mod distribution;
pub mod enumerate;
pub mod error;
pub mod genetics;
pub mod heredity;
pub mod observable;

use crate::enumerate::{Evidence, PersonSet, MAX_PEOPLE};
use crate::error::{HeredityError, Result};

pub type People = BTreeMap<String, Person>;

/// A member of a pedigree.
///
/// Either both parents are recorded or neither is; a person without parents
/// is a founder. [`Pedigree::validate`] enforces this.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    name: String,
    mother: Option<String>,
    father: Option<String>,
    observed: Option<bool>,
}

impl Person {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            mother: None,
            father: None,
            observed: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mother(&self) -> Option<&str> {
        self.mother.as_deref()
    }

    pub fn father(&self) -> Option<&str> {
        self.father.as_deref()
    }

    /// Observed trait value, `None` when unknown.
    pub fn observed(&self) -> Option<bool> {
        self.observed
    }

    pub fn is_founder(&self) -> bool {
        self.mother.is_none() && self.father.is_none()
    }
}

/// An observation of a Person
pub enum Observation {
    /// An Observation that a Person exists
    Individual(String),

    /// An Observation of a Person's mother
    /// Person's name, mother's name
    Mother(String, String),

    /// An Observation of a Person's father
    /// Person's name, father's name
    Father(String, String),

    /// An Observation of whether a Person expresses the trait
    /// Person's name, expressed
    Trait(String, bool),
}

/// A family tree with partial trait observations.
#[derive(Clone, Debug, Default)]
pub struct Pedigree {
    people: People,
}

impl Pedigree {
    /// Constructs a new empty `Pedigree`
    ///
    /// The `Pedigree` can be filled up iteratively by calling
    /// `observe()` or the `founder()` and `child()` shorthands.
    pub fn new() -> Self {
        Self {
            people: People::new(),
        }
    }

    /// Observes a single `Observation`
    ///
    /// Repeating an observation is harmless; contradicting an earlier one
    /// (a second, different mother, or a flipped trait) is an error.
    pub fn _observe(&mut self, observation: Observation) -> Result<()> {
        match observation {
            Observation::Individual(name) => {
                self.entry(&name);
            }
            Observation::Mother(name, mother) => {
                let person = self.entry(&name);
                Self::record(&mut person.mother, mother, &name, "mother")?;
            }
            Observation::Father(name, father) => {
                let person = self.entry(&name);
                Self::record(&mut person.father, father, &name, "father")?;
            }
            Observation::Trait(name, expressed) => {
                let person = self.entry(&name);
                Self::record(&mut person.observed, expressed, &name, "trait")?;
            }
        }
        Ok(())
    }

    /// Observe all the data in the argument.
    pub fn observe<I>(&mut self, observable: I) -> Result<()>
    where
        I: Iterator<Item = Result<Observation>>,
    {
        for observation in observable {
            self._observe(observation?)?;
        }
        Ok(())
    }

    /// Adds a person without recorded parents.
    pub fn founder(&mut self, name: &str, observed: Option<bool>) -> Result<&mut Self> {
        self._observe(Observation::Individual(name.into()))?;
        if let Some(expressed) = observed {
            self._observe(Observation::Trait(name.into(), expressed))?;
        }
        Ok(self)
    }

    /// Adds a person with both parents recorded.
    pub fn child(
        &mut self,
        name: &str,
        mother: &str,
        father: &str,
        observed: Option<bool>,
    ) -> Result<&mut Self> {
        self.founder(name, observed)?;
        self._observe(Observation::Mother(name.into(), mother.into()))?;
        self._observe(Observation::Father(name.into(), father.into()))?;
        Ok(self)
    }

    fn entry(&mut self, name: &str) -> &mut Person {
        self.people
            .entry(name.into())
            .or_insert_with(|| Person::new(name))
    }

    fn record<T: PartialEq + std::fmt::Debug>(
        slot: &mut Option<T>,
        value: T,
        name: &str,
        what: &str,
    ) -> Result<()> {
        if let Some(existing) = slot.as_ref() {
            if *existing != value {
                return Err(HeredityError::InvalidPedigree(format!(
                    "conflicting {} for '{}': {:?} and {:?}",
                    what, name, existing, value
                )));
            }
        }
        *slot = Some(value);
        Ok(())
    }

    pub fn person(&self, name: &str) -> Option<&Person> {
        self.people.get(name)
    }

    /// People in name order.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Checks the structural preconditions of inference.
    ///
    /// Every person has zero or two parents, every parent is a member of the
    /// pedigree, nobody is their own ancestor, and the population fits the
    /// enumeration limit.
    pub fn validate(&self) -> Result<()> {
        if self.people.len() > MAX_PEOPLE {
            return Err(HeredityError::InvalidPedigree(format!(
                "{} people exceed the limit of {} for exact enumeration",
                self.people.len(),
                MAX_PEOPLE
            )));
        }

        for person in self.people.values() {
            match (&person.mother, &person.father) {
                (None, None) => {}
                (Some(mother), Some(father)) => {
                    for (role, parent) in [("mother", mother), ("father", father)] {
                        if parent == &person.name {
                            return Err(HeredityError::InvalidPedigree(format!(
                                "'{}' is listed as their own {}",
                                person.name, role
                            )));
                        }
                        if !self.people.contains_key(parent) {
                            return Err(HeredityError::InvalidPedigree(format!(
                                "'{}' references unknown {} '{}'",
                                person.name, role, parent
                            )));
                        }
                    }
                }
                (Some(_), None) | (None, Some(_)) => {
                    return Err(HeredityError::InvalidPedigree(format!(
                        "'{}' has exactly one parent recorded; record both or neither",
                        person.name
                    )));
                }
            }
        }

        // Kahn's algorithm over parent -> child edges; leftovers sit on a cycle.
        let index: HashMap<&str, usize> = self
            .people
            .keys()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let n = self.people.len();
        let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0u32; n];
        for (i, person) in self.people.values().enumerate() {
            for parent in person.mother.iter().chain(person.father.iter()) {
                children_of[index[parent.as_str()]].push(i);
                in_degree[i] += 1;
            }
        }

        let mut queue: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut visited = 0usize;
        while let Some(node) = queue.pop() {
            visited += 1;
            for &child in &children_of[node] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push(child);
                }
            }
        }

        if visited != n {
            return Err(HeredityError::InvalidPedigree(
                "pedigree contains a cycle: someone is their own ancestor".to_string(),
            ));
        }
        Ok(())
    }

    /// Validates the pedigree and compiles it into an index-based `Network`.
    pub fn network(&self) -> Result<Network> {
        self.validate()?;

        let index: HashMap<&str, usize> = self
            .people
            .keys()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut evidence = Evidence::new();
        let mut nodes = Vec::with_capacity(self.people.len());
        for (i, person) in self.people.values().enumerate() {
            if let Some(expressed) = person.observed {
                evidence.observe(i, expressed);
            }
            let parents = match (&person.mother, &person.father) {
                (Some(mother), Some(father)) => {
                    Some((index[mother.as_str()], index[father.as_str()]))
                }
                _ => None,
            };
            nodes.push(Node {
                name: person.name.clone(),
                parents,
            });
        }

        Ok(Network { nodes, evidence })
    }
}

/// One person's gene node in a compiled `Network`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    name: String,
    parents: Option<(usize, usize)>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mother and father indices, `None` for a founder.
    pub fn parents(&self) -> Option<(usize, usize)> {
        self.parents
    }
}

/// The Bayesian network of a validated pedigree.
///
/// People are numbered in name order; parent references are indices into
/// the same numbering.
#[derive(Clone, Debug)]
pub struct Network {
    nodes: Vec<Node>,
    evidence: Evidence,
}

impl Network {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Everybody in the network.
    pub fn universe(&self) -> PersonSet {
        PersonSet::first(self.nodes.len())
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn family() -> Result<Pedigree> {
        let mut pedigree = Pedigree::new();
        pedigree
            .founder("James", Some(true))?
            .founder("Lily", Some(false))?
            .child("Harry", "Lily", "James", None)?;
        Ok(pedigree)
    }

    #[test]
    fn test_people_are_in_name_order() -> Result<(), Box<dyn Error>> {
        let pedigree = family()?;
        let names: Vec<_> = pedigree.people().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Harry", "James", "Lily"]);
        Ok(())
    }

    #[test]
    fn test_network_resolves_parent_indices() -> Result<(), Box<dyn Error>> {
        let network = family()?.network()?;
        assert_eq!(network.len(), 3);
        assert_eq!(network.nodes()[0].parents(), Some((2, 1)));
        assert_eq!(network.nodes()[1].parents(), None);
        assert_eq!(network.evidence().known(), PersonSet::from_iter(vec![1, 2]));
        Ok(())
    }

    #[test]
    fn test_single_parent_is_rejected() -> Result<(), Box<dyn Error>> {
        let mut pedigree = Pedigree::new();
        pedigree.founder("Lily", None)?.founder("Harry", None)?;
        pedigree._observe(Observation::Mother("Harry".into(), "Lily".into()))?;
        let err = pedigree.validate().unwrap_err();
        assert!(matches!(err, HeredityError::InvalidPedigree(_)));
        Ok(())
    }

    #[test]
    fn test_unknown_parent_is_rejected() -> Result<(), Box<dyn Error>> {
        let mut pedigree = Pedigree::new();
        pedigree
            .founder("Lily", None)?
            .child("Harry", "Lily", "James", None)?;
        assert!(pedigree.network().is_err());
        Ok(())
    }

    #[test]
    fn test_cycle_is_rejected() -> Result<(), Box<dyn Error>> {
        let mut pedigree = Pedigree::new();
        pedigree
            .child("A", "B", "C", None)?
            .child("B", "A", "C", None)?
            .founder("C", None)?;
        let err = pedigree.validate().unwrap_err();
        assert!(err.to_string().contains("cycle"));
        Ok(())
    }

    #[test]
    fn test_own_parent_is_rejected() -> Result<(), Box<dyn Error>> {
        let mut pedigree = Pedigree::new();
        pedigree.founder("B", None)?.child("A", "A", "B", None)?;
        assert!(pedigree.validate().is_err());
        Ok(())
    }

    #[test]
    fn test_conflicting_observation_is_rejected() -> Result<(), Box<dyn Error>> {
        let mut pedigree = Pedigree::new();
        pedigree.founder("James", Some(true))?;
        assert!(pedigree.founder("James", Some(true)).is_ok());
        assert!(pedigree.founder("James", Some(false)).is_err());
        Ok(())
    }

    fn founders(n: usize) -> Result<Pedigree> {
        let mut pedigree = Pedigree::new();
        for i in 0..n {
            pedigree.founder(&format!("P{:02}", i), None)?;
        }
        Ok(pedigree)
    }

    #[test]
    fn test_population_at_limit_compiles() -> Result<(), Box<dyn Error>> {
        let network = founders(MAX_PEOPLE)?.network()?;
        assert_eq!(network.len(), MAX_PEOPLE);
        assert_eq!(network.universe().len(), MAX_PEOPLE);
        Ok(())
    }

    #[test]
    fn test_population_over_limit_is_rejected() -> Result<(), Box<dyn Error>> {
        let pedigree = founders(MAX_PEOPLE + 1)?;
        assert!(matches!(pedigree.validate(), Err(HeredityError::InvalidPedigree(_))));
        assert!(matches!(pedigree.network(), Err(HeredityError::InvalidPedigree(_))));
        Ok(())
    }
}
