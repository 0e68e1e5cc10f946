use crate::distribution::{Posterior, Totals};
use crate::enumerate::{gene_assignments, GeneAssignment, PersonSet};
use crate::error::Result;
use crate::genetics::ProbabilityModel;
use crate::{Network, Pedigree};
use tracing::{debug, info, warn};

/// Populations above this size take noticeably long to enumerate.
const LARGE_POPULATION: usize = 15;

/// Exact posterior inference over gene copies and trait expression.
pub trait Heredity {
    /// Marginal gene and trait distributions of every person given the
    /// observed traits.
    fn heredity(&self, model: &ProbabilityModel) -> Result<Posterior>;

    /// Sum of the joint probability of every assignment, ignoring evidence.
    ///
    /// Equals one (up to rounding) for any valid pedigree and model.
    fn total_probability(&self, model: &ProbabilityModel) -> Result<f64>;
}

impl Heredity for Pedigree {
    fn heredity(&self, model: &ProbabilityModel) -> Result<Posterior> {
        model.validate()?;
        let network = self.network()?;
        if network.is_empty() {
            debug!("empty pedigree, nothing to infer");
            return Ok(Posterior::default());
        }
        if network.len() > LARGE_POPULATION {
            warn!(
                people = network.len(),
                "exact inference is exponential in the number of people"
            );
        }
        info!(
            people = network.len(),
            observed = network.evidence().known().len(),
            "starting exact inference"
        );

        let universe = network.universe();
        let mut totals = Totals::new(network.names().map(String::from).collect());
        let mut skipped = 0u64;
        let mut evaluated = 0u64;

        for have_trait in universe.subsets() {
            if !network.evidence().admits(have_trait) {
                skipped += 1;
                continue;
            }
            for genes in gene_assignments(universe) {
                let p = joint_probability(&network, model, &genes, have_trait);
                totals.update(&genes, have_trait, p);
                evaluated += 1;
            }
        }

        debug!(skipped, evaluated, "enumeration finished");
        totals.normalize()
    }

    fn total_probability(&self, model: &ProbabilityModel) -> Result<f64> {
        model.validate()?;
        let network = self.network()?;
        let universe = network.universe();
        let total: f64 = universe
            .subsets()
            .flat_map(|have_trait| gene_assignments(universe).map(move |genes| (genes, have_trait)))
            .map(|(genes, have_trait)| joint_probability(&network, model, &genes, have_trait))
            .sum();
        Ok(total)
    }
}

/// Probability of one complete assignment of gene copies and trait
/// expression to every person in `network`.
///
/// Each person contributes the probability of their gene count (the prior
/// for founders, inheritance from both parents otherwise) times the
/// probability of their trait value given that count.
pub fn joint_probability(
    network: &Network,
    model: &ProbabilityModel,
    genes: &GeneAssignment,
    have_trait: PersonSet,
) -> f64 {
    network
        .nodes()
        .iter()
        .enumerate()
        .map(|(person, node)| {
            let count = genes.count(person);
            let gene = match node.parents() {
                None => model.gene_prior(count),
                Some((mother, father)) => {
                    model.inheritance(count, genes.count(mother), genes.count(father))
                }
            };
            gene * model.trait_given_gene(count, have_trait.contains(person))
        })
        .product()
}
