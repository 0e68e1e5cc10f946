use crate::enumerate::{GeneAssignment, PersonSet};
use crate::error::{HeredityError, Result};
use crate::genetics::GeneCount;
use ndarray::Array2;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Unnormalized probability mass per person.
///
/// Row `i` of `gene` holds the mass of person `i` carrying 0, 1 and 2 copies;
/// row `i` of `traits` holds the mass of the trait being absent and expressed.
pub struct Totals {
    names: Vec<String>,
    gene: Array2<f64>,
    traits: Array2<f64>,
}

impl Totals {
    /// All-zero totals for `names`, indexed like the network they came from.
    pub fn new(names: Vec<String>) -> Self {
        let n = names.len();
        Self {
            names,
            gene: Array2::zeros((n, GeneCount::ALL.len())),
            traits: Array2::zeros((n, 2)),
        }
    }

    /// Adds the probability `p` of one full assignment to every person's totals.
    pub fn update(&mut self, genes: &GeneAssignment, have_trait: PersonSet, p: f64) {
        for person in 0..self.names.len() {
            self.gene[[person, genes.count(person).index()]] += p;
            self.traits[[person, have_trait.contains(person) as usize]] += p;
        }
    }

    /// Accumulated gene mass of `person` at `count`.
    pub fn gene_mass(&self, person: usize, count: GeneCount) -> f64 {
        self.gene[[person, count.index()]]
    }

    pub fn trait_mass(&self, person: usize, expressed: bool) -> f64 {
        self.traits[[person, expressed as usize]]
    }

    /// Rescales every distribution to sum to one.
    ///
    /// A distribution with no mass means no assignment survived the
    /// evidence, reported as `ContradictoryEvidence` rather than NaN.
    pub fn normalize(self) -> Result<Posterior> {
        let Totals {
            names,
            mut gene,
            mut traits,
        } = self;

        for table in [&mut gene, &mut traits] {
            for (person, mut row) in table.rows_mut().into_iter().enumerate() {
                let total = row.sum();
                if total.is_nan() || total <= 0.0 {
                    return Err(HeredityError::ContradictoryEvidence {
                        person: names[person].clone(),
                    });
                }
                row.mapv_inplace(|mass| mass / total);
            }
        }

        let marginals = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let marginals = Marginals {
                    gene: GeneDistribution {
                        zero: gene[[i, 0]],
                        one: gene[[i, 1]],
                        two: gene[[i, 2]],
                    },
                    trait_: TraitDistribution {
                        expressed: traits[[i, 1]],
                        absent: traits[[i, 0]],
                    },
                };
                (name, marginals)
            })
            .collect();
        Ok(Posterior(marginals))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeneDistribution {
    #[serde(rename = "0")]
    pub zero: f64,
    #[serde(rename = "1")]
    pub one: f64,
    #[serde(rename = "2")]
    pub two: f64,
}

impl GeneDistribution {
    pub fn get(&self, count: GeneCount) -> f64 {
        match count {
            GeneCount::Zero => self.zero,
            GeneCount::One => self.one,
            GeneCount::Two => self.two,
        }
    }

    pub fn sum(&self) -> f64 {
        self.zero + self.one + self.two
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TraitDistribution {
    #[serde(rename = "true")]
    pub expressed: f64,
    #[serde(rename = "false")]
    pub absent: f64,
}

impl TraitDistribution {
    pub fn get(&self, expressed: bool) -> f64 {
        if expressed {
            self.expressed
        } else {
            self.absent
        }
    }

    pub fn sum(&self) -> f64 {
        self.expressed + self.absent
    }
}

/// One person's marginal distributions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Marginals {
    pub gene: GeneDistribution,
    #[serde(rename = "trait")]
    pub trait_: TraitDistribution,
}

/// Normalized marginals for every person, in name order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Posterior(BTreeMap<String, Marginals>);

impl Posterior {
    pub fn get(&self, name: &str) -> Option<&Marginals> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Marginals)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Posterior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, marginals) in self.0.iter() {
            writeln!(f, "{}:", name)?;
            writeln!(f, "  Gene:")?;
            for count in GeneCount::ALL.iter().rev() {
                writeln!(f, "    {}: {:.4}", count, marginals.gene.get(*count))?;
            }
            writeln!(f, "  Trait:")?;
            writeln!(f, "    True: {:.4}", marginals.trait_.expressed)?;
            writeln!(f, "    False: {:.4}", marginals.trait_.absent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn assignment(one: &[usize], two: &[usize]) -> GeneAssignment {
        GeneAssignment::new(
            PersonSet::from_iter(one.iter().copied()),
            PersonSet::from_iter(two.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn test_update_credits_every_person() {
        let mut totals = Totals::new(vec!["a".into(), "b".into(), "c".into()]);
        totals.update(&assignment(&[0], &[1]), PersonSet::from_iter(vec![2]), 0.25);
        assert_eq!(totals.gene_mass(0, GeneCount::One), 0.25);
        assert_eq!(totals.gene_mass(1, GeneCount::Two), 0.25);
        assert_eq!(totals.gene_mass(2, GeneCount::Zero), 0.25);
        assert_eq!(totals.trait_mass(0, false), 0.25);
        assert_eq!(totals.trait_mass(2, true), 0.25);
    }

    #[test]
    fn test_normalize_preserves_proportions() -> Result<(), Box<dyn Error>> {
        let mut totals = Totals::new(vec!["a".into()]);
        totals.update(&assignment(&[], &[]), PersonSet::empty(), 0.3);
        totals.update(&assignment(&[0], &[]), PersonSet::from_iter(vec![0]), 0.1);
        let posterior = totals.normalize()?;
        let a = posterior.get("a").unwrap();
        assert!((a.gene.zero - 0.75).abs() < 1e-12);
        assert!((a.gene.one - 0.25).abs() < 1e-12);
        assert_eq!(a.gene.two, 0.0);
        assert!((a.trait_.absent - 0.75).abs() < 1e-12);
        assert!((a.gene.sum() - 1.0).abs() < 1e-12);
        assert!((a.trait_.sum() - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_normalize_without_mass_is_contradictory() {
        let totals = Totals::new(vec!["a".into()]);
        let err = totals.normalize().unwrap_err();
        assert!(matches!(err, HeredityError::ContradictoryEvidence { person } if person == "a"));
    }

    #[test]
    fn test_posterior_json_shape() -> Result<(), Box<dyn Error>> {
        let mut totals = Totals::new(vec!["a".into()]);
        totals.update(&assignment(&[], &[0]), PersonSet::from_iter(vec![0]), 1.0);
        let json = serde_json::to_value(totals.normalize()?)?;
        assert_eq!(json["a"]["gene"]["2"], 1.0);
        assert_eq!(json["a"]["gene"]["0"], 0.0);
        assert_eq!(json["a"]["trait"]["true"], 1.0);
        assert_eq!(json["a"]["trait"]["false"], 0.0);
        Ok(())
    }

    #[test]
    fn test_posterior_display() -> Result<(), Box<dyn Error>> {
        let mut totals = Totals::new(vec!["Lily".into()]);
        totals.update(&assignment(&[], &[]), PersonSet::empty(), 3.0);
        totals.update(&assignment(&[0], &[]), PersonSet::empty(), 1.0);
        let text = totals.normalize()?.to_string();
        assert_eq!(
            text,
            "Lily:\n  Gene:\n    2: 0.0000\n    1: 0.2500\n    0: 0.7500\n  Trait:\n    True: 0.0000\n    False: 1.0000\n"
        );
        Ok(())
    }
}
