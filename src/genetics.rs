use crate::error::{HeredityError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;

const TOLERANCE: f64 = 1e-9;

/// Number of copies of the variant allele an individual carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeneCount {
    Zero,
    One,
    Two,
}

impl GeneCount {
    pub const ALL: [GeneCount; 3] = [GeneCount::Zero, GeneCount::One, GeneCount::Two];

    /// Column of this count in per-person gene tables.
    pub fn index(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl fmt::Display for GeneCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Bernoulli distribution of trait expression for one gene count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraitRow {
    #[serde(rename = "true")]
    pub expressed: f64,
    #[serde(rename = "false")]
    pub absent: f64,
}

impl TraitRow {
    pub fn new(expressed: f64, absent: f64) -> Self {
        Self { expressed, absent }
    }

    fn get(&self, expressed: bool) -> f64 {
        if expressed {
            self.expressed
        } else {
            self.absent
        }
    }
}

/// Conditional probability tables of the pedigree network.
///
/// One gene node and one trait node per person. Founders draw their gene
/// count from `gene`, children inherit one allele from each parent subject
/// to `mutation`, and every trait node depends only on its own gene node.
///
/// The model is an ordinary value: pass a different one to
/// [`Heredity::heredity`](crate::heredity::Heredity::heredity) to run the
/// same pedigree under alternative parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityModel {
    gene: [f64; 3],
    #[serde(rename = "trait")]
    trait_given_gene: [TraitRow; 3],
    mutation: f64,
}

impl Default for ProbabilityModel {
    fn default() -> Self {
        Self {
            gene: [0.96, 0.03, 0.01],
            trait_given_gene: [
                TraitRow::new(0.01, 0.99),
                TraitRow::new(0.56, 0.44),
                TraitRow::new(0.65, 0.35),
            ],
            mutation: 0.01,
        }
    }
}

impl ProbabilityModel {
    /// Constructs a validated model.
    ///
    /// `gene` and `trait_given_gene` are indexed by gene count (0, 1, 2).
    pub fn new(gene: [f64; 3], trait_given_gene: [TraitRow; 3], mutation: f64) -> Result<Self> {
        let model = Self {
            gene,
            trait_given_gene,
            mutation,
        };
        model.validate()?;
        Ok(model)
    }

    /// Reads a model from JSON and validates it.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let model: Self = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Checks that every table is a probability distribution.
    pub fn validate(&self) -> Result<()> {
        let in_unit = |p: f64| (0.0..=1.0).contains(&p);

        if !self.gene.iter().all(|p| in_unit(*p)) {
            return Err(HeredityError::InvalidModel(format!(
                "gene prior {:?} has an entry outside [0, 1]",
                self.gene
            )));
        }
        let sum: f64 = self.gene.iter().sum();
        if (sum - 1.0).abs() > TOLERANCE {
            return Err(HeredityError::InvalidModel(format!(
                "gene prior sums to {}, expected 1",
                sum
            )));
        }

        for (count, row) in GeneCount::ALL.iter().zip(self.trait_given_gene.iter()) {
            if !in_unit(row.expressed) || !in_unit(row.absent) {
                return Err(HeredityError::InvalidModel(format!(
                    "trait row for {} copies has an entry outside [0, 1]",
                    count
                )));
            }
            let sum = row.expressed + row.absent;
            if (sum - 1.0).abs() > TOLERANCE {
                return Err(HeredityError::InvalidModel(format!(
                    "trait row for {} copies sums to {}, expected 1",
                    count, sum
                )));
            }
        }

        if !(0.0..1.0).contains(&self.mutation) {
            return Err(HeredityError::InvalidModel(format!(
                "mutation rate {} is outside [0, 1)",
                self.mutation
            )));
        }
        Ok(())
    }

    /// Unconditional probability of carrying `count` copies.
    pub fn gene_prior(&self, count: GeneCount) -> f64 {
        self.gene[count.index()]
    }

    pub fn trait_given_gene(&self, count: GeneCount, expressed: bool) -> f64 {
        self.trait_given_gene[count.index()].get(expressed)
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation
    }

    /// Probability that a parent carrying `parent` copies passes the variant
    /// allele to a child.
    pub fn transmission(&self, parent: GeneCount) -> f64 {
        match parent {
            GeneCount::Zero => self.mutation,
            GeneCount::One => 0.5,
            GeneCount::Two => 1.0 - self.mutation,
        }
    }

    /// Probability of a child carrying `child` copies given both parents' counts.
    pub fn inheritance(&self, child: GeneCount, mother: GeneCount, father: GeneCount) -> f64 {
        let a = self.transmission(mother);
        let b = self.transmission(father);
        match child {
            GeneCount::Zero => (1.0 - a) * (1.0 - b),
            GeneCount::One => a * (1.0 - b) + (1.0 - a) * b,
            GeneCount::Two => a * b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_default_model_is_valid() -> Result<(), Box<dyn Error>> {
        ProbabilityModel::default().validate()?;
        Ok(())
    }

    #[test]
    fn test_transmission_accounts_for_mutation() {
        let model = ProbabilityModel::default();
        assert_eq!(model.transmission(GeneCount::Zero), 0.01);
        assert_eq!(model.transmission(GeneCount::One), 0.5);
        assert!((model.transmission(GeneCount::Two) - 0.99).abs() < 1e-15);
        assert_eq!(model.mutation_rate(), 0.01);
    }

    #[test]
    fn test_inheritance_sums_to_one_for_every_parent_pair() {
        let model = ProbabilityModel::default();
        for mother in GeneCount::ALL.iter() {
            for father in GeneCount::ALL.iter() {
                let total: f64 = GeneCount::ALL
                    .iter()
                    .map(|child| model.inheritance(*child, *mother, *father))
                    .sum();
                assert!((total - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_rejects_prior_not_summing_to_one() {
        let rows = ProbabilityModel::default().trait_given_gene;
        let err = ProbabilityModel::new([0.5, 0.3, 0.1], rows, 0.01).unwrap_err();
        assert!(matches!(err, HeredityError::InvalidModel(_)));
    }

    #[test]
    fn test_rejects_mutation_of_one() {
        let rows = ProbabilityModel::default().trait_given_gene;
        assert!(ProbabilityModel::new([0.96, 0.03, 0.01], rows, 1.0).is_err());
    }

    #[test]
    fn test_model_from_json() -> Result<(), Box<dyn Error>> {
        let json = r#"{
            "gene": [0.5, 0.25, 0.25],
            "trait": [
                {"true": 0.1, "false": 0.9},
                {"true": 0.5, "false": 0.5},
                {"true": 0.9, "false": 0.1}
            ],
            "mutation": 0.0
        }"#;
        let model = ProbabilityModel::from_reader(json.as_bytes())?;
        assert_eq!(model.gene_prior(GeneCount::Two), 0.25);
        assert_eq!(model.trait_given_gene(GeneCount::Two, true), 0.9);
        assert_eq!(model.transmission(GeneCount::Zero), 0.0);
        Ok(())
    }
}
