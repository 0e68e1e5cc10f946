pub use crate::distribution::{GeneDistribution, Marginals, Posterior, TraitDistribution};
pub use crate::error::{HeredityError, Result};
pub use crate::genetics::{GeneCount, ProbabilityModel, TraitRow};
pub use crate::heredity::Heredity;
pub use crate::observable::CsvBuilder;
pub use crate::{Network, Observation, Pedigree, Person};
