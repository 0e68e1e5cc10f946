use crate::prelude::*;
use std::collections::VecDeque;
use std::io::Read;
use std::path::Path;

/// Positions of the pedigree columns in a record.
#[derive(Clone, Copy)]
struct Columns {
    name: usize,
    mother: usize,
    father: usize,
    trait_: usize,
}

/// Produces Observations from delimited pedigree records
///
/// `Csv` implements Iterator so it can be passed
/// directly to `Pedigree::observe()`
pub struct Csv {
    records: csv::StringRecordsIntoIter<Box<dyn Read>>,
    columns: Columns,
    observation_buffer: VecDeque<Observation>,
}

impl Csv {
    fn new(records: csv::StringRecordsIntoIter<Box<dyn Read>>, columns: Columns) -> Self {
        Self {
            records,
            columns,
            observation_buffer: VecDeque::new(),
        }
    }

    fn observations(&self, row: &csv::StringRecord) -> Result<Vec<Observation>> {
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let cell = |idx: usize, column: &str| {
            row.get(idx).ok_or_else(|| HeredityError::MalformedRecord {
                line,
                reason: format!("missing '{}' field", column),
            })
        };

        let name = cell(self.columns.name, "name")?;
        if name.is_empty() {
            return Err(HeredityError::MalformedRecord {
                line,
                reason: "empty name".to_string(),
            });
        }

        let mut observations = vec![Observation::Individual(name.into())];
        let mother = cell(self.columns.mother, "mother")?;
        if !mother.is_empty() {
            observations.push(Observation::Mother(name.into(), mother.into()));
        }
        let father = cell(self.columns.father, "father")?;
        if !father.is_empty() {
            observations.push(Observation::Father(name.into(), father.into()));
        }
        match cell(self.columns.trait_, "trait")? {
            "" => {}
            "1" => observations.push(Observation::Trait(name.into(), true)),
            "0" => observations.push(Observation::Trait(name.into(), false)),
            other => {
                return Err(HeredityError::MalformedRecord {
                    line,
                    reason: format!("trait must be 0, 1 or empty, got '{}'", other),
                })
            }
        }
        Ok(observations)
    }
}

impl Iterator for Csv {
    type Item = Result<Observation>;

    fn next(&mut self) -> Option<Result<Observation>> {
        if self.observation_buffer.is_empty() {
            let row = match self.records.next()? {
                Ok(row) => row,
                Err(err) => return Some(Err(err.into())),
            };
            match self.observations(&row) {
                Ok(observations) => self.observation_buffer = observations.into(),
                Err(err) => return Some(Err(err)),
            }
        }

        self.observation_buffer.pop_front().map(Ok)
    }
}

pub struct CsvBuilder {
    delimiter: u8,
    name_field: String,
    mother_field: String,
    father_field: String,
    trait_field: String,
}

impl Default for CsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvBuilder {
    /// Construct a new Csv builder expecting `name,mother,father,trait` columns
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            name_field: "name".to_owned(),
            mother_field: "mother".to_owned(),
            father_field: "father".to_owned(),
            trait_field: "trait".to_owned(),
        }
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn name_field(&mut self, name_field: &str) -> &mut Self {
        self.name_field = name_field.to_owned();
        self
    }

    pub fn mother_field(&mut self, mother_field: &str) -> &mut Self {
        self.mother_field = mother_field.to_owned();
        self
    }

    pub fn father_field(&mut self, father_field: &str) -> &mut Self {
        self.father_field = father_field.to_owned();
        self
    }

    pub fn trait_field(&mut self, trait_field: &str) -> &mut Self {
        self.trait_field = trait_field.to_owned();
        self
    }

    /// Reads the header row and locates every required column.
    pub fn from_reader(&self, reader: Box<dyn Read>) -> Result<Csv> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let position = |field: &str| {
            headers
                .iter()
                .position(|h| h == field)
                .ok_or_else(|| HeredityError::MalformedRecord {
                    line: 1,
                    reason: format!("missing '{}' column", field),
                })
        };
        let columns = Columns {
            name: position(&self.name_field)?,
            mother: position(&self.mother_field)?,
            father: position(&self.father_field)?,
            trait_: position(&self.trait_field)?,
        };

        Ok(Csv::new(rdr.into_records(), columns))
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Csv> {
        let file = std::fs::File::open(path)?;
        self.from_reader(Box::new(std::io::BufReader::new(file)))
    }
}

impl Pedigree {
    /// Reads a pedigree from a `name,mother,father,trait` CSV file.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut pedigree = Self::new();
        pedigree.observe(CsvBuilder::new().from_path(path)?)?;
        Ok(pedigree)
    }
}
