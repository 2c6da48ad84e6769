use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const SHAPED_CODES: &[&str] = &[
    "TR013", "TR014", "TR015", "TR018", "TR019", "TR020", "TR022", "TR024", "TR026", "TR027",
    "TR033", "TR034", "TR038", "TR039", "TR040", "TR042", "TR045", "TR046", "TR049", "TR052",
    "TR055", "TR056", "TR058", "TR059", "TR060", "TR061", "TR062", "TR063", "TR064", "TR065",
    "TR066", "TR067", "TR068", "TR069", "TR070", "TR072", "TR073", "TR074", "TR075", "TR076",
    "TR077", "TR078", "TR079", "TR080", "TR081", "TR083", "TR084", "TR086", "TR089", "TR090",
    "TR091", "TR093", "TR096", "TR098", "TR099", "TR100", "TR101", "TR102", "TR103", "TR104",
    "TR105",
];

const HIGH_CODES: &[&str] = &[
    "TR001", "TR002", "TR003", "TR004", "TR005", "TR008", "TR011", "TR016", "TR023", "TR025",
    "TR029", "TR031", "TR037", "TR043", "TR047", "TR048", "TR053", "TR054", "TR057", "TR071",
    "TR082", "TR085", "TR087", "TR088", "TR092", "TR094", "TR095", "TR097",
];

const LOW_CODES: &[&str] = &["TR007", "TR009", "TR010"];

/// Which of the three die code sets a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DieClass {
    Shaped,
    High,
    Low,
}

/// Immutable die code sets. Loaded once at startup and shared by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DieCatalog {
    shaped: HashSet<String>,
    high: HashSet<String>,
    low: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    forma: Vec<String>,
    alto: Vec<String>,
    bajo: Vec<String>,
}

impl DieCatalog {
    /// The code sets the production models were trained with.
    pub fn standard() -> Self {
        let owned = |codes: &[&str]| codes.iter().map(|code| code.to_string()).collect();
        Self {
            shaped: owned(SHAPED_CODES),
            high: owned(HIGH_CODES),
            low: owned(LOW_CODES),
        }
    }

    pub fn new<I, S>(shaped: I, high: I, low: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let collect = |codes: I| codes.into_iter().map(Into::into).collect::<HashSet<String>>();
        let catalog = Self {
            shaped: collect(shaped),
            high: collect(high),
            low: collect(low),
        };
        catalog.ensure_disjoint()?;
        Ok(catalog)
    }

    /// Reads `{"forma": [...], "alto": [...], "bajo": [...]}`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&raw)?;
        Self::new(file.forma, file.alto, file.bajo)
    }

    pub fn classify(&self, code: &str) -> Option<DieClass> {
        if self.shaped.contains(code) {
            Some(DieClass::Shaped)
        } else if self.high.contains(code) {
            Some(DieClass::High)
        } else if self.low.contains(code) {
            Some(DieClass::Low)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.shaped.len() + self.high.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_disjoint(&self) -> Result<(), CatalogError> {
        let overlap = self
            .shaped
            .intersection(&self.high)
            .chain(self.shaped.intersection(&self.low))
            .chain(self.high.intersection(&self.low))
            .min();
        match overlap {
            Some(code) => Err(CatalogError::Overlap(code.clone())),
            None => Ok(()),
        }
    }
}

impl Default for DieCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read die catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid die catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("die code {0} appears in more than one grade")]
    Overlap(String),
}
