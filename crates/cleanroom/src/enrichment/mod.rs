//! Enrichment of missing values through an external text generator.

mod enricher;
mod parser;

pub use enricher::{Enricher, EnrichmentLog, EnrichmentOutcome};
pub use parser::{parse_table, ParsedTable};
