//! Input document loading
//!
//! The harness benchmarks every strategy against a single document. A
//! document can be loaded from a file, or the embedded sample — a paragraph
//! with technical terms, anaphoric references, numeric data, and several
//! topics, chosen so the strategies have linguistic features to disagree on.

use anyhow::{Context, Result};
use std::path::Path;

/// Embedded sample document used when no `--document` is given.
pub const SAMPLE_DOCUMENT: &str = "Berlin is the capital and largest city of Germany, both by area and by population. \
Its more than 3.85 million inhabitants make it the European Union's most populous city, \
as measured by population within city limits. The city is also one of the states of Germany, \
and is the third smallest state in the country in terms of area. \
Berlin is surrounded by the state of Brandenburg and contiguous with Potsdam, Brandenburg's capital. \
The city has a temperate oceanic climate with warm summers and cold winters. \
Average temperatures range from -1\u{b0}C in winter to 24\u{b0}C in summer. \
Annual precipitation is approximately 570mm, distributed fairly evenly throughout the year. \
Its economy is based on high-tech firms and the service sector, encompassing a diverse range of \
creative industries, research facilities, media corporations and convention venues. \
The city is a major technology hub and startup ecosystem in Europe. \
Notable companies headquartered in Berlin include Zalando, HelloFresh, and N26. \
The unemployment rate stood at 8.6% in 2022, slightly above the German average. \
It is a world city of culture, politics, media and science. \
The city has a thriving arts scene with over 175 museums, including the Pergamon Museum, \
the Bode Museum, and the Neues Museum on Museum Island. \
Berlin hosts three UNESCO World Heritage Sites: Museum Island, Palaces and Parks of Potsdam and Berlin, \
and the Berlin Modernism Housing Estates. \
The city's universities and research institutions are renowned internationally. \
The Humboldt University of Berlin, founded in 1810, has educated 29 Nobel Prize winners. \
Other major institutions include the Free University of Berlin, Technical University of Berlin, \
and the Berlin University of the Arts. \
Approximately 200,000 students are enrolled in Berlin's higher education institutions. \
Berlin's transportation infrastructure is highly developed. The Berlin U-Bahn and S-Bahn \
comprise 473 stations serving over 1.5 billion passengers annually. \
The city is also a major rail hub with connections to all major European cities. \
Berlin Brandenburg Airport, opened in 2020, handles approximately 24 million passengers per year. \
The city's cultural diversity is reflected in its demographics. \
Approximately 35% of Berlin's residents have an immigrant background, representing over 190 nations. \
The largest immigrant communities are from Turkey, Poland, Russia, and Syria. \
This diversity has created a vibrant multicultural atmosphere with diverse cuisine, festivals, and neighborhoods.";

/// Load the document to benchmark: a file if a path was given, the embedded
/// sample otherwise.
pub fn load_document(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display())),
        None => Ok(SAMPLE_DOCUMENT.to_string()),
    }
}

/// Character/word/sentence counts shown in the run header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStats {
    pub chars: usize,
    pub words: usize,
    pub sentences: usize,
}

/// Compute display statistics for a document.
pub fn stats(document: &str) -> DocumentStats {
    let sentences = document
        .split_terminator(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    DocumentStats {
        chars: document.chars().count(),
        words: document.split_whitespace().count(),
        sentences,
    }
}
