//! Prompt context assembled from retrieved sections.

use crate::document::SummaryDocument;
use crate::index::ScoredSection;
use crate::transcription::format_timestamp;

/// A retrieved section, as shown to the user under "Sources".
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSection {
    pub section_index: usize,
    pub start: f64,
    pub end: f64,
    pub title: String,
    pub score: f32,
}

impl SourceSection {
    /// Resolve index hits against the document they were built from.
    pub fn from_hits(doc: &SummaryDocument, hits: &[ScoredSection]) -> Vec<Self> {
        hits.iter()
            .filter_map(|hit| {
                doc.sections.get(hit.section_index).map(|section| Self {
                    section_index: hit.section_index,
                    start: section.start,
                    end: section.end,
                    title: section.title.clone(),
                    score: hit.score,
                })
            })
            .collect()
    }

    /// `HH:MM:SS - HH:MM:SS`
    pub fn time_range(&self) -> String {
        format!("{} - {}", format_timestamp(self.start), format_timestamp(self.end))
    }
}

/// One block per source, in retrieval order, separated by blank lines.
pub fn format_context(doc: &SummaryDocument, sources: &[SourceSection]) -> String {
    sources
        .iter()
        .filter_map(|source| doc.sections.get(source.section_index))
        .map(|section| {
            format!(
                "[From {} to {}]: {}\n{}",
                format_timestamp(section.start),
                format_timestamp(section.end),
                section.title,
                section.summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::sample_document;

    #[test]
    fn test_format_context_follows_ranking() {
        let doc = sample_document();
        let hits = [
            ScoredSection {
                section_index: 1,
                score: 0.9,
            },
            ScoredSection {
                section_index: 0,
                score: 0.4,
            },
        ];
        let sources = SourceSection::from_hits(&doc, &hits);
        let context = format_context(&doc, &sources);

        assert!(context.starts_with("[From 00:01:35 to 00:03:21]: Section\n[00:01:35] Positional"));
        assert!(context.contains("\n\n[From 00:00:00 to 00:01:35]: Word Embeddings\n"));
        assert_eq!(sources[0].time_range(), "00:01:35 - 00:03:21");
    }

    #[test]
    fn test_unknown_hits_ignored() {
        let doc = sample_document();
        let hits = [ScoredSection {
            section_index: 7,
            score: 1.0,
        }];
        assert!(SourceSection::from_hits(&doc, &hits).is_empty());
        assert_eq!(format_context(&doc, &[]), "");
    }
}
