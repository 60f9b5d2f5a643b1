use super::types::{AggregateResult, FetchOutcome, PageFailure, PageOutcome};

/// Folds page outcomes into one `AggregateResult`.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    result: AggregateResult,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, page: &PageOutcome) {
        let summary = &mut self.result.summary;
        summary.total_urls += 1;

        match &page.outcome {
            FetchOutcome::Records(records) if records.is_empty() => summary.empty += 1,
            FetchOutcome::Records(records) => {
                summary.succeeded += 1;
                self.result.records.extend(records.iter().cloned());
            }
            FetchOutcome::Failure(error) => {
                summary.failed += 1;
                self.result.failures.push(PageFailure {
                    url: page.url.clone(),
                    error: error.clone(),
                });
            }
        }
    }

    pub fn finish(self) -> AggregateResult {
        self.result
    }
}

pub fn aggregate(outcomes: &[PageOutcome]) -> AggregateResult {
    let mut aggregator = ResultAggregator::new();
    for outcome in outcomes {
        aggregator.add(outcome);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FetchError, ProductUrl, Summary, VariantRecord};

    fn url(n: usize) -> ProductUrl {
        format!("https://shop.example.com/p/{}", n).parse().unwrap()
    }

    fn outcomes() -> Vec<PageOutcome> {
        vec![
            PageOutcome::records(
                url(1),
                vec![
                    VariantRecord::new("Hybrid", "3H", url(1)),
                    VariantRecord::new("Hybrid", "4H", url(1)),
                ],
            ),
            PageOutcome::records(url(2), Vec::new()),
            PageOutcome::failure(url(3), FetchError::Network("connection refused".into())),
        ]
    }

    #[test]
    fn test_flattens_and_counts() {
        let result = aggregate(&outcomes());

        assert_eq!(result.records.len(), 2);
        assert!(result.records.iter().all(|r| r.url == url(1)));
        assert_eq!(
            result.summary,
            Summary {
                total_urls: 3,
                succeeded: 1,
                empty: 1,
                failed: 1,
            }
        );
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].url, url(3));
    }

    #[test]
    fn test_is_idempotent() {
        let outcomes = outcomes();
        assert_eq!(aggregate(&outcomes), aggregate(&outcomes));
    }

    #[test]
    fn test_empty_input() {
        let result = aggregate(&[]);
        assert_eq!(result, AggregateResult::default());
    }

    #[test]
    fn test_duplicate_records_are_kept() {
        let record = VariantRecord::new("Wedge", "56", url(7));
        let outcomes = vec![
            PageOutcome::records(url(7), vec![record.clone()]),
            PageOutcome::records(url(7), vec![record.clone()]),
        ];

        let result = aggregate(&outcomes);
        assert_eq!(result.records, vec![record.clone(), record]);
        assert_eq!(result.summary.succeeded, 2);
    }
}
