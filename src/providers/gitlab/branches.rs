use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::error::{PipeboardError, Result};

use super::types::GitLabPipeline;

/// A configured branch matcher.
///
/// A selector containing `*` is a wildcard: `*` matches any run of characters
/// (including none) and the pattern must match the whole branch name. Every
/// other character matches itself.
#[derive(Debug, Clone)]
pub enum BranchSelector {
    Literal(String),
    Wildcard { pattern: String, regex: Regex },
}

impl BranchSelector {
    pub fn parse(selector: &str) -> Result<Self> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(PipeboardError::Config(
                "branch selector must not be empty".to_string(),
            ));
        }

        if !selector.contains('*') {
            return Ok(Self::Literal(selector.to_string()));
        }

        let body = selector
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = Regex::new(&format!("^{body}$")).map_err(|e| {
            PipeboardError::Config(format!("invalid branch pattern {selector}: {e}"))
        })?;

        Ok(Self::Wildcard {
            pattern: selector.to_string(),
            regex,
        })
    }

    /// Parse a whitespace-separated selector list, keeping its order.
    pub fn parse_list(selectors: &str) -> Result<Vec<Self>> {
        selectors.split_whitespace().map(Self::parse).collect()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(branch) => branch,
            Self::Wildcard { pattern, .. } => pattern,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard { .. })
    }

    pub fn matches(&self, branch: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == branch,
            Self::Wildcard { regex, .. } => regex.is_match(branch),
        }
    }
}

impl PartialEq for BranchSelector {
    fn eq(&self, other: &Self) -> bool {
        self.is_wildcard() == other.is_wildcard() && self.as_str() == other.as_str()
    }
}

impl Eq for BranchSelector {}

impl fmt::Display for BranchSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipelines of one branch, in the order the API returned them (newest first).
///
/// `label` is the selector itself for literal selectors and the matched branch
/// name for wildcard selectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchBucket {
    #[serde(rename = "branch")]
    pub label: String,
    pub pipelines: Vec<GitLabPipeline>,
}

/// Partition pipelines into branch buckets sorted by label.
///
/// Each literal selector yields a bucket even when nothing matched it. A
/// pipeline goes to the first selector, in configured order, that matches its
/// ref; pipelines no selector matches are dropped.
pub fn filter_pipelines<I>(pipelines: I, selectors: &[BranchSelector]) -> Vec<BranchBucket>
where
    I: IntoIterator<Item = GitLabPipeline>,
{
    let mut buckets: BTreeMap<String, Vec<GitLabPipeline>> = selectors
        .iter()
        .filter_map(|selector| match selector {
            BranchSelector::Literal(branch) => Some((branch.clone(), Vec::new())),
            BranchSelector::Wildcard { .. } => None,
        })
        .collect();

    for pipeline in pipelines {
        let Some(selector) = selectors.iter().find(|s| s.matches(&pipeline.ref_)) else {
            continue;
        };

        let label = match selector {
            BranchSelector::Literal(branch) => branch.clone(),
            BranchSelector::Wildcard { .. } => pipeline.ref_.clone(),
        };

        buckets.entry(label).or_default().push(pipeline);
    }

    buckets
        .into_iter()
        .map(|(label, pipelines)| BranchBucket { label, pipelines })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::gitlab::types::PipelineStatus;

    fn pipeline(id: i64, branch: &str, status: PipelineStatus) -> GitLabPipeline {
        GitLabPipeline {
            id,
            status,
            ref_: branch.to_string(),
            created_at: None,
            updated_at: None,
            started_at: None,
            finished_at: None,
            duration: None,
            user: None,
            web_url: None,
        }
    }

    fn selectors(list: &str) -> Vec<BranchSelector> {
        BranchSelector::parse_list(list).unwrap()
    }

    fn labels(buckets: &[BranchBucket]) -> Vec<&str> {
        buckets.iter().map(|b| b.label.as_str()).collect()
    }

    #[test]
    fn test_parse_selectors() {
        let parsed = selectors("master  dev\tfeatures/*");
        assert_eq!(parsed.len(), 3);
        assert!(!parsed[0].is_wildcard());
        assert!(parsed[2].is_wildcard());
        assert_eq!(parsed[2].as_str(), "features/*");
    }

    #[test]
    fn test_parse_empty_selector_fails() {
        let err = BranchSelector::parse("  ").unwrap_err();
        assert!(matches!(err, PipeboardError::Config(_)));
    }

    #[test]
    fn test_wildcard_is_anchored() {
        let selector = BranchSelector::parse("features/*").unwrap();
        assert!(selector.matches("features/x"));
        assert!(selector.matches("features/"));
        assert!(selector.matches("features/a/b"));
        assert!(!selector.matches("my-features/x"));
        assert!(!selector.matches("features"));
    }

    #[test]
    fn test_wildcard_escapes_other_characters() {
        let selector = BranchSelector::parse("release-1.*").unwrap();
        assert!(selector.matches("release-1.2"));
        assert!(!selector.matches("release-1x2"));

        let selector = BranchSelector::parse("*-hotfix").unwrap();
        assert!(selector.matches("v2-hotfix"));
        assert!(!selector.matches("v2-hotfix-2"));
    }

    #[test]
    fn test_literal_is_exact() {
        let selector = BranchSelector::parse("master").unwrap();
        assert!(selector.matches("master"));
        assert!(!selector.matches("master2"));
        assert!(!selector.matches("Master"));
    }

    #[test]
    fn test_master_and_features_scenario() {
        let pipelines = vec![
            pipeline(1, "master", PipelineStatus::Success),
            pipeline(2, "features/x", PipelineStatus::Failed),
            pipeline(3, "dev", PipelineStatus::Running),
        ];

        let buckets = filter_pipelines(pipelines, &selectors("master features/*"));

        assert_eq!(labels(&buckets), vec!["features/x", "master"]);
        assert_eq!(buckets[0].pipelines.len(), 1);
        assert_eq!(buckets[0].pipelines[0].status, PipelineStatus::Failed);
        assert_eq!(buckets[1].pipelines.len(), 1);
        assert_eq!(buckets[1].pipelines[0].status, PipelineStatus::Success);
    }

    #[test]
    fn test_literal_selector_yields_empty_bucket() {
        let pipelines = vec![pipeline(1, "features/x", PipelineStatus::Success)];

        let buckets = filter_pipelines(pipelines, &selectors("master develop"));

        assert_eq!(labels(&buckets), vec!["develop", "master"]);
        assert!(buckets.iter().all(|b| b.pipelines.is_empty()));
    }

    #[test]
    fn test_wildcard_without_matches_yields_no_bucket() {
        let buckets = filter_pipelines(Vec::new(), &selectors("features/*"));
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_wildcard_yields_one_bucket_per_branch() {
        let pipelines = vec![
            pipeline(5, "features/b", PipelineStatus::Running),
            pipeline(4, "features/a", PipelineStatus::Success),
            pipeline(3, "features/b", PipelineStatus::Failed),
        ];

        let buckets = filter_pipelines(pipelines, &selectors("features/*"));

        assert_eq!(labels(&buckets), vec!["features/a", "features/b"]);
        let ids: Vec<i64> = buckets[1].pipelines.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 3]);
    }

    #[test]
    fn test_first_matching_selector_wins() {
        let pipelines = vec![pipeline(1, "features/x", PipelineStatus::Success)];

        // Literal first: the pipeline lands in the literal bucket.
        let buckets = filter_pipelines(pipelines.clone(), &selectors("features/x features/*"));
        assert_eq!(labels(&buckets), vec!["features/x"]);
        assert_eq!(buckets[0].pipelines.len(), 1);

        // Overlapping wildcards: the first one claims it, nothing is duplicated.
        let buckets = filter_pipelines(pipelines, &selectors("features/* *"));
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].pipelines.len(), 1);
    }

    #[test]
    fn test_pipeline_lands_in_at_most_one_bucket() {
        let branches = ["master", "dev", "features/x", "features/y", "fix/z", ""];
        let pipelines: Vec<GitLabPipeline> = branches
            .iter()
            .enumerate()
            .map(|(i, b)| pipeline(i as i64, b, PipelineStatus::Success))
            .collect();
        let selector_lists = ["master", "features/* master", "* master", "dev fix/* features/x", ""];

        for list in selector_lists {
            let parsed = selectors(list);
            let buckets = filter_pipelines(pipelines.clone(), &parsed);

            for p in &pipelines {
                let occurrences = buckets
                    .iter()
                    .flat_map(|b| &b.pipelines)
                    .filter(|q| q.id == p.id)
                    .count();
                let expected = usize::from(parsed.iter().any(|s| s.matches(&p.ref_)));
                assert_eq!(occurrences, expected, "branch {:?} with {:?}", p.ref_, list);
            }
        }
    }
}
