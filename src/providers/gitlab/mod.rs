mod branches;
mod cache;
mod client;
mod links;
mod types;

pub use branches::{filter_pipelines, BranchBucket, BranchSelector};
pub use cache::{ProjectCache, Resolution};
pub use client::{GitLabClient, GitLabSettings};
pub use links::attach_pipeline_urls;
pub use types::{GitLabPipeline, GitLabProject, PipelineStatus, ProjectRef};

#[cfg(test)]
pub use types::{GitLabNamespace, GitLabUser};
