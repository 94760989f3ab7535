use crate::config::{Config, GenerationConfig, IdentityConfig};
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{write_blob, write_commit, write_tree};
use crate::repo::Repo;
use crate::types::{Blob, Commit, Identity, Tree};

/// a validated description of the chain to generate
#[derive(Clone, Debug)]
pub struct ChainPlan {
    identity: IdentityConfig,
    generation: GenerationConfig,
    step: usize,
}

impl ChainPlan {
    pub fn new(identity: IdentityConfig, generation: GenerationConfig) -> Result<Self> {
        if generation.step == 0 {
            return Err(Error::InvalidGeneration("step must be positive".to_string()));
        }
        let step = usize::try_from(generation.step).map_err(|_| {
            Error::InvalidGeneration(format!("step {} is too large", generation.step))
        })?;
        Ok(Self {
            identity,
            generation,
            step,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.identity.clone(), config.generation.clone())
    }

    pub fn identity(&self) -> &IdentityConfig {
        &self.identity
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    /// commit timestamps: start, start + step, ... while below end
    pub fn timestamps(&self) -> impl Iterator<Item = i64> {
        (self.generation.start..self.generation.end).step_by(self.step)
    }

    /// number of commits this plan produces
    pub fn commit_count(&self) -> u64 {
        let span = i128::from(self.generation.end) - i128::from(self.generation.start);
        if span <= 0 {
            return 0;
        }
        let step = i128::from(self.generation.step);
        ((span + step - 1) / step) as u64
    }

    /// whether progress should be reported after this commit
    pub fn should_report(&self, index: u64) -> bool {
        let interval = self.generation.progress_interval;
        interval > 0 && index % interval == 0
    }

    fn render(template: &str, index: u64, timestamp: i64) -> String {
        template
            .replace("{index}", &index.to_string())
            .replace("{timestamp}", &timestamp.to_string())
    }

    /// the blob, tree and commit for one position in the chain
    pub fn link(&self, index: u64, timestamp: i64, parent: Option<Hash>) -> ChainLink {
        let blob = Blob::new(Self::render(&self.generation.content_template, index, timestamp));
        let message = Self::render(&self.generation.message_template, index, timestamp);
        let who = self.identity.at(timestamp);
        ChainLink {
            blob,
            file_name: self.generation.file_name.clone(),
            file_mode: self.generation.file_mode,
            parent,
            author: who.clone(),
            committer: who,
            message,
        }
    }
}

/// unencoded objects for one commit of the chain
#[derive(Clone, Debug)]
pub struct ChainLink {
    pub blob: Blob,
    pub file_name: String,
    pub file_mode: u32,
    pub parent: Option<Hash>,
    pub author: Identity,
    pub committer: Identity,
    pub message: String,
}

impl ChainLink {
    /// write blob, tree and commit in that order, returning the commit hash
    pub fn write(self, repo: &Repo) -> Result<Hash> {
        let blob_hash = write_blob(repo, &self.blob)?;

        let mut tree = Tree::empty();
        tree.add_blob(self.file_name, self.file_mode, blob_hash);
        let tree_hash = write_tree(repo, &tree)?;

        let commit = Commit::new(
            tree_hash,
            self.parent,
            self.author,
            self.committer,
            self.message,
        );
        write_commit(repo, &commit)
    }
}

/// outcome of a generation run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// newest commit, none when the plan was empty
    pub head: Option<Hash>,
    /// commits written
    pub commits: u64,
}

/// write the whole chain, calling `on_commit(index, hash)` after every commit
///
/// the previous head is threaded through as the fold accumulator and becomes
/// the parent of the next commit. the first commit has no parent.
pub fn generate<F>(repo: &Repo, plan: &ChainPlan, mut on_commit: F) -> Result<GenerateReport>
where
    F: FnMut(u64, &Hash),
{
    tracing::info!(
        start = plan.generation.start,
        end = plan.generation.end,
        step = plan.generation.step,
        commits = plan.commit_count(),
        "generating commit chain"
    );

    let report = plan.timestamps().enumerate().try_fold(
        GenerateReport::default(),
        |report, (index, timestamp)| -> Result<GenerateReport> {
            let index = index as u64;
            let hash = plan.link(index, timestamp, report.head).write(repo)?;
            on_commit(index, &hash);
            Ok(GenerateReport {
                head: Some(hash),
                commits: report.commits + 1,
            })
        },
    )?;

    tracing::info!(commits = report.commits, head = ?report.head, "commit chain complete");
    Ok(report)
}
