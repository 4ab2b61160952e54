/// Publishing — splits composed text into posts and hands them to a sink.
///
/// The real social-network client never materialized (the original bot
/// was still waiting on API approval), so the shipped sinks are stdout
/// and an inert counter.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Split composed text into postable segments: one per non-empty line.
pub fn split_posts(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.trim().is_empty()).collect()
}

/// A destination for composed formulas.
pub trait Publisher {
    fn publish(&mut self, text: &str) -> Result<(), PublishError>;
}

/// Prints each post to stdout.
#[derive(Debug, Default)]
pub struct StdoutPublisher;

impl Publisher for StdoutPublisher {
    fn publish(&mut self, text: &str) -> Result<(), PublishError> {
        for post in split_posts(text) {
            println!("{}", post);
        }
        Ok(())
    }
}

/// Accepts posts and does nothing with them, counting what it would
/// have sent.
#[derive(Debug, Default)]
pub struct InertPublisher {
    pub posts_accepted: usize,
}

impl Publisher for InertPublisher {
    fn publish(&mut self, text: &str) -> Result<(), PublishError> {
        let posts = split_posts(text);
        self.posts_accepted += posts.len();
        log::info!("inert publisher swallowed {} posts", posts.len());
        Ok(())
    }
}
