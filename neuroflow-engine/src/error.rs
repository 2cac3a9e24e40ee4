use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A transition was requested while no session is playing
    #[error("cannot transition: no session is playing")]
    NotPlaying,
}
