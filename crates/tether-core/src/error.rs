use futures::task::SpawnError;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("no executor is entered on this thread")]
    NoExecutor,
    #[error("failed to spawn task: {0}")]
    Spawn(#[from] SpawnError),
    #[error("composition has been disposed")]
    Disposed,
    #[error("executor clock is not manual; time cannot be advanced")]
    ClockNotManual,
}
