pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("submission rejected: {0} queue is saturated")]
    Rejected(String),

    #[error("{0} lane is shut down")]
    ShutDown(String),

    #[error("worker failed: {0}")]
    Worker(String),

    #[error("worker panicked: {0}")]
    WorkerPanic(String),

    #[error("result handoff broken before delivery")]
    Handoff,

    #[error("thread spawn failed: {0}")]
    Spawn(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn rejected<S: Into<String>>(lane: S) -> Self {
        Error::Rejected(lane.into())
    }

    pub fn shut_down<S: Into<String>>(lane: S) -> Self {
        Error::ShutDown(lane.into())
    }

    pub fn worker<S: Into<String>>(msg: S) -> Self {
        Error::Worker(msg.into())
    }

    pub fn worker_panic<S: Into<String>>(msg: S) -> Self {
        Error::WorkerPanic(msg.into())
    }
}
