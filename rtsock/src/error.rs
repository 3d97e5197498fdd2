use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("privileged call {call} failed: {source}")]
    QueryFailure {
        call: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("record at offset {offset} needs {needed} bytes, only {available} declared")]
    RecordOverrun {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("unknown address family {family}")]
    UnknownAddressFamily { family: u8 },

    #[error("delete request seq {seq} rejected: {reason}")]
    DeleteRejected { seq: i32, reason: String },

    #[error(transparent)]
    Codec(#[from] bincode::Error),
}

impl RouteError {
    pub fn query(call: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::QueryFailure { call, source }
    }

    /// Fatal errors end the run; the others only affect one address or route.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::UnknownAddressFamily { .. } | Self::DeleteRejected { .. }
        )
    }
}
