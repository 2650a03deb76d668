//! Response framing errors

/// Errors raised while framing a response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// Fewer than the two status bytes were received
    #[error("Incomplete response: missing status word")]
    Incomplete,
}
