//! Values the backend may or may not have pre-computed.

/// Either a value supplied by the backend or a marker that it must be
/// derived locally.
#[derive(Debug, Clone, PartialEq)]
pub enum Provided<T> {
    Provided(T),
    ComputeLocally,
}

impl<T> Provided<T> {
    /// Use the supplied value, or run the local computation.
    pub fn or_compute<F>(self, compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self {
            Provided::Provided(value) => value,
            Provided::ComputeLocally => compute(),
        }
    }

    pub fn is_provided(&self) -> bool {
        matches!(self, Provided::Provided(_))
    }
}

impl<T> From<Option<T>> for Provided<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Provided::Provided(v),
            None => Provided::ComputeLocally,
        }
    }
}

impl<T> Provided<Vec<T>> {
    /// Treat an empty list as "not provided".
    pub fn non_empty(self) -> Self {
        match self {
            Provided::Provided(v) if v.is_empty() => Provided::ComputeLocally,
            other => other,
        }
    }
}
