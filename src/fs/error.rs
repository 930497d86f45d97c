//! Errno mapping at the host boundary.

use std::fmt;

use crate::provider::ProviderError;

/// POSIX errno surfaced to the host filesystem bridge.
///
/// The facade produces `NOENT` (not found, including unknown handles),
/// `INVAL` (readlink on a non-link), and `IO` (provider failures). `NOSYS`
/// is reserved for operations the facade does not offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Errno(i32);

impl Errno {
    pub const NOENT: Errno = Errno(libc::ENOENT);
    pub const INVAL: Errno = Errno(libc::EINVAL);
    pub const IO: Errno = Errno(libc::EIO);
    pub const NOSYS: Errno = Errno(libc::ENOSYS);

    /// The raw errno value.
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", std::io::Error::from_raw_os_error(self.0))
    }
}

impl From<ProviderError> for Errno {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound => Errno::NOENT,
            _ => Errno::IO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_mapping() {
        assert_eq!(Errno::from(ProviderError::NotFound), Errno::NOENT);
        assert_eq!(
            Errno::from(ProviderError::Other("boom".to_string())),
            Errno::IO
        );
    }
}
