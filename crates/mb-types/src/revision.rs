use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Settlement revision number.
///
/// Revisions for a key form a gap-free sequence starting at 1. The counter
/// is bounded; [`Revision::next`] returns `None` at the maximum instead of
/// wrapping. Revision 0 does not exist: "nothing filed yet" is represented
/// by `Option<Revision>::None` on the effective pointer, and 0 appears only
/// in wire encodings of that absence.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Revision(u16);

impl Revision {
    /// The first revision of any settlement key.
    pub const FIRST: Revision = Revision(1);

    /// Largest representable revision. `next()` refuses to go past this.
    pub const MAX: Revision = Revision(u16::MAX);

    /// Wrap a raw revision number; `None` for 0.
    pub fn new(n: u16) -> Option<Self> {
        (n != 0).then_some(Self(n))
    }

    /// The raw revision number (always >= 1).
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// The successor revision, or `None` if this is [`Revision::MAX`].
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl TryFrom<u16> for Revision {
    type Error = TypeError;

    fn try_from(n: u16) -> Result<Self, Self::Error> {
        Revision::new(n).ok_or(TypeError::ZeroRevision)
    }
}

impl From<Revision> for u16 {
    fn from(r: Revision) -> u16 {
        r.0
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Revision({})", self.0)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_revision() {
        assert_eq!(Revision::new(0), None);
        assert!(Revision::try_from(0u16).is_err());
    }

    #[test]
    fn first_is_one() {
        assert_eq!(Revision::FIRST.get(), 1);
        assert_eq!(Revision::new(1), Some(Revision::FIRST));
    }

    #[test]
    fn next_increments() {
        let r = Revision::FIRST;
        assert_eq!(r.next(), Revision::new(2));
    }

    #[test]
    fn next_refuses_to_wrap_at_max() {
        assert_eq!(Revision::MAX.next(), None);
        let just_below = Revision::new(u16::MAX - 1).unwrap();
        assert_eq!(just_below.next(), Some(Revision::MAX));
    }

    #[test]
    fn serde_rejects_zero() {
        assert!(serde_json::from_str::<Revision>("0").is_err());
        let r: Revision = serde_json::from_str("2").unwrap();
        assert_eq!(r.get(), 2);
    }

    #[test]
    fn serde_is_a_bare_number() {
        assert_eq!(serde_json::to_string(&Revision::FIRST).unwrap(), "1");
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", Revision::new(3).unwrap()), "r3");
    }
}
