/// An optional part of a composition, decided once per invocation.
///
/// A feature that is absent from the claim, or present but disabled, is `Absent` and never
/// produces a resource. There is no way back from `Included` to `Absent`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feature<T> {
    Absent,
    Included(T),
}

// === impl Feature ===

impl<T> Feature<T> {
    #[inline]
    pub fn is_included(&self) -> bool {
        matches!(self, Self::Included(_))
    }

    pub fn as_ref(&self) -> Feature<&T> {
        match self {
            Self::Absent => Feature::Absent,
            Self::Included(t) => Feature::Included(t),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Feature<U> {
        match self {
            Self::Absent => Feature::Absent,
            Self::Included(t) => Feature::Included(f(t)),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Absent => None,
            Self::Included(t) => Some(t),
        }
    }
}

impl<T> Default for Feature<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<Option<T>> for Feature<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(t) => Self::Included(t),
            None => Self::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_stays_absent() {
        let f = Feature::<u32>::Absent.map(|n| n + 1);
        assert_eq!(f, Feature::Absent);
        assert!(!f.is_included());
        assert_eq!(f.into_option(), None);
    }

    #[test]
    fn included_maps_value() {
        let f = Feature::from(Some(1)).map(|n| n * 10);
        assert!(f.is_included());
        assert_eq!(f.as_ref(), Feature::Included(&10));
        assert_eq!(f.into_option(), Some(10));
    }
}
