use std::{collections::BTreeMap, sync::Arc};

pub const NAME: &str = "app.kubernetes.io/name";
pub const INSTANCE: &str = "app.kubernetes.io/instance";
pub const PART_OF: &str = "app.kubernetes.io/part-of";
pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
pub const COMPONENT: &str = "app.kubernetes.io/component";

pub type Map = BTreeMap<String, String>;

/// An immutable, cheaply cloned label set.
#[derive(Clone, Debug, Eq, Default)]
pub struct Labels(Arc<Map>);

// === Labels ===

impl Labels {
    /// Returns an owned copy of the labels, e.g. to place in an `ObjectMeta`.
    pub fn to_map(&self) -> Map {
        (*self.0).clone()
    }

    /// Returns the subset of labels under the given keys, in key order.
    pub fn select(&self, keys: &[&str]) -> Map {
        keys.iter()
            .filter_map(|k| self.0.get_key_value(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

impl From<Map> for Labels {
    #[inline]
    fn from(labels: Map) -> Self {
        Self(Arc::new(labels))
    }
}

impl AsRef<Map> for Labels {
    #[inline]
    fn as_ref(&self) -> &Map {
        self.0.as_ref()
    }
}

impl<T: AsRef<Map>> std::cmp::PartialEq<T> for Labels {
    #[inline]
    fn eq(&self, t: &T) -> bool {
        self.0.as_ref().eq(t.as_ref())
    }
}

impl std::iter::FromIterator<(String, String)> for Labels {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl std::iter::FromIterator<(&'static str, &'static str)> for Labels {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;

    #[test]
    fn select_subset() {
        let labels = Labels::from_iter(vec![(NAME, "orders"), (PART_OF, "shop"), ("x", "y")]);
        assert_eq!(labels.select(&[NAME]), btreemap! { NAME.to_string() => "orders".to_string() });
        assert_eq!(labels.select(&["missing"]), Map::new());
        assert_eq!(labels.get(PART_OF), Some("shop"));
    }

    #[test]
    fn compares_with_map() {
        let map = btreemap! { NAME.to_string() => "orders".to_string() };
        assert_eq!(Labels::from(map.clone()).as_ref(), &map);
        assert_eq!(Labels::from(map.clone()), Labels::from(map));
    }
}
