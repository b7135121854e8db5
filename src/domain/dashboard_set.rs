// Dashboard collection keyed by UID
use super::dashboard::Dashboard;
use std::collections::BTreeMap;

/// At most one dashboard per UID. Iterates in UID order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSet {
    dashboards: BTreeMap<String, Dashboard>,
}

impl DashboardSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dashboard, returning the record it replaced if the UID was already present
    pub fn add(&mut self, dashboard: Dashboard) -> Option<Dashboard> {
        self.dashboards.insert(dashboard.uid.clone(), dashboard)
    }

    pub fn get(&self, uid: &str) -> Option<&Dashboard> {
        self.dashboards.get(uid)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.dashboards.contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.dashboards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dashboards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dashboard> {
        self.dashboards.values()
    }

    #[cfg(test)]
    pub fn uids(&self) -> impl Iterator<Item = &str> {
        self.dashboards.keys().map(String::as_str)
    }

    /// Every dashboard in `self` whose UID is absent from `other`
    pub fn difference(&self, other: &DashboardSet) -> DashboardSet {
        self.iter()
            .filter(|d| !other.contains(&d.uid))
            .cloned()
            .collect()
    }
}

impl FromIterator<Dashboard> for DashboardSet {
    fn from_iter<I: IntoIterator<Item = Dashboard>>(iter: I) -> Self {
        let mut set = DashboardSet::new();
        for dashboard in iter {
            set.add(dashboard);
        }
        set
    }
}

impl<'a> IntoIterator for &'a DashboardSet {
    type Item = &'a Dashboard;
    type IntoIter = std::collections::btree_map::Values<'a, String, Dashboard>;

    fn into_iter(self) -> Self::IntoIter {
        self.dashboards.values()
    }
}
