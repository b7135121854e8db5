// Naming rules a dashboard collection must satisfy before it can be synced.
// A dashboard named like a folder would map onto the same path as that folder.
use super::dashboard_set::DashboardSet;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cannot have a dashboard with the same name as the folder it is in ({})", filename.display())]
    NameMatchesOwnFolder { filename: PathBuf },

    #[error("cannot have a dashboard with the same name as a folder ({title})")]
    NameMatchesFolder { title: String },
}

/// Check every dashboard against every folder title in the collection.
/// Returns the first violation found.
pub fn validate_dashboards(dashboards: &DashboardSet) -> Result<(), ValidationError> {
    let mut folder_titles = HashSet::new();
    for dashboard in dashboards {
        if dashboard.title == dashboard.folder_title {
            return Err(ValidationError::NameMatchesOwnFolder {
                filename: dashboard.filename.clone(),
            });
        }
        folder_titles.insert(dashboard.folder_title.as_str());
    }

    for dashboard in dashboards {
        if folder_titles.contains(dashboard.title.as_str()) {
            return Err(ValidationError::NameMatchesFolder {
                title: dashboard.title.clone(),
            });
        }
    }

    Ok(())
}
