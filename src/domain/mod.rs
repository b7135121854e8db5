// Domain layer - Dashboard identity, collections and naming rules
pub mod dashboard;
pub mod dashboard_set;
pub mod validation;
