//! Pages shown as tabs: the dashboard (always tab 1) and one investigation
//! per opened session.

pub mod dashboard;
pub mod investigation;
