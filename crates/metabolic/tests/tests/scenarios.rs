#[path = "scenarios/governance.rs"]
mod governance;

#[path = "scenarios/emergence.rs"]
mod emergence;

#[path = "scenarios/routing.rs"]
mod routing;

#[path = "scenarios/drift.rs"]
mod drift;
