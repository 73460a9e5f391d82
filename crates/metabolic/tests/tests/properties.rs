#[path = "property/ticks.rs"]
mod ticks;

#[path = "property/safety.rs"]
mod safety;

#[path = "property/routing.rs"]
mod routing;

#[path = "property/drift.rs"]
mod drift;

#[path = "property/governance.rs"]
mod governance;
