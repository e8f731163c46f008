//! Machine-scheduling engine: from a start moment and a number of working
//! hours to a completion timestamp, honouring shifts, breaks and Sundays.

pub mod available;
pub mod breaks;
pub mod calendar;
pub mod locator;
pub mod projector;
pub mod walker;

pub use calendar::{CalendarSnapshot, PlannerSettings};
pub use projector::{
    CalendarSource, PlanProjection, ProjectionKind, ProjectionOutcome, Projector,
    project_completion,
};
