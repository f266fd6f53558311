//! # nc2clm-calendar
//!
//! Maps the days of a Gregorian source year onto the fixed 365-band annual
//! record of a CLM file.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["year"] -->|"is_leap_year()"| B["365 | 366 source days"]
//!     C["variable name"] -->|"VariableKind::from_name()"| D["Precipitation | Other"]
//!     B --> E["day_mapping()"]
//!     D --> E
//!     E --> F["DaySlot: Band | Fold | Drop"]
//!     E -->|"DayPlan::new()"| G["slots for a whole year"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use nc2clm_calendar::{DayPlan, DaySlot, VariableKind};
//!
//! let plan = DayPlan::new(2000, VariableKind::from_name("tas"));
//! assert_eq!(plan.source_days(), 366);
//! assert_eq!(plan.slot(59), DaySlot::Fold);
//! assert_eq!(plan.slot(60), DaySlot::Band(59));
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `band` | Band layout constants of the 365-day record |
//! | `leap` | Gregorian leap-year rule |
//! | `kind` | Precipitation-family detection |
//! | `mapping` | Source day to output band mapping |
//! | `plan` | Per-year precomputed mapping |
//! | `error` | Error types |

mod band;
mod error;
mod kind;
mod leap;
mod mapping;
mod plan;

pub use band::{BANDS_PER_YEAR, FOLD_BANDS, LEAP_DAY_INDEX};
pub use error::CalendarError;
pub use kind::{PRECIPITATION_VARIABLES, VariableKind};
pub use leap::{is_leap_year, year_length};
pub use mapping::{DaySlot, day_mapping};
pub use plan::DayPlan;
