//! Project parameters: typed values, raw input sanitization, and file loading

mod data;
mod input;
pub mod loader;

pub use data::{Party, ProjectParameters, Split, YearMonth};
pub use input::{leading_float, leading_int, NumericInput, RawParameters, MAX_CONTRACT_MONTHS};
pub use loader::{
    load_overrides, load_overrides_or_default, load_parameters, write_overrides, write_parameters,
    ParamsFileError,
};
