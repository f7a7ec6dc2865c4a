// Shared infrastructure used by every other module.
// Logger must be first for macro availability
#[macro_use]
pub mod logger;
