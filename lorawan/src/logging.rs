//! Log macro selection.
//!
//! `defmt` builds log through the defmt macros, every other build goes
//! through the `log` facade so host tests can install any logger.

#[cfg(feature = "defmt")]
#[allow(unused_imports)]
pub(crate) use defmt::{debug, error, info, trace, warn};

#[cfg(not(feature = "defmt"))]
#[allow(unused_imports)]
pub(crate) use log::{debug, error, info, trace, warn};
