//! Either `tracing` or no-op stand-ins with the same call syntax.
//!
//! Import logging macros from here rather than from `tracing` so that call sites need no `#[cfg]`.
//! `#[instrument]` is the exception and is written as
//! `#[cfg_attr(feature = "tracing", tracing::instrument)]`.

#![allow(unused_imports, unused_macros, dead_code)]

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, debug_span, error, info, warn};
#[cfg(feature = "tracing")]
pub(crate) use tracing_futures::Instrument;

#[cfg(not(feature = "tracing"))]
macro_rules! event {
    ($($x:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! event_span {
    ($($x:tt)*) => {
        ()
    };
}

#[cfg(not(feature = "tracing"))]
pub(crate) use {
    event as debug, event as error, event as info, event as warn, event_span as debug_span,
};

#[cfg(not(feature = "tracing"))]
pub(crate) trait Instrument: Sized {
    fn instrument(self, span: ()) -> Self {
        self
    }
}

#[cfg(not(feature = "tracing"))]
impl<T> Instrument for T {}
