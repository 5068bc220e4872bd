//! Logging hooks for the decode stages.
//!
//! With the `tracing` feature the macros forward to `tracing` at debug level
//! (warn for rejected tensors). Without it they expand to nothing, so call
//! sites never need `#[cfg]`.

#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::debug_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::DisabledSpan
    };
}

/// Stage summary with `key = value` counts.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($stage:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::debug!(stage = $stage, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($stage:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)+) => {
        tracing::warn!($($arg)+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)+) => {};
}

pub(crate) use trace_event;
pub(crate) use trace_span;
pub(crate) use trace_warn;

/// Stand-in for `tracing::Span` when the feature is off.
#[cfg(not(feature = "tracing"))]
pub(crate) struct DisabledSpan;

#[cfg(not(feature = "tracing"))]
impl DisabledSpan {
    #[inline]
    pub(crate) fn entered(self) -> Self {
        self
    }
}
