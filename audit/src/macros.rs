//! Logging macros.
//!
//! Every macro captures its call site at compile time and defers message
//! formatting until the level filter has passed.
//!
//! ```ignore
//! audit::info!(state.log, "Fetching all owners");
//! audit::warn!(state.log, ctx: &user, "Invalid ID format: {}", raw_id);
//! ```

/// Suffix left on the type name of the marker function defined by `call_site!`.
pub(crate) const CALL_SITE_MARKER: &str = "::__audit_call_site";

/// Build a [`CallSite`](crate::CallSite) for the current location.
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __audit_call_site() {}
        fn __audit_type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::CallSite::new(
            ::std::file!(),
            ::std::line!(),
            __audit_type_name_of(__audit_call_site),
        )
    }};
}

/// Log at an explicit level, optionally attributed with `ctx: identity`.
#[macro_export]
macro_rules! log {
    ($sink:expr, $level:expr, ctx: $ctx:expr, $($arg:tt)+) => {
        $sink.log_ctx(
            $ctx,
            $level,
            $crate::call_site!(),
            ::std::format_args!($($arg)+),
        )
    };
    ($sink:expr, $level:expr, $($arg:tt)+) => {
        $sink.log($level, $crate::call_site!(), ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! debug {
    ($sink:expr, $($rest:tt)+) => {
        $crate::log!($sink, $crate::Level::Debug, $($rest)+)
    };
}

#[macro_export]
macro_rules! info {
    ($sink:expr, $($rest:tt)+) => {
        $crate::log!($sink, $crate::Level::Info, $($rest)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($sink:expr, $($rest:tt)+) => {
        $crate::log!($sink, $crate::Level::Warn, $($rest)+)
    };
}

#[macro_export]
macro_rules! error {
    ($sink:expr, $($rest:tt)+) => {
        $crate::log!($sink, $crate::Level::Error, $($rest)+)
    };
}

/// Log at FATAL and terminate the process.
#[macro_export]
macro_rules! fatal {
    ($sink:expr, ctx: $ctx:expr, $($arg:tt)+) => {
        $sink.fatal_ctx($ctx, $crate::call_site!(), ::std::format_args!($($arg)+))
    };
    ($sink:expr, $($arg:tt)+) => {
        $sink.fatal($crate::call_site!(), ::std::format_args!($($arg)+))
    };
}
