// Logging under the `loadcontrol` target. Without the `tracing` feature every call compiles to
// nothing, arguments included.

macro_rules! lclog {
    ($level:ident, $($tt:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::$level!(target: "loadcontrol", $($tt)*);
        }
    };
}

macro_rules! lctrace {
    ($($tt:tt)*) => {
        lclog!(trace, $($tt)*)
    };
}

macro_rules! lcdebug {
    ($($tt:tt)*) => {
        lclog!(debug, $($tt)*)
    };
}

macro_rules! lcwarn {
    ($($tt:tt)*) => {
        lclog!(warn, $($tt)*)
    };
}
