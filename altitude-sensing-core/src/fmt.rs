#![macro_use]
#![allow(unused_macros)]

// Routes a message to `log` when that feature is on, to `defmt` otherwise.
// With neither backend the arguments are still evaluated by reference so
// callers don't trip unused-variable lints.
macro_rules! log_at {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::$level!($s $(, $x)*);

            #[cfg(all(feature = "defmt", not(feature = "log")))]
            ::defmt::$level!($s $(, $x)*);

            #[cfg(not(any(feature = "log", feature = "defmt")))]
            {
                $(let _ = &$x;)*
            }
        }
    };
}

macro_rules! log_trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_at!(trace, $s $(, $x)*)
    };
}

macro_rules! log_debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_at!(debug, $s $(, $x)*)
    };
}

macro_rules! log_info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_at!(info, $s $(, $x)*)
    };
}

macro_rules! log_warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_at!(warn, $s $(, $x)*)
    };
}
