pub mod device_finder;
pub mod permissions;
pub mod single_instance;

pub use device_finder::DeviceFinder;

// Макросы условного логирования для горячих путей
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}
