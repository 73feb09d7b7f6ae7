//! Cross-crate integration scenarios.

pub mod concurrency;
pub mod delivery_pipeline;
pub mod request_reply;

#[cfg(test)]
pub(crate) mod support {
    use std::sync::Once;
    use std::time::Duration;
    use viaduct_telemetry::{init_telemetry, TelemetryConfig};

    static INIT: Once = Once::new();

    /// Install the test subscriber once per process; later calls no-op.
    pub fn init_tracing() {
        INIT.call_once(|| {
            let _ = init_telemetry(&TelemetryConfig::from_env());
        });
    }

    /// Poll `ready` for up to two seconds.
    pub fn wait_until(mut ready: impl FnMut() -> bool) -> bool {
        for _ in 0..400 {
            if ready() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }
}
