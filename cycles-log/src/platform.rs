use std::time::SystemTime;

/// Returns the current SystemTime
#[inline]
pub fn current_system_time() -> SystemTime {
    #[cfg(not(target_family = "wasm"))]
    {
        SystemTime::now()
    }

    #[cfg(target_family = "wasm")]
    {
        let timestamp_in_nanos = ic_cdk::api::time();
        std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_nanos(timestamp_in_nanos)
    }
}

/// Prints to the standard out, or to the replica log when running in a canister.
#[inline]
pub fn print(line: &str) {
    #[cfg(not(target_family = "wasm"))]
    {
        print!("{line}")
    }

    #[cfg(target_family = "wasm")]
    {
        ic_cdk::print(line)
    }
}
