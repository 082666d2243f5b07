use std::sync::Arc;

/// Runs `create` inside out-of-memory and validation error scopes.
///
/// wgpu returns a handle even when creation fails and reports the failure
/// out of band; here it comes back as the `Err`.
pub fn capture_errors<T>(
    device: &wgpu::Device,
    create: impl FnOnce() -> T,
) -> Result<T, wgpu::Error> {
    let out_of_memory = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = create();

    // Scopes pop innermost first.
    let validation = pollster::block_on(validation.pop());
    let out_of_memory = pollster::block_on(out_of_memory.pop());

    match validation.or(out_of_memory) {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

/// Logs errors raised outside any scope instead of panicking.
pub(crate) fn log_uncaptured_errors(device: &wgpu::Device) {
    device.on_uncaptured_error(Arc::new(|err: wgpu::Error| {
        log::error!("uncaptured wgpu error: {err}");
    }));
}
