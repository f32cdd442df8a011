//! Output sink trait

/// Destination for bytes received from the device.
///
/// Called from the background receive thread with exactly the bytes one
/// completed read produced, never a fixed-size padded buffer. Implementors
/// use interior mutability; the trait takes `&self` so one sink can be
/// shared across reconnects.
pub trait ByteSink: Send + Sync {
    fn deliver(&self, bytes: &[u8]);
}

/// Any `Fn(&[u8])` closure works as a sink.
impl<F> ByteSink for F
where
    F: Fn(&[u8]) + Send + Sync,
{
    fn deliver(&self, bytes: &[u8]) {
        self(bytes)
    }
}
