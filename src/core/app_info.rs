//! Application-level settings used to bootstrap a Vulkan instance and device.

/// Application settings used to initialize a [`Device`](crate::core::device::Device).
///
/// Janus assumes a single, headless, graphics-capable queue: there is no window
/// interface, no surface format/present mode, and no per-queue requirements to
/// negotiate.
#[derive(Debug, Clone, Default)]
pub struct AppInfo {
    /// Application name. Possibly displayed in debugging tools, task manager, etc.
    pub name: String,
    /// Application version.
    pub version: (u32, u32, u32),
    /// Enable Vulkan validation layers for additional debug output. For developing this should almost always be on.
    pub enable_validation: bool,
}

/// Convenience builder for [`AppInfo`].
/// # Example
/// ```
/// # use janus::core::app_info::DeviceBuilder;
/// let info = DeviceBuilder::new()
///     .name("My janus application")
///     .validation(true)
///     .build();
/// ```
#[derive(Default)]
pub struct DeviceBuilder {
    inner: AppInfo,
}

impl DeviceBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        DeviceBuilder::default()
    }

    /// Sets the application name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = name.into();
        self
    }

    /// Sets the application version.
    pub fn version(mut self, ver: (u32, u32, u32)) -> Self {
        self.inner.version = ver;
        self
    }

    /// Enable the Vulkan validation layers.
    pub fn validation(mut self, val: bool) -> Self {
        self.inner.enable_validation = val;
        self
    }

    /// Build the resulting application settings.
    pub fn build(self) -> AppInfo {
        self.inner
    }
}
