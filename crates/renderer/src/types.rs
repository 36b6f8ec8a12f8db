use std::fmt;

/// Whether frames are drawn to a back buffer and swapped, or shown directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferMode {
    /// Draw into the visible surface; the render loop never swaps.
    Single,
    /// Draw into a back buffer and swap once per frame.
    #[default]
    Double,
}

impl BufferMode {
    /// Interprets the command-line buffering flag: a leading `d` selects
    /// double buffering, anything else (including an empty string) selects
    /// single buffering.
    pub fn from_flag(flag: &str) -> Self {
        if flag.starts_with('d') {
            BufferMode::Double
        } else {
            BufferMode::Single
        }
    }

    pub fn is_double(self) -> bool {
        matches!(self, BufferMode::Double)
    }

    /// Surface images in flight for this mode.
    pub(crate) fn frame_latency(self) -> u32 {
        match self {
            BufferMode::Single => 1,
            BufferMode::Double => 2,
        }
    }
}

impl fmt::Display for BufferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferMode::Single => f.write_str("single"),
            BufferMode::Double => f.write_str("double"),
        }
    }
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Window and texture size in physical pixels.
    pub surface_size: (u32, u32),
    /// Buffering requested on the command line.
    pub buffer_mode: BufferMode,
    /// Window title.
    pub title: String,
}

impl RendererConfig {
    pub fn new(width: u32, height: u32, buffer_mode: BufferMode) -> Self {
        Self {
            surface_size: (width, height),
            buffer_mode,
            ..Self::default()
        }
    }
}

impl Default for RendererConfig {
    /// 640x480 double-buffered, the typical video playback case.
    fn default() -> Self {
        Self {
            surface_size: (640, 480),
            buffer_mode: BufferMode::Double,
            title: "flipbook".to_string(),
        }
    }
}

/// Vendor, renderer, and driver strings of the adapter backing the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSummary {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
}

impl AdapterSummary {
    pub fn from_wgpu(info: &wgpu::AdapterInfo) -> Self {
        Self::from_parts(
            info.vendor,
            &info.name,
            &info.driver,
            &info.driver_info,
            info.backend,
        )
    }

    pub(crate) fn from_parts(
        vendor_id: u32,
        name: &str,
        driver: &str,
        driver_info: &str,
        backend: wgpu::Backend,
    ) -> Self {
        let vendor = match vendor_name(vendor_id) {
            Some(known) => format!("{known} (0x{vendor_id:04x})"),
            None => format!("0x{vendor_id:04x}"),
        };

        let mut version = String::new();
        for part in [driver.trim(), driver_info.trim()] {
            if part.is_empty() {
                continue;
            }
            if !version.is_empty() {
                version.push(' ');
            }
            version.push_str(part);
        }
        if version.is_empty() {
            version.push_str("unknown");
        }
        version.push_str(&format!(" [{backend:?}]"));

        Self {
            vendor,
            renderer: name.to_string(),
            version,
        }
    }
}

impl fmt::Display for AdapterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GPU Vendor = {}", self.vendor)?;
        writeln!(f, "GPU Renderer = {}", self.renderer)?;
        write!(f, "GPU Version = {}", self.version)
    }
}

/// Well-known PCI (and Khronos) vendor ids.
pub fn vendor_name(id: u32) -> Option<&'static str> {
    match id {
        0x1002 | 0x1022 => Some("AMD"),
        0x10de => Some("NVIDIA"),
        0x8086 => Some("Intel"),
        0x13b5 => Some("ARM"),
        0x5143 => Some("Qualcomm"),
        0x1010 => Some("Imagination Technologies"),
        0x106b => Some("Apple"),
        0x15ad => Some("VMware"),
        0x1414 => Some("Microsoft"),
        0x10005 => Some("Mesa"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_flag_uses_first_character() {
        assert_eq!(BufferMode::from_flag("d"), BufferMode::Double);
        assert_eq!(BufferMode::from_flag("double"), BufferMode::Double);
        assert_eq!(BufferMode::from_flag("s"), BufferMode::Single);
        assert_eq!(BufferMode::from_flag("D"), BufferMode::Single);
        assert_eq!(BufferMode::from_flag(""), BufferMode::Single);
        assert_eq!(BufferMode::from_flag("xd"), BufferMode::Single);
    }

    #[test]
    fn known_vendors_resolve() {
        assert_eq!(vendor_name(0x10de), Some("NVIDIA"));
        assert_eq!(vendor_name(0x8086), Some("Intel"));
        assert_eq!(vendor_name(0xdead), None);
    }

    #[test]
    fn adapter_summary_joins_driver_strings() {
        let summary = AdapterSummary::from_parts(
            0x1002,
            "Test GPU",
            "radv",
            "Mesa 24.0.1",
            wgpu::Backend::Vulkan,
        );
        assert_eq!(summary.vendor, "AMD (0x1002)");
        assert_eq!(summary.renderer, "Test GPU");
        assert_eq!(summary.version, "radv Mesa 24.0.1 [Vulkan]");

        let printed = summary.to_string();
        assert!(printed.starts_with("GPU Vendor = AMD"));
        assert!(printed.contains("\nGPU Renderer = Test GPU\n"));
    }

    #[test]
    fn adapter_summary_handles_missing_driver() {
        let summary = AdapterSummary::from_parts(0x0, "llvmpipe", "", " ", wgpu::Backend::Gl);
        assert_eq!(summary.vendor, "0x0000");
        assert_eq!(summary.version, "unknown [Gl]");
    }
}
