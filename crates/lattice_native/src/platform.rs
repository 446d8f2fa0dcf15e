//! Platform descriptor and canonicalization tables.
//!
//! Vendor platform strings vary wildly; matching works on a closed
//! canonical vocabulary. The tables are pure constants: canonicalization
//! never consults process-wide mutable state.

use lattice_core::Version;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generic alias matching any canonical windows variant
pub const WINDOWS_ALIAS: &str = "win32";

/// The canonical windows family, closed set
pub const WINDOWS_FAMILY: &[&str] = &[
    "windows95",
    "windows98",
    "windowsnt",
    "windows2000",
    "windowsxp",
    "windowsce",
    "windowsvista",
];

/// Windows needle → canonical name, probed in order after the `win` prefix
static WINDOWS_NEEDLES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("32", WINDOWS_ALIAS),
        ("*", WINDOWS_ALIAS),
        ("95", "windows95"),
        ("98", "windows98"),
        ("nt", "windowsnt"),
        ("2000", "windows2000"),
        ("xp", "windowsxp"),
        ("ce", "windowsce"),
        ("vista", "windowsvista"),
    ]
});

/// Non-windows OS-name prefix → canonical name
static OS_PREFIXES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("linux", "linux"),
        ("aix", "aix"),
        ("digitalunix", "digitalunix"),
        ("hpux", "hpux"),
        ("irix", "irix"),
        ("macos", "macos"),
        ("mac os", "macos"),
        ("netware", "netware"),
        ("openbsd", "openbsd"),
        ("netbsd", "netbsd"),
        ("os2", "os2"),
        ("os/2", "os2"),
        ("qnx", "qnx"),
        ("procnto", "qnx"),
        ("solaris", "solaris"),
        ("sunos", "sunos"),
        ("vxworks", "vxworks"),
    ]
});

/// Processor-name prefix → canonical family, probed in order
static PROCESSOR_PREFIXES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("x86-64", "x86-64"),
        ("x86_64", "x86-64"),
        ("amd64", "x86-64"),
        ("x86", "x86"),
        ("pentium", "x86"),
        ("i386", "x86"),
        ("i486", "x86"),
        ("i586", "x86"),
        ("i686", "x86"),
        ("68k", "68k"),
        ("arm", "arm"),
        ("alpha", "alpha"),
        ("ignite", "ignite"),
        ("psc1k", "ignite"),
        ("mips", "mips"),
        ("parisc", "parisc"),
        ("powerpc", "powerpc"),
        ("power", "powerpc"),
        ("ppc", "powerpc"),
        ("sparc", "sparc"),
    ]
});

/// Canonicalize an OS name
#[must_use]
pub fn normalize_os_name(value: &str) -> String {
    let value = value.trim().to_lowercase();
    if value.starts_with("win") {
        for (needle, canonical) in WINDOWS_NEEDLES.iter() {
            if value.contains(needle) {
                return (*canonical).to_string();
            }
        }
        return "win".to_string();
    }
    for (prefix, canonical) in OS_PREFIXES.iter() {
        if value.starts_with(prefix) {
            return (*canonical).to_string();
        }
    }
    value
}

/// Canonicalize a processor name to its family
#[must_use]
pub fn normalize_processor(value: &str) -> String {
    let value = value.trim().to_lowercase();
    for (prefix, canonical) in PROCESSOR_PREFIXES.iter() {
        if value.starts_with(prefix) {
            return (*canonical).to_string();
        }
    }
    value
}

/// Re-normalize an OS version to plain `major.minor.micro`
///
/// Lenient by design: anything unparsable collapses to `0.0.0`, and a
/// qualifier is dropped. OS version strings come from the environment,
/// not the manifest, so they never hard-fail a parse.
#[must_use]
pub fn normalize_os_version(value: &str) -> String {
    match Version::parse(value) {
        Ok(v) => Version::new(v.major, v.minor, v.micro).to_string(),
        Err(_) => Version::default().to_string(),
    }
}

/// The running platform, in canonical vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Canonical OS name
    pub os_name: String,
    /// Canonical processor family
    pub processor: String,
    /// Normalized OS version
    pub os_version: Version,
    /// Language code (e.g. `en`)
    pub language: String,
    /// Extra properties visible to selection filters
    pub extra: BTreeMap<String, String>,
}

impl Platform {
    /// Build a platform descriptor from raw vendor strings
    #[must_use]
    pub fn new(os_name: &str, processor: &str, os_version: &str, language: &str) -> Self {
        let os_version = Version::parse(&normalize_os_version(os_version))
            .unwrap_or_default();
        Self {
            os_name: normalize_os_name(os_name),
            processor: normalize_processor(processor),
            os_version,
            language: language.trim().to_lowercase(),
            extra: BTreeMap::new(),
        }
    }

    /// Add a property visible to selection filters
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether the canonical OS name is a windows variant
    #[must_use]
    pub fn is_windows(&self) -> bool {
        WINDOWS_FAMILY.contains(&self.os_name.as_str()) || self.os_name == WINDOWS_ALIAS
    }

    /// Full property set for selection-filter evaluation
    #[must_use]
    pub fn properties(&self) -> BTreeMap<String, String> {
        let mut props = self.extra.clone();
        props.insert("osname".to_string(), self.os_name.clone());
        props.insert("processor".to_string(), self.processor.clone());
        props.insert("osversion".to_string(), self.os_version.to_string());
        props.insert("language".to_string(), self.language.clone());
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_canonicalization() {
        assert_eq!(normalize_os_name("Windows XP"), "windowsxp");
        assert_eq!(normalize_os_name("WinNT"), "windowsnt");
        assert_eq!(normalize_os_name("Win32"), "win32");
        assert_eq!(normalize_os_name("Windows Vista"), "windowsvista");
    }

    #[test]
    fn test_unix_canonicalization() {
        assert_eq!(normalize_os_name("Linux"), "linux");
        assert_eq!(normalize_os_name("Mac OS X"), "macos");
        assert_eq!(normalize_os_name("SunOS"), "sunos");
        assert_eq!(normalize_os_name("procnto"), "qnx");
        // Unknown names pass through lowercased.
        assert_eq!(normalize_os_name("Plan9"), "plan9");
    }

    #[test]
    fn test_processor_families() {
        assert_eq!(normalize_processor("x86_64"), "x86-64");
        assert_eq!(normalize_processor("amd64"), "x86-64");
        assert_eq!(normalize_processor("i686"), "x86");
        assert_eq!(normalize_processor("Pentium III"), "x86");
        assert_eq!(normalize_processor("armv7l"), "arm");
        assert_eq!(normalize_processor("ppc64le"), "powerpc");
    }

    #[test]
    fn test_os_version_normalization() {
        assert_eq!(normalize_os_version("5.15"), "5.15.0");
        assert_eq!(normalize_os_version("5.15.2-generic"), "5.15.2");
        assert_eq!(normalize_os_version("mystery"), "0.0.0");
    }

    #[test]
    fn test_platform_properties() {
        let platform = Platform::new("Linux", "x86_64", "5.15.0", "en")
            .with_property("windowing", "wayland");
        let props = platform.properties();
        assert_eq!(props.get("osname").map(String::as_str), Some("linux"));
        assert_eq!(props.get("processor").map(String::as_str), Some("x86-64"));
        assert_eq!(props.get("osversion").map(String::as_str), Some("5.15.0"));
        assert_eq!(props.get("windowing").map(String::as_str), Some("wayland"));
        assert!(!platform.is_windows());
    }

    #[test]
    fn test_windows_platform_flag() {
        assert!(Platform::new("Windows 2000", "x86", "5.0", "en").is_windows());
    }
}
