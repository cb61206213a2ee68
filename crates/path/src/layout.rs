//! Selection of the host path layout.
//!
//! The host stores a path as a `Path` object whose first machine word points to an
//! `SkPathRef`. The fields of the `SkPathRef` moved around between platform releases.
//! Each known arrangement is described by a static [`LayoutDescriptor`] and exactly one
//! of them is selected per process.
//!
//! [`LayoutDescriptor`]: struct.LayoutDescriptor.html

use crate::memory::PointerWidth;
use crate::{Error, Result};

use once_cell::sync::OnceCell;

use core::fmt;

/// The physical order of the verb array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum VerbDirection {
    /// Verbs are stored in path order, the verb pointer addresses the first verb.
    Forward,
    /// Verbs are stored in reverse path order and the verb pointer addresses one past
    /// the first verb of the path. Points and weights are still stored in path order.
    Backward,
}

/// The known `SkPathRef` arrangements, named after the first API level using them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    PathRef21,
    PathRef24,
    PathRef26,
    PathRef30,
    PathRef34,
}

/// Where to find the path data inside the host objects.
///
/// All offsets are in bytes from the start of the `SkPathRef`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayoutDescriptor {
    pub kind: LayoutKind,
    /// First API level using this layout.
    pub min_api_level: u32,
    pub pointer_width: PointerWidth,
    pub direction: VerbDirection,
    /// Offset of the `SkPathRef` pointer in the `Path` object.
    pub path_ref_offset: usize,
    pub points_offset: usize,
    pub point_count_offset: usize,
    pub verbs_offset: usize,
    pub verb_count_offset: usize,
    pub weights_offset: usize,
    pub weight_count_offset: usize,
    /// Size of the `SkPathRef`, padding included.
    pub size: usize,
}

/// The newest API level whose path layout is known.
pub const MAX_KNOWN_API_LEVEL: u32 = 36;

/// The oldest supported API level.
pub const MIN_KNOWN_API_LEVEL: u32 = 21;

macro_rules! layout {
    (
        $kind:ident, $level:expr, $width:ident, $direction:ident,
        points: $points:expr, point_count: $point_count:expr,
        verbs: $verbs:expr, verb_count: $verb_count:expr,
        weights: $weights:expr, weight_count: $weight_count:expr,
        size: $size:expr
    ) => {
        LayoutDescriptor {
            kind: LayoutKind::$kind,
            min_api_level: $level,
            pointer_width: PointerWidth::$width,
            direction: VerbDirection::$direction,
            path_ref_offset: 0,
            points_offset: $points,
            point_count_offset: $point_count,
            verbs_offset: $verbs,
            verb_count_offset: $verb_count,
            weights_offset: $weights,
            weight_count_offset: $weight_count,
            size: $size,
        }
    };
}

/// Layouts of 64-bit hosts, oldest first.
pub static LAYOUTS_64: [LayoutDescriptor; 5] = [
    layout!(PathRef21, 21, Bits64, Backward,
        points: 32, point_count: 52, verbs: 40, verb_count: 48,
        weights: 64, weight_count: 76, size: 88),
    layout!(PathRef24, 24, Bits64, Backward,
        points: 32, point_count: 52, verbs: 40, verb_count: 48,
        weights: 64, weight_count: 76, size: 88),
    layout!(PathRef26, 26, Bits64, Backward,
        points: 24, point_count: 44, verbs: 32, verb_count: 40,
        weights: 56, weight_count: 68, size: 80),
    layout!(PathRef30, 30, Bits64, Forward,
        points: 24, point_count: 36, verbs: 40, verb_count: 52,
        weights: 56, weight_count: 68, size: 80),
    layout!(PathRef34, 34, Bits64, Forward,
        points: 56, point_count: 64, verbs: 80, verb_count: 88,
        weights: 104, weight_count: 112, size: 128),
];

/// Layouts of 32-bit hosts, oldest first.
pub static LAYOUTS_32: [LayoutDescriptor; 5] = [
    layout!(PathRef21, 21, Bits32, Backward,
        points: 28, point_count: 40, verbs: 32, verb_count: 36,
        weights: 48, weight_count: 56, size: 64),
    layout!(PathRef24, 24, Bits32, Backward,
        points: 24, point_count: 36, verbs: 28, verb_count: 32,
        weights: 44, weight_count: 52, size: 60),
    layout!(PathRef26, 26, Bits32, Backward,
        points: 20, point_count: 32, verbs: 24, verb_count: 28,
        weights: 40, weight_count: 48, size: 56),
    layout!(PathRef30, 30, Bits32, Forward,
        points: 20, point_count: 28, verbs: 32, verb_count: 40,
        weights: 44, weight_count: 52, size: 60),
    layout!(PathRef34, 34, Bits32, Forward,
        points: 52, point_count: 56, verbs: 68, verb_count: 72,
        weights: 88, weight_count: 92, size: 104),
];

impl LayoutDescriptor {
    /// The layouts known for a given pointer width, oldest first.
    pub fn all(pointer_width: PointerWidth) -> &'static [LayoutDescriptor] {
        match pointer_width {
            PointerWidth::Bits32 => &LAYOUTS_32,
            PointerWidth::Bits64 => &LAYOUTS_64,
        }
    }

    /// Selects the layout used by a host running the given API level.
    ///
    /// Levels older than the first known layout and levels newer than the last
    /// verified one are rejected rather than mapped to a neighbouring layout.
    pub fn for_version(
        api_level: u32,
        pointer_width: PointerWidth,
    ) -> Result<&'static LayoutDescriptor> {
        if api_level < MIN_KNOWN_API_LEVEL || api_level > MAX_KNOWN_API_LEVEL {
            return Err(Error::UnsupportedLayout {
                version: api_level.to_string(),
            });
        }

        LayoutDescriptor::all(pointer_width)
            .iter()
            .rev()
            .find(|layout| layout.min_api_level <= api_level)
            .ok_or(Error::UnsupportedLayout {
                version: api_level.to_string(),
            })
    }
}

/// Preview builds report the API level of the previous release together with the
/// codename of the upcoming one.
const PREVIEW_CODENAMES: &[(&str, u32)] = &[
    ("Tiramisu", 33),
    ("UpsideDownCake", 34),
    ("VanillaIceCream", 35),
    ("Baklava", 36),
];

/// Codename reported by release builds.
pub const RELEASE_CODENAME: &str = "REL";

/// Reads the raw version information of the host.
///
/// The binding layer implements this on top of the system properties
/// (`ro.build.version.sdk` and `ro.build.version.codename`).
pub trait VersionSource {
    fn sdk_version(&self) -> Option<String>;

    fn codename(&self) -> Option<String> {
        None
    }
}

/// A version source returning fixed values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedVersion {
    pub sdk_version: Option<String>,
    pub codename: Option<String>,
}

impl FixedVersion {
    pub fn release(api_level: u32) -> Self {
        FixedVersion {
            sdk_version: Some(api_level.to_string()),
            codename: Some(RELEASE_CODENAME.to_string()),
        }
    }

    pub fn preview(api_level: u32, codename: &str) -> Self {
        FixedVersion {
            sdk_version: Some(api_level.to_string()),
            codename: Some(codename.to_string()),
        }
    }

    pub fn unknown() -> Self {
        FixedVersion::default()
    }
}

impl VersionSource for FixedVersion {
    fn sdk_version(&self) -> Option<String> {
        self.sdk_version.clone()
    }

    fn codename(&self) -> Option<String> {
        self.codename.clone()
    }
}

impl<'l, V: VersionSource + ?Sized> VersionSource for &'l V {
    fn sdk_version(&self) -> Option<String> {
        (**self).sdk_version()
    }

    fn codename(&self) -> Option<String> {
        (**self).codename()
    }
}

/// The effective API level of the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HostVersion {
    pub api_level: u32,
    pub preview: bool,
}

impl HostVersion {
    pub fn from_release(api_level: u32) -> Self {
        HostVersion {
            api_level,
            preview: false,
        }
    }

    /// Reads the version from a source, mapping preview codenames to the API level
    /// they will ship as.
    pub fn detect(source: &dyn VersionSource) -> Result<HostVersion> {
        if let Some(codename) = source.codename() {
            let codename = codename.trim();
            if !codename.is_empty() && codename != RELEASE_CODENAME {
                return match PREVIEW_CODENAMES.iter().find(|(name, _)| *name == codename) {
                    Some(&(_, api_level)) => Ok(HostVersion {
                        api_level,
                        preview: true,
                    }),
                    None => Err(Error::UnsupportedLayout {
                        version: codename.to_string(),
                    }),
                };
            }
        }

        let sdk_version = source.sdk_version().ok_or(Error::UnsupportedLayout {
            version: "unknown".to_string(),
        })?;

        match sdk_version.trim().parse::<u32>() {
            Ok(api_level) => Ok(HostVersion::from_release(api_level)),
            Err(_) => Err(Error::UnsupportedLayout {
                version: sdk_version,
            }),
        }
    }

    pub fn layout(&self, pointer_width: PointerWidth) -> Result<&'static LayoutDescriptor> {
        LayoutDescriptor::for_version(self.api_level, pointer_width)
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.preview {
            write!(f, "{} (preview)", self.api_level)
        } else {
            write!(f, "{}", self.api_level)
        }
    }
}

fn resolve_layout(
    source: &dyn VersionSource,
    pointer_width: PointerWidth,
) -> Result<&'static LayoutDescriptor> {
    let resolved = HostVersion::detect(source).and_then(|version| {
        let layout = version.layout(pointer_width)?;
        log::debug!(
            "Host version {} uses path layout {:?} ({:?} verbs, {:?}).",
            version,
            layout.kind,
            layout.direction,
            pointer_width,
        );

        Ok(layout)
    });

    if let Err(error) = &resolved {
        log::warn!("Unable to resolve the host path layout: {}", error);
    }

    resolved
}

/// Resolves the host layout once and caches the outcome.
///
/// Concurrent first calls to [`resolve`](#method.resolve) block until one of them has
/// finished the detection and then all observe the same result.
pub struct LayoutResolver<V> {
    source: V,
    pointer_width: PointerWidth,
    layout: OnceCell<Result<&'static LayoutDescriptor>>,
}

impl<V: VersionSource> LayoutResolver<V> {
    pub fn new(source: V) -> Self {
        LayoutResolver::with_pointer_width(source, PointerWidth::NATIVE)
    }

    pub fn with_pointer_width(source: V, pointer_width: PointerWidth) -> Self {
        LayoutResolver {
            source,
            pointer_width,
            layout: OnceCell::new(),
        }
    }

    pub fn resolve(&self) -> Result<&'static LayoutDescriptor> {
        self.layout
            .get_or_init(|| resolve_layout(&self.source, self.pointer_width))
            .clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.layout.get().is_some()
    }

    pub fn pointer_width(&self) -> PointerWidth {
        self.pointer_width
    }
}

impl<V> fmt::Debug for LayoutResolver<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LayoutResolver")
            .field("pointer_width", &self.pointer_width)
            .field("layout", &self.layout.get())
            .finish()
    }
}

static PROCESS_LAYOUT: OnceCell<Result<&'static LayoutDescriptor>> = OnceCell::new();

/// Resolves the layout of the host running in the current process.
///
/// Only the source passed to the first call is consulted; later calls return the
/// cached result.
pub fn resolve(source: &dyn VersionSource) -> Result<&'static LayoutDescriptor> {
    PROCESS_LAYOUT
        .get_or_init(|| resolve_layout(source, PointerWidth::NATIVE))
        .clone()
}

#[test]
fn selects_layouts_by_api_level() {
    let expected = [
        (21, LayoutKind::PathRef21, VerbDirection::Backward),
        (23, LayoutKind::PathRef21, VerbDirection::Backward),
        (24, LayoutKind::PathRef24, VerbDirection::Backward),
        (25, LayoutKind::PathRef24, VerbDirection::Backward),
        (26, LayoutKind::PathRef26, VerbDirection::Backward),
        (29, LayoutKind::PathRef26, VerbDirection::Backward),
        (30, LayoutKind::PathRef30, VerbDirection::Forward),
        (33, LayoutKind::PathRef30, VerbDirection::Forward),
        (34, LayoutKind::PathRef34, VerbDirection::Forward),
        (36, LayoutKind::PathRef34, VerbDirection::Forward),
    ];

    for &width in &[PointerWidth::Bits32, PointerWidth::Bits64] {
        for &(level, kind, direction) in &expected {
            let layout = LayoutDescriptor::for_version(level, width).unwrap();
            assert_eq!(layout.kind, kind, "level {}", level);
            assert_eq!(layout.direction, direction, "level {}", level);
            assert_eq!(layout.pointer_width, width);
        }
    }
}

#[test]
fn unknown_api_levels_are_rejected() {
    for &level in &[0, 19, 20, 37, 100] {
        assert_eq!(
            LayoutDescriptor::for_version(level, PointerWidth::Bits64),
            Err(Error::UnsupportedLayout {
                version: level.to_string()
            }),
        );
    }
}

#[test]
fn layouts_fields_fit_in_the_struct() {
    for &width in &[PointerWidth::Bits32, PointerWidth::Bits64] {
        let ptr = width.size();
        for layout in LayoutDescriptor::all(width) {
            for &(offset, size) in &[
                (layout.points_offset, ptr),
                (layout.verbs_offset, ptr),
                (layout.weights_offset, ptr),
                (layout.point_count_offset, 4),
                (layout.verb_count_offset, 4),
                (layout.weight_count_offset, 4),
            ] {
                assert!(offset + size <= layout.size, "{:?}", layout);
                assert_eq!(offset % size, 0, "{:?}", layout);
            }
        }
    }
}

#[test]
fn detect_release_and_preview_versions() {
    assert_eq!(
        HostVersion::detect(&FixedVersion::release(29)),
        Ok(HostVersion::from_release(29))
    );
    assert_eq!(
        HostVersion::detect(&FixedVersion::preview(33, "UpsideDownCake")),
        Ok(HostVersion {
            api_level: 34,
            preview: true
        })
    );
    assert_eq!(
        HostVersion::detect(&FixedVersion {
            sdk_version: Some(" 26\n".to_string()),
            codename: None,
        }),
        Ok(HostVersion::from_release(26))
    );
    assert_eq!(
        HostVersion::detect(&FixedVersion::preview(36, "Unnamed")),
        Err(Error::UnsupportedLayout {
            version: "Unnamed".to_string()
        })
    );
    assert!(HostVersion::detect(&FixedVersion::unknown()).is_err());
    assert!(HostVersion::detect(&FixedVersion::release(0)).is_ok());
    assert!(HostVersion::detect(&FixedVersion {
        sdk_version: Some("S".to_string()),
        codename: Some(RELEASE_CODENAME.to_string()),
    })
    .is_err());
}

#[test]
fn resolver_caches_its_result() {
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<u32>,
    }

    impl VersionSource for CountingSource {
        fn sdk_version(&self) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            Some("30".to_string())
        }
    }

    let resolver = LayoutResolver::with_pointer_width(
        CountingSource {
            calls: Cell::new(0),
        },
        PointerWidth::Bits32,
    );
    assert!(!resolver.is_resolved());

    let first = resolver.resolve().unwrap();
    let second = resolver.resolve().unwrap();

    assert!(core::ptr::eq(first, second));
    assert_eq!(first.kind, LayoutKind::PathRef30);
    assert_eq!(first.pointer_width, PointerWidth::Bits32);
    assert_eq!(resolver.source.calls.get(), 1);
}

#[test]
fn concurrent_first_resolutions_detect_once() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::time::Duration;

    const THREADS: usize = 8;

    struct SlowSource {
        calls: AtomicUsize,
    }

    impl VersionSource for SlowSource {
        fn sdk_version(&self) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            Some("26".to_string())
        }
    }

    let resolver = LayoutResolver::with_pointer_width(
        SlowSource {
            calls: AtomicUsize::new(0),
        },
        PointerWidth::Bits64,
    );
    let barrier = Barrier::new(THREADS);

    let layouts: Vec<&'static LayoutDescriptor> = std::thread::scope(|scope| {
        let threads: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    resolver.resolve().unwrap()
                })
            })
            .collect();

        threads.into_iter().map(|t| t.join().unwrap()).collect()
    });

    assert_eq!(resolver.source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(layouts.len(), THREADS);
    for layout in &layouts {
        assert!(core::ptr::eq(*layout, layouts[0]));
    }
    assert_eq!(layouts[0].kind, LayoutKind::PathRef26);
}

#[test]
fn resolver_remembers_failures() {
    let resolver = LayoutResolver::new(FixedVersion::release(17));

    assert!(resolver.resolve().is_err());
    assert_eq!(resolver.resolve(), resolver.resolve());
}

#[test]
fn process_resolution_is_stable() {
    let first = resolve(&FixedVersion::release(34));
    let second = resolve(&FixedVersion::release(21));

    assert_eq!(first, second);
}
