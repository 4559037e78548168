//! Sample-type column lookup per profile kind.

use crate::units::ValueUnit;
use crate::{LensError, LensResult, Profile, ProfileKind};

/// Columns the hotspot aggregator reads from one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotspotColumns {
    /// Magnitude column; ranking key.
    pub value: usize,
    /// Event/object count column, when the kind has one and the profile declares it.
    pub count: Option<usize>,
    pub unit: ValueUnit,
}

impl HotspotColumns {
    pub fn has_count(&self) -> bool {
        self.count.is_some()
    }

    fn max_index(&self) -> usize {
        self.count.map_or(self.value, |c| c.max(self.value))
    }

    /// Shortest value vector a sample needs to be counted.
    pub fn min_len(&self) -> usize {
        self.max_index() + 1
    }
}

pub fn resolve_hotspot_columns(profile: &Profile, kind: ProfileKind) -> LensResult<HotspotColumns> {
    let (value, count) = match kind {
        ProfileKind::Mutex | ProfileKind::Block => {
            let count = profile.column("contentions");
            let value = profile.column("delay");
            match (count, value) {
                (Some(count), Some(value)) => (value, Some(count)),
                _ => {
                    let missing = [("contentions", count), ("delay", value)]
                        .into_iter()
                        .filter(|(_, idx)| idx.is_none())
                        .map(|(name, _)| name)
                        .collect::<Vec<_>>();
                    return Err(LensError::MissingSampleType(missing.join(", ")));
                }
            }
        }
        ProfileKind::Cpu => {
            let value = profile
                .column("cpu")
                .or_else(|| find(profile, |name, unit| name == "samples" && unit == "nanoseconds"))
                .or_else(|| find(profile, |_, unit| unit == "nanoseconds"));
            (fallback(profile, value, kind)?, counted(profile, "samples"))
        }
        ProfileKind::Heap => {
            let value = profile
                .column("inuse_space")
                .or_else(|| find(profile, |_, unit| unit == "bytes"));
            (fallback(profile, value, kind)?, counted(profile, "inuse_objects"))
        }
        ProfileKind::Allocs => {
            let value = profile
                .column("alloc_space")
                .or_else(|| find(profile, |_, unit| unit == "bytes"));
            (fallback(profile, value, kind)?, counted(profile, "alloc_objects"))
        }
        ProfileKind::Goroutine => {
            let value = profile
                .column("goroutine")
                .or_else(|| find(profile, |_, unit| unit == "count"));
            (fallback(profile, value, kind)?, None)
        }
    };

    let count = count.filter(|c| *c != value);
    Ok(HotspotColumns {
        value,
        count,
        unit: ValueUnit::from_unit(&profile.sample_type[value].unit),
    })
}

/// Single comparison column for the differential comparator.
pub fn resolve_diff_column(profile: &Profile, kind: ProfileKind) -> LensResult<usize> {
    let matched = profile.sample_type.iter().position(|st| match kind {
        ProfileKind::Cpu => st.name == "cpu" || (st.name == "samples" && st.unit == "nanoseconds"),
        ProfileKind::Heap | ProfileKind::Allocs => {
            st.name == "inuse_space" || st.name == "alloc_space"
        }
        ProfileKind::Mutex | ProfileKind::Block => st.name == "delay",
        ProfileKind::Goroutine => false,
    });
    fallback(profile, matched, kind)
}

fn find(profile: &Profile, pred: impl Fn(&str, &str) -> bool) -> Option<usize> {
    profile
        .sample_type
        .iter()
        .position(|st| pred(&st.name, &st.unit))
}

/// A `count`-unit column with the given name.
fn counted(profile: &Profile, name: &str) -> Option<usize> {
    find(profile, |n, unit| n == name && unit == "count")
}

/// Second declared column, or the first when only one exists.
fn fallback(profile: &Profile, matched: Option<usize>, kind: ProfileKind) -> LensResult<usize> {
    if let Some(idx) = matched {
        return Ok(idx);
    }
    match profile.sample_type.len() {
        0 => Err(LensError::MissingSampleType(format!(
            "{kind} profile declares no sample types"
        ))),
        1 => Ok(0),
        _ => Ok(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueType;

    fn profile(columns: &[(&str, &str)]) -> Profile {
        Profile::new(
            columns
                .iter()
                .map(|(name, unit)| ValueType::new(name, unit))
                .collect(),
        )
    }

    #[test]
    fn block_requires_both_columns() {
        let p = profile(&[("cpu", "nanoseconds")]);
        let err = resolve_hotspot_columns(&p, ProfileKind::Block).expect_err("must fail");
        let msg = err.to_string();
        assert!(msg.contains("contentions") && msg.contains("delay"), "message: {msg}");

        let p = profile(&[("contentions", "count")]);
        let err = resolve_hotspot_columns(&p, ProfileKind::Mutex).expect_err("must fail");
        assert!(err.to_string().contains("delay"));
        assert!(!err.to_string().contains("contentions"));
    }

    #[test]
    fn block_columns_resolve_in_any_order() {
        let p = profile(&[("delay", "nanoseconds"), ("contentions", "count")]);
        let cols = resolve_hotspot_columns(&p, ProfileKind::Block).expect("columns");
        assert_eq!(cols.value, 0);
        assert_eq!(cols.count, Some(1));
        assert_eq!(cols.unit, ValueUnit::Nanoseconds);
        assert_eq!(cols.min_len(), 2);
    }

    #[test]
    fn cpu_prefers_cpu_column_and_counts_samples() {
        let p = profile(&[("samples", "count"), ("cpu", "nanoseconds")]);
        let cols = resolve_hotspot_columns(&p, ProfileKind::Cpu).expect("columns");
        assert_eq!(cols.value, 1);
        assert_eq!(cols.count, Some(0));
    }

    #[test]
    fn heap_objects_column_is_optional() {
        let p = profile(&[("inuse_space", "bytes")]);
        let cols = resolve_hotspot_columns(&p, ProfileKind::Heap).expect("columns");
        assert_eq!(cols.value, 0);
        assert!(!cols.has_count());
        assert_eq!(cols.unit, ValueUnit::Bytes);
    }

    #[test]
    fn unmatched_kinds_fall_back_to_second_column() {
        let p = profile(&[("a", "widgets"), ("b", "widgets"), ("c", "widgets")]);
        let cols = resolve_hotspot_columns(&p, ProfileKind::Goroutine).expect("columns");
        assert_eq!(cols.value, 1);
        assert_eq!(resolve_diff_column(&p, ProfileKind::Goroutine).expect("diff"), 1);

        let single = profile(&[("a", "widgets")]);
        assert_eq!(resolve_diff_column(&single, ProfileKind::Cpu).expect("diff"), 0);
    }

    #[test]
    fn no_columns_is_missing_sample_type() {
        let p = profile(&[]);
        let err = resolve_diff_column(&p, ProfileKind::Heap).expect_err("must fail");
        assert!(matches!(err, LensError::MissingSampleType(_)));
    }

    #[test]
    fn diff_heap_takes_first_space_column() {
        let p = profile(&[
            ("alloc_objects", "count"),
            ("alloc_space", "bytes"),
            ("inuse_objects", "count"),
            ("inuse_space", "bytes"),
        ]);
        assert_eq!(resolve_diff_column(&p, ProfileKind::Heap).expect("diff"), 1);
    }
}
