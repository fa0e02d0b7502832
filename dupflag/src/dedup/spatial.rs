use log::warn;

use super::ReadClass;
use crate::record::AlignmentRecord;

/// Resolve one ambiguous bin by pairwise spatial comparison.
///
/// Members are stable-sorted by ascending x (ties keep input order) and
/// walked as disjoint adjacent pairs. A pair further apart than `threshold`
/// on either axis is two distinct clusters whose start match is coincidental
/// (PCR); a pair within the threshold on both axes is one physical cluster
/// read twice (optical). The threshold is inclusive: a pair at exactly the
/// threshold distance is optical.
///
/// The scan always runs to the end of the bin. An odd-sized bin leaves its
/// last sorted member unpaired; that read is marked unresolved and reported,
/// never silently dropped.
pub(super) fn resolve_bin(
    records: &[AlignmentRecord],
    members: &[usize],
    threshold: u32,
    classes: &mut [ReadClass],
) {
    let mut order = members.to_vec();
    order.sort_by_key(|&idx| records[idx].x);

    let threshold = i64::from(threshold);
    let pairs = order.chunks_exact(2);
    if let [leftover] = pairs.remainder() {
        let rec = &records[*leftover];
        warn!(
            "read from sample {} at {}:{} (tile {}, start {}) left unpaired after the spatial scan",
            rec.sample_id, rec.x, rec.y, rec.tile, rec.start
        );
        classes[*leftover] = ReadClass::Unresolved;
    }
    for pair in pairs {
        let (a, b) = (pair[0], pair[1]);
        let dx = (records[a].x - records[b].x).abs();
        let dy = (records[a].y - records[b].y).abs();
        let class = if dx > threshold || dy > threshold {
            ReadClass::Pcr
        } else {
            ReadClass::Optical
        };
        classes[a] = class;
        classes[b] = class;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sample: &str, x: i64, y: i64, serial: usize) -> AlignmentRecord {
        let line = format!("{sample}:24:HW2MM:2:1101:{x}:{y}\t0\tchr1\t500\t60\t100M");
        AlignmentRecord::parse(&line, serial).unwrap()
    }

    fn resolve(records: &[AlignmentRecord], threshold: u32) -> Vec<ReadClass> {
        let members: Vec<usize> = (0..records.len()).collect();
        let mut classes = vec![ReadClass::Unique; records.len()];
        resolve_bin(records, &members, threshold, &mut classes);
        classes
    }

    #[test]
    fn threshold_is_inclusive_on_both_axes() {
        // dx exactly at the threshold, dy zero: same physical cluster.
        let records = vec![record("S1", 1000, 50, 0), record("S2", 1100, 50, 1)];
        assert_eq!(resolve(&records, 100), vec![ReadClass::Optical; 2]);

        // One unit past the threshold on x: distinct clusters.
        let records = vec![record("S1", 1000, 50, 0), record("S2", 1101, 50, 1)];
        assert_eq!(resolve(&records, 100), vec![ReadClass::Pcr; 2]);

        // y alone past the threshold also separates the pair.
        let records = vec![record("S1", 1000, 50, 0), record("S2", 1000, 151, 1)];
        assert_eq!(resolve(&records, 100), vec![ReadClass::Pcr; 2]);
    }

    #[test]
    fn threshold_is_configurable() {
        let records = vec![record("S1", 1000, 50, 0), record("S2", 1150, 50, 1)];
        assert_eq!(resolve(&records, 200), vec![ReadClass::Optical; 2]);
        assert_eq!(resolve(&records, 100), vec![ReadClass::Pcr; 2]);
    }

    #[test]
    fn scan_continues_past_the_first_optical_pair() {
        // Two tight pairs far from each other: both must be recovered as
        // optical, not just the first.
        let records = vec![
            record("S1", 100, 100, 0),
            record("S2", 110, 110, 1),
            record("S1", 5000, 5000, 2),
            record("S2", 5010, 5010, 3),
        ];
        assert_eq!(resolve(&records, 100), vec![ReadClass::Optical; 4]);
    }

    #[test]
    fn pairs_are_disjoint_along_the_sorted_order() {
        // Sorted by x: (10, 100), (120, 130). The middle gap (100..120) is
        // within the threshold but never compared, so the first pair decides
        // on dx=90 (optical) and the second on dx=10 (optical), while a pair
        // spanning records 1 and 2 never forms.
        let records = vec![
            record("S1", 10, 0, 0),
            record("S2", 100, 0, 1),
            record("S1", 120, 2000, 2),
            record("S2", 130, 2000, 3),
        ];
        let classes = resolve(&records, 100);
        assert_eq!(classes, vec![ReadClass::Optical; 4]);
    }

    #[test]
    fn odd_bin_leaves_the_last_sorted_read_unresolved() {
        let records = vec![
            record("S1", 100, 100, 0),
            record("S2", 110, 110, 1),
            record("S3", 9000, 9000, 2),
        ];
        let classes = resolve(&records, 100);
        assert_eq!(classes[0], ReadClass::Optical);
        assert_eq!(classes[1], ReadClass::Optical);
        assert_eq!(classes[2], ReadClass::Unresolved);
    }

    #[test]
    fn x_ties_keep_input_order() {
        // All three share x; the stable sort keeps input order, so the pair
        // is (serial 0, serial 1) and serial 2 is left over.
        let records = vec![
            record("S1", 500, 10, 0),
            record("S2", 500, 20, 1),
            record("S3", 500, 30, 2),
        ];
        let classes = resolve(&records, 100);
        assert_eq!(classes[0], ReadClass::Optical);
        assert_eq!(classes[1], ReadClass::Optical);
        assert_eq!(classes[2], ReadClass::Unresolved);
    }
}
