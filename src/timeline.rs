//! Timeline model: an ordered sequence of time segments (spec.md §3
//! "Timeline").
//!
//! Segment 0 is the implicit zero-duration boot segment created at
//! interpreter init. Each subsequent segment corresponds to one `duration`
//! statement.

/// One time segment. `visibility` and `moving` are indexed by object
/// `depth`; both vectors grow as new objects are created mid-run, with
/// earlier segments backfilled (`false` / `None`) for objects that didn't
/// exist yet when they were recorded (spec.md §4.3 `shape_init`: "records
/// a visibility-off marker into every existing timeline segment").
#[derive(Clone, Debug)]
pub struct Segment {
    pub duration: f64,
    pub begin_time: f64,
    pub end_time: f64,
    pub visibility: Vec<bool>,
    pub moving: Vec<Option<(f64, f64)>>,
}

impl Segment {
    fn boot() -> Self {
        Self {
            duration: 0.0,
            begin_time: 0.0,
            end_time: 0.0,
            visibility: Vec::new(),
            moving: Vec::new(),
        }
    }

    pub fn is_boot(&self) -> bool {
        self.begin_time == 0.0 && self.end_time == 0.0 && self.duration == 0.0
    }
}

/// The ordered sequence of segments produced by a run (spec.md §3
/// "Timeline").
#[derive(Clone, Debug)]
pub struct Timeline {
    pub segments: Vec<Segment>,
}

impl Timeline {
    /// A fresh timeline containing only the segment-0 boot entry.
    pub fn new() -> Self {
        Self {
            segments: vec![Segment::boot()],
        }
    }

    /// Record that a new object was created: extend every existing
    /// segment's per-object vectors with a hidden / not-moving entry.
    pub fn register_new_object(&mut self) {
        for seg in &mut self.segments {
            seg.visibility.push(false);
            seg.moving.push(None);
        }
    }

    /// Append a new segment for a `duration t` statement, with `begin_time`
    /// chained to the previous segment's `end_time`.
    pub fn push_segment(&mut self, duration: f64, visibility: Vec<bool>, moving: Vec<Option<(f64, f64)>>) -> usize {
        let begin_time = self.segments.last().map(|s| s.end_time).unwrap_or(0.0);
        let end_time = begin_time + duration;
        self.segments.push(Segment {
            duration,
            begin_time,
            end_time,
            visibility,
            moving,
        });
        self.segments.len() - 1
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timeline_has_one_boot_segment() {
        let tl = Timeline::new();
        assert_eq!(tl.segments.len(), 1);
        assert!(tl.segments[0].is_boot());
    }

    #[test]
    fn register_new_object_extends_all_segments() {
        let mut tl = Timeline::new();
        tl.push_segment(1.0, vec![true], vec![None]);
        tl.register_new_object();
        assert_eq!(tl.segments[0].visibility.len(), 1);
        assert_eq!(tl.segments[1].visibility.len(), 2);
        assert_eq!(tl.segments[1].visibility[1], false);
    }

    #[test]
    fn segments_chain_begin_to_prior_end() {
        let mut tl = Timeline::new();
        tl.push_segment(2.0, vec![], vec![]);
        tl.push_segment(3.0, vec![], vec![]);
        assert_eq!(tl.segments[1].begin_time, 0.0);
        assert_eq!(tl.segments[1].end_time, 2.0);
        assert_eq!(tl.segments[2].begin_time, 2.0);
        assert_eq!(tl.segments[2].end_time, 5.0);
    }
}
