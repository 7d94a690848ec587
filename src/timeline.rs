//! Timestamp lookup for playback highlighting.
//!
//! [`TimeRangeIndex`] answers "which interval contains this instant" with a
//! binary search over interval starts. [`TranscriptTimeline`] keeps one index
//! over subtitles and one over the flattened word list.

use crate::transcript::TranscriptRecord;

/// Sorted closed intervals `[start, end]` in milliseconds.
#[derive(Debug, Clone, Default)]
pub struct TimeRangeIndex {
    starts: Vec<u64>,
    ends: Vec<u64>,
}

impl TimeRangeIndex {
    /// Build from intervals already in ascending, non-overlapping order.
    pub fn build<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let (starts, ends) = ranges.into_iter().unzip();
        Self { starts, ends }
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Position of the range containing `t`, if any.
    ///
    /// When several ranges contain `t` (touching boundaries), the earliest
    /// one in sequence order wins.
    pub fn query(&self, t: u64) -> Option<usize> {
        // Last range starting at or before t.
        let mut idx = self.starts.partition_point(|&s| s <= t).checked_sub(1)?;
        while idx > 0 && self.ends[idx - 1] >= t {
            idx -= 1;
        }
        (self.ends[idx] >= t).then_some(idx)
    }
}

/// Location of an instant within a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Index of the active subtitle.
    pub subtitle: Option<usize>,
    /// `(subtitle index, word index within that subtitle)` of the active word.
    pub word: Option<(usize, usize)>,
}

/// Subtitle and word indices for one loaded transcript.
#[derive(Debug, Clone, Default)]
pub struct TranscriptTimeline {
    subtitles: TimeRangeIndex,
    words: TimeRangeIndex,
    word_owners: Vec<(usize, usize)>,
}

impl TranscriptTimeline {
    pub fn build(record: &TranscriptRecord) -> Self {
        let subtitles = TimeRangeIndex::build(
            record
                .subtitles
                .iter()
                .map(|s| (s.start_time_ms, s.end_time_ms)),
        );

        let mut ranges = Vec::new();
        let mut word_owners = Vec::new();
        for (s, subtitle) in record.subtitles.iter().enumerate() {
            for (w, word) in subtitle.words.iter().enumerate() {
                ranges.push((word.start_time_ms, word.end_time_ms));
                word_owners.push((s, w));
            }
        }

        Self {
            subtitles,
            words: TimeRangeIndex::build(ranges),
            word_owners,
        }
    }

    pub fn locate(&self, t: u64) -> Position {
        Position {
            subtitle: self.subtitles.query(t),
            word: self.words.query(t).map(|i| self.word_owners[i]),
        }
    }

    pub fn subtitle_count(&self) -> usize {
        self.subtitles.len()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Subtitle, Word};

    fn linear_scan(ranges: &[(u64, u64)], t: u64) -> Option<usize> {
        ranges.iter().position(|&(s, e)| s <= t && t <= e)
    }

    #[test]
    fn test_empty_index() {
        let index = TimeRangeIndex::build(Vec::<(u64, u64)>::new());
        assert!(index.is_empty());
        assert_eq!(index.query(0), None);
        assert_eq!(index.query(1000), None);
    }

    #[test]
    fn test_query_matches_linear_scan() {
        let ranges = vec![(100, 200), (200, 350), (400, 400), (500, 900), (1200, 1300)];
        let index = TimeRangeIndex::build(ranges.clone());
        for t in 0..1400 {
            assert_eq!(index.query(t), linear_scan(&ranges, t), "t = {}", t);
        }
    }

    #[test]
    fn test_gaps_and_edges() {
        let index = TimeRangeIndex::build(vec![(100, 200), (300, 400)]);
        assert_eq!(index.query(99), None);
        assert_eq!(index.query(100), Some(0));
        assert_eq!(index.query(200), Some(0));
        assert_eq!(index.query(250), None);
        assert_eq!(index.query(400), Some(1));
        assert_eq!(index.query(401), None);
    }

    #[test]
    fn test_shared_boundary_prefers_earlier() {
        let index = TimeRangeIndex::build(vec![(0, 500), (500, 500), (500, 800)]);
        assert_eq!(index.query(500), Some(0));
        assert_eq!(index.query(501), Some(2));
    }

    #[test]
    fn test_transcript_timeline() {
        let record = TranscriptRecord::new(
            vec![
                Subtitle::new(
                    None,
                    0,
                    1000,
                    "hello there",
                    vec![Word::new("hello", 0, 400), Word::new("there", 500, 1000)],
                ),
                Subtitle::new(None, 1500, 2000, "bye", vec![Word::new("bye", 1500, 2000)]),
            ],
            "/a.mp3",
        );
        let timeline = TranscriptTimeline::build(&record);
        assert_eq!(timeline.subtitle_count(), 2);
        assert_eq!(timeline.word_count(), 3);

        assert_eq!(
            timeline.locate(450),
            Position { subtitle: Some(0), word: None }
        );
        assert_eq!(
            timeline.locate(700),
            Position { subtitle: Some(0), word: Some((0, 1)) }
        );
        assert_eq!(
            timeline.locate(1600),
            Position { subtitle: Some(1), word: Some((1, 0)) }
        );
        assert_eq!(timeline.locate(1200), Position::default());
    }
}
