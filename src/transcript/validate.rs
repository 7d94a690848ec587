//! Structural checks and ordering repair for transcripts.

use super::{Subtitle, TranscriptRecord, Word};
use crate::error::{Result, TekstError};

/// Check every invariant a cached record must satisfy.
///
/// Subtitles must be positionally numbered, have text, `start <= end`, and be
/// ascending and non-overlapping. Words obey the same ordering and sit inside
/// their subtitle. Translations may only refer to existing subtitles.
pub fn validate_record(record: &TranscriptRecord) -> Result<()> {
    if record.source_path.trim().is_empty() {
        return Err(TekstError::Validation("record has no file_path".to_string()));
    }

    let mut previous_end: Option<u64> = None;
    for (i, subtitle) in record.subtitles.iter().enumerate() {
        if subtitle.index != i {
            return Err(TekstError::Validation(format!(
                "subtitle at position {} carries index {}",
                i, subtitle.index
            )));
        }
        validate_subtitle(i, subtitle)?;
        if let Some(end) = previous_end {
            if subtitle.start_time_ms < end {
                return Err(TekstError::Validation(format!(
                    "subtitle {} starts at {}ms before the previous one ends at {}ms",
                    i, subtitle.start_time_ms, end
                )));
            }
        }
        previous_end = Some(subtitle.end_time_ms);
    }

    if let Some((&index, _)) = record
        .translations
        .iter()
        .find(|(&index, _)| index >= record.subtitles.len())
    {
        return Err(TekstError::Validation(format!(
            "translation refers to missing subtitle {}",
            index
        )));
    }

    Ok(())
}

fn validate_subtitle(i: usize, subtitle: &Subtitle) -> Result<()> {
    if subtitle.text.trim().is_empty() {
        return Err(TekstError::Validation(format!("subtitle {} has no text", i)));
    }
    if subtitle.start_time_ms > subtitle.end_time_ms {
        return Err(TekstError::Validation(format!(
            "subtitle {} ends ({}ms) before it starts ({}ms)",
            i, subtitle.end_time_ms, subtitle.start_time_ms
        )));
    }

    let mut previous_end: Option<u64> = None;
    for (w, word) in subtitle.words.iter().enumerate() {
        if word.text.trim().is_empty() {
            return Err(TekstError::Validation(format!("subtitle {} word {} has no text", i, w)));
        }
        if word.start_time_ms > word.end_time_ms {
            return Err(TekstError::Validation(format!(
                "subtitle {} word {} ends before it starts",
                i, w
            )));
        }
        if word.start_time_ms < subtitle.start_time_ms || word.end_time_ms > subtitle.end_time_ms {
            return Err(TekstError::Validation(format!(
                "subtitle {} word {} lies outside its subtitle",
                i, w
            )));
        }
        if previous_end.is_some_and(|end| word.start_time_ms < end) {
            return Err(TekstError::Validation(format!(
                "subtitle {} word {} overlaps the previous word",
                i, w
            )));
        }
        previous_end = Some(word.end_time_ms);
    }

    Ok(())
}

/// Bring backend output into canonical order.
///
/// Sorts subtitles by start time, fixes inverted intervals, trims overlaps
/// against the following item, clamps words into their subtitle and drops
/// blank items. The result always passes [`validate_record`] given a
/// non-empty source path.
pub fn repair_subtitles(mut subtitles: Vec<Subtitle>) -> Vec<Subtitle> {
    subtitles.retain(|s| !s.text.trim().is_empty());
    for subtitle in &mut subtitles {
        if subtitle.end_time_ms < subtitle.start_time_ms {
            subtitle.end_time_ms = subtitle.start_time_ms;
        }
    }
    subtitles.sort_by_key(|s| s.start_time_ms);

    for i in 1..subtitles.len() {
        let next_start = subtitles[i].start_time_ms;
        let prev = &mut subtitles[i - 1];
        if prev.end_time_ms > next_start {
            prev.end_time_ms = next_start.max(prev.start_time_ms);
        }
    }

    for (i, subtitle) in subtitles.iter_mut().enumerate() {
        subtitle.index = i;
        let (start, end) = (subtitle.start_time_ms, subtitle.end_time_ms);
        subtitle.words = repair_words(std::mem::take(&mut subtitle.words), start, end);
    }

    subtitles
}

fn repair_words(mut words: Vec<Word>, start: u64, end: u64) -> Vec<Word> {
    words.retain(|w| !w.text.trim().is_empty());
    for word in &mut words {
        word.start_time_ms = word.start_time_ms.clamp(start, end);
        word.end_time_ms = word.end_time_ms.clamp(word.start_time_ms, end);
    }
    words.sort_by_key(|w| w.start_time_ms);

    for i in 1..words.len() {
        let next_start = words[i].start_time_ms;
        let prev = &mut words[i - 1];
        if prev.end_time_ms > next_start {
            prev.end_time_ms = next_start.max(prev.start_time_ms);
        }
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranslationEntry;

    fn sub(start: u64, end: u64, text: &str, words: Vec<Word>) -> Subtitle {
        Subtitle::new(None, start, end, text, words)
    }

    #[test]
    fn test_valid_record_passes() {
        let record = TranscriptRecord::new(
            vec![
                sub(0, 1000, "one two", vec![Word::new("one", 0, 500), Word::new("two", 500, 1000)]),
                sub(1000, 2000, "three", vec![]),
            ],
            "/a.mp3",
        );
        validate_record(&record).unwrap();
    }

    #[test]
    fn test_inverted_subtitle_rejected() {
        let record = TranscriptRecord::new(vec![sub(2000, 1000, "x", vec![])], "/a.mp3");
        assert!(matches!(validate_record(&record), Err(TekstError::Validation(_))));
    }

    #[test]
    fn test_overlap_rejected() {
        let record = TranscriptRecord::new(
            vec![sub(0, 1500, "a", vec![]), sub(1000, 2000, "b", vec![])],
            "/a.mp3",
        );
        assert!(validate_record(&record).is_err());
    }

    #[test]
    fn test_word_outside_subtitle_rejected() {
        let record = TranscriptRecord::new(
            vec![sub(0, 1000, "a", vec![Word::new("a", 900, 1200)])],
            "/a.mp3",
        );
        assert!(validate_record(&record).is_err());
    }

    #[test]
    fn test_missing_source_rejected() {
        let record = TranscriptRecord::new(vec![sub(0, 10, "a", vec![])], " ");
        assert!(validate_record(&record).is_err());
    }

    #[test]
    fn test_dangling_translation_rejected() {
        let mut record = TranscriptRecord::new(vec![sub(0, 10, "a", vec![])], "/a.mp3");
        record.translations.insert(3, TranslationEntry::new("x", "google"));
        assert!(validate_record(&record).is_err());
    }

    #[test]
    fn test_repair_sorts_and_trims() {
        let repaired = repair_subtitles(vec![
            sub(3000, 4000, "c", vec![]),
            sub(0, 2500, "a", vec![Word::new("a", 0, 3000)]),
            sub(2000, 1000, "b", vec![]),
            sub(5000, 6000, "   ", vec![]),
        ]);

        assert_eq!(repaired.len(), 3);
        assert_eq!(repaired[0].text, "a");
        assert_eq!(repaired[0].end_time_ms, 2000);
        assert_eq!(repaired[0].words[0].end_time_ms, 2000);
        assert_eq!(repaired[1].text, "b");
        assert_eq!((repaired[1].start_time_ms, repaired[1].end_time_ms), (2000, 2000));
        assert_eq!(repaired[2].index, 2);

        validate_record(&TranscriptRecord::new(repaired, "/a.mp3")).unwrap();
    }

    #[test]
    fn test_repair_words_overlap() {
        let repaired = repair_subtitles(vec![sub(
            100,
            1000,
            "x y",
            vec![Word::new("y", 500, 900), Word::new("x", 0, 700)],
        )]);
        let words = &repaired[0].words;
        assert_eq!(words[0].text, "x");
        assert_eq!((words[0].start_time_ms, words[0].end_time_ms), (100, 500));
        assert_eq!((words[1].start_time_ms, words[1].end_time_ms), (500, 900));
    }
}
