use lexibattle_types::{normalized_key, AnswerHistoryEntry, CacheState, LoadWindow, VocabularyEntry};
use pretty_assertions::assert_eq;

// ── VocabularyEntry ───────────────────────────────────────────────

#[test]
fn entry_key_is_normalized() {
    let entry = VocabularyEntry::new("  Das   Haus ", "The House");
    assert_eq!(entry.key(), "das haus — the house");
}

#[test]
fn entry_display_keeps_original_casing() {
    let entry = VocabularyEntry::new("Hund", "dog");
    assert_eq!(entry.to_string(), "Hund — dog");
}

#[test]
fn entry_validate_rejects_blank_parts() {
    assert!(VocabularyEntry::new("", "dog").validate().is_err());
    assert!(VocabularyEntry::new("Hund", "  ").validate().is_err());
    assert!(VocabularyEntry::new("Hund", "dog").validate().is_ok());
}

#[test]
fn entry_deserializes_from_row() {
    let entry: VocabularyEntry =
        serde_json::from_str(r#"{"term":"Katze","translation":"cat"}"#).unwrap();
    assert_eq!(entry, VocabularyEntry::new("Katze", "cat"));
}

#[test]
fn history_entry_shares_key_with_vocabulary_entry() {
    let entry = VocabularyEntry::new("Baum", "Tree");
    let history = AnswerHistoryEntry::from(&entry);
    assert_eq!(history.key(), entry.key());
    assert_eq!(history.key(), normalized_key("baum", "tree"));
}

// ── CacheState ────────────────────────────────────────────────────

#[test]
fn cache_state_defaults_to_loading() {
    assert_eq!(CacheState::default(), CacheState::Loading);
    assert!(!CacheState::Loading.is_settled());
    assert!(CacheState::Ready.is_settled());
    assert!(CacheState::Error.is_settled());
}

#[test]
fn cache_state_only_leaves_loading() {
    assert!(CacheState::Loading.can_transition_to(CacheState::Ready));
    assert!(CacheState::Loading.can_transition_to(CacheState::Error));
    assert!(!CacheState::Ready.can_transition_to(CacheState::Loading));
    assert!(!CacheState::Ready.can_transition_to(CacheState::Error));
    assert!(!CacheState::Error.can_transition_to(CacheState::Loading));
    assert!(!CacheState::Error.can_transition_to(CacheState::Ready));
    assert!(!CacheState::Loading.can_transition_to(CacheState::Loading));
}

#[test]
fn cache_state_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&CacheState::Ready).unwrap(), r#""ready""#);
    assert_eq!(CacheState::Error.to_string(), "error");
}

// ── LoadWindow ────────────────────────────────────────────────────

#[test]
fn plan_until_clips_last_window() {
    let windows = LoadWindow::plan_until(500, 2700, 1000);
    assert_eq!(
        windows,
        vec![
            LoadWindow::new(500, 1000),
            LoadWindow::new(1500, 1000),
            LoadWindow::new(2500, 200),
        ]
    );
}

#[test]
fn plan_until_is_empty_when_cache_covers_total() {
    assert!(LoadWindow::plan_until(300, 300, 100).is_empty());
    assert!(LoadWindow::plan_until(400, 300, 100).is_empty());
}

#[test]
fn plan_with_zero_batch_size_is_empty() {
    assert!(LoadWindow::plan_until(0, 10, 0).is_empty());
    assert!(LoadWindow::plan_blind(0, 0, 5).is_empty());
}

#[test]
fn plan_blind_respects_limit() {
    let windows = LoadWindow::plan_blind(200, 100, 3);
    assert_eq!(windows.len(), 3);
    assert_eq!(windows[0], LoadWindow::new(200, 100));
    assert_eq!(windows[2].end(), 500);
}
