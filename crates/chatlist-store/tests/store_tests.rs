use chatlist_store::{Database, ModelRecord, PromptFilter, StoreError};
use tempfile::TempDir;

/// Helper: in-memory database with one seeded model.
fn db_with_model() -> (Database, i64) {
    let db = Database::open_in_memory().unwrap();
    let model = db
        .models()
        .add("GPT-4o", "https://api.openai.com/v1/chat/completions", "gpt-4o")
        .unwrap();
    (db, model.id)
}

#[test]
fn add_then_search_finds_prompt() {
    let db = Database::open_in_memory().unwrap();

    db.prompts()
        .add("Explain the borrow checker in one paragraph", Some("alice"))
        .unwrap();
    db.prompts().add("Write a haiku about autumn", None).unwrap();

    let found = db
        .prompts()
        .list(&PromptFilter {
            search: Some("borrow checker".to_string()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].author, "alice");
    assert!(found[0].text.contains("borrow checker"));
}

#[test]
fn search_is_ascii_case_insensitive() {
    // SQLite LIKE semantics, documented on PromptFilter::search.
    let db = Database::open_in_memory().unwrap();

    db.prompts().add("Summarize War and Peace", None).unwrap();

    let found = db
        .prompts()
        .list(&PromptFilter {
            search: Some("war AND peace".to_string()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(found.len(), 1);
}

#[test]
fn empty_prompt_text_rejected() {
    let db = Database::open_in_memory().unwrap();

    for text in ["", "   ", "\n\t"] {
        let err = db.prompts().add(text, None).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "text {:?}", text);
    }

    assert!(db.prompts().list(&PromptFilter::default()).unwrap().is_empty());
}

#[test]
fn prompts_listed_newest_first() {
    let db = Database::open_in_memory().unwrap();

    let a = db.prompts().add("A", None).unwrap();
    let b = db.prompts().add("B", None).unwrap();
    let c = db.prompts().add("C", None).unwrap();

    let listed = db.prompts().list(&PromptFilter::default()).unwrap();
    let ids: Vec<i64> = listed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![c.id, b.id, a.id]);
}

#[test]
fn prompt_list_respects_limit() {
    let db = Database::open_in_memory().unwrap();

    for i in 0..5 {
        db.prompts().add(&format!("prompt {}", i), None).unwrap();
    }

    let listed = db
        .prompts()
        .list(&PromptFilter {
            limit: Some(2),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].text, "prompt 4");
}

#[test]
fn prompt_list_date_range() {
    let db = Database::open_in_memory().unwrap();

    let p = db.prompts().add("recent", None).unwrap();

    let all = db
        .prompts()
        .list(&PromptFilter {
            after: Some(p.created_at - chrono::Duration::hours(1)),
            before: Some(p.created_at + chrono::Duration::hours(1)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(all.len(), 1);

    let none = db
        .prompts()
        .list(&PromptFilter {
            before: Some(p.created_at - chrono::Duration::hours(1)),
            ..Default::default()
        })
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn duplicate_model_name_rejected() {
    let (db, _) = db_with_model();

    let before = db.models().list_all().unwrap().len();
    let err = db
        .models()
        .add("GPT-4o", "https://other.example/v1", "other-id")
        .unwrap_err();

    assert!(matches!(err, StoreError::UniqueConstraint(_)));
    assert_eq!(db.models().list_all().unwrap().len(), before);
}

#[test]
fn model_fields_validated() {
    let db = Database::open_in_memory().unwrap();

    for (name, url, id) in [("", "u", "i"), ("n", "", "i"), ("n", "u", " ")] {
        let err = db.models().add(name, url, id).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}

#[test]
fn set_active_is_idempotent() {
    let (db, model_id) = db_with_model();

    db.models().set_active(model_id, false).unwrap();
    db.models().set_active(model_id, false).unwrap();
    assert!(db.models().list_active().unwrap().is_empty());

    db.models().set_active(model_id, true).unwrap();
    db.models().set_active(model_id, true).unwrap();

    let active = db.models().list_active().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, model_id);
}

#[test]
fn set_active_unknown_model_errors() {
    let db = Database::open_in_memory().unwrap();

    let err = db.models().set_active(42, true).unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound { entity: "model", id: 42 }
    ));
}

#[test]
fn active_models_in_insertion_order() {
    let db = Database::open_in_memory().unwrap();

    let m1 = db.models().add("first", "u", "a").unwrap();
    let m2 = db.models().add("second", "u", "b").unwrap();
    let m3 = db.models().add("third", "u", "c").unwrap();
    db.models().set_active(m2.id, false).unwrap();

    let active: Vec<i64> = db.models().list_active().unwrap().iter().map(|m| m.id).collect();
    assert_eq!(active, vec![m1.id, m3.id]);
}

#[test]
fn update_model_edits_fields() {
    let (db, model_id) = db_with_model();

    let updated = ModelRecord {
        id: model_id,
        name: "GPT-4o (renamed)".to_string(),
        api_url: "https://proxy.example/v1".to_string(),
        api_id: "gpt-4o-2024".to_string(),
        is_active: false,
    };
    db.models().update(&updated).unwrap();

    let stored = db.models().get(model_id).unwrap().unwrap();
    assert_eq!(stored.name, "GPT-4o (renamed)");
    assert_eq!(stored.api_url, "https://proxy.example/v1");
    assert!(!stored.is_active);
}

#[test]
fn update_model_duplicate_name_rejected() {
    let (db, model_id) = db_with_model();
    db.models().add("Claude", "u", "claude-3").unwrap();

    let clash = ModelRecord {
        id: model_id,
        name: "Claude".to_string(),
        api_url: "u".to_string(),
        api_id: "x".to_string(),
        is_active: true,
    };
    let err = db.models().update(&clash).unwrap_err();
    assert!(matches!(err, StoreError::UniqueConstraint(_)));
}

#[test]
fn update_unknown_model_errors() {
    let db = Database::open_in_memory().unwrap();

    let ghost = ModelRecord {
        id: 7,
        name: "ghost".to_string(),
        api_url: "u".to_string(),
        api_id: "g".to_string(),
        is_active: true,
    };
    let err = db.models().update(&ghost).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn add_result_and_read_back() {
    let (db, model_id) = db_with_model();
    let prompt = db.prompts().add("What is ownership?", None).unwrap();

    let result = db
        .results()
        .add(prompt.id, model_id, "Ownership is SQLite's favorite topic.")
        .unwrap();
    assert!(!result.is_selected);

    let rows = db.results().for_prompt(prompt.id).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].result.id, result.id);
    assert_eq!(rows[0].model_name, "GPT-4o");
}

#[test]
fn add_result_unknown_model_errors() {
    let db = Database::open_in_memory().unwrap();
    let prompt = db.prompts().add("dangling", None).unwrap();

    let err = db.results().add(prompt.id, 999, "text").unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound { entity: "model", id: 999 }
    ));

    // No row was created
    assert!(db.results().for_prompt(prompt.id).unwrap().is_empty());
}

#[test]
fn add_result_unknown_prompt_errors() {
    let (db, model_id) = db_with_model();

    let err = db.results().add(999, model_id, "text").unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound { entity: "prompt", id: 999 }
    ));
}

#[test]
fn empty_response_text_rejected() {
    let (db, model_id) = db_with_model();
    let prompt = db.prompts().add("p", None).unwrap();

    let err = db.results().add(prompt.id, model_id, "  ").unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn for_prompt_unknown_prompt_errors() {
    // Documented choice: a dangling prompt id is an error, an existing
    // prompt with no results is an empty list.
    let db = Database::open_in_memory().unwrap();

    let err = db.results().for_prompt(123).unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound { entity: "prompt", id: 123 }
    ));

    let prompt = db.prompts().add("no results yet", None).unwrap();
    assert!(db.results().for_prompt(prompt.id).unwrap().is_empty());
}

#[test]
fn for_prompt_oldest_first() {
    let (db, model_id) = db_with_model();
    let prompt = db.prompts().add("p", None).unwrap();

    let r1 = db.results().add(prompt.id, model_id, "first").unwrap();
    let r2 = db.results().add(prompt.id, model_id, "second").unwrap();

    let rows = db.results().for_prompt(prompt.id).unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.result.id).collect();
    assert_eq!(ids, vec![r1.id, r2.id]);
}

#[test]
fn bulk_select_skips_unknown_ids() {
    let (db, model_id) = db_with_model();
    let prompt = db.prompts().add("p", None).unwrap();

    let r1 = db.results().add(prompt.id, model_id, "one").unwrap();
    let r2 = db.results().add(prompt.id, model_id, "two").unwrap();

    let changed = db.results().set_selected(&[r1.id, r2.id, 9999], true).unwrap();
    assert_eq!(changed, 2);

    let selected = db.results().list_selected().unwrap();
    assert_eq!(selected.len(), 2);
    assert!(selected.iter().all(|r| r.result.is_selected));
}

#[test]
fn set_selected_empty_set_is_noop() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.results().set_selected(&[], true).unwrap(), 0);
}

#[test]
fn unselect_reverses_selection() {
    let (db, model_id) = db_with_model();
    let prompt = db.prompts().add("p", None).unwrap();
    let r = db.results().add(prompt.id, model_id, "answer").unwrap();

    db.results().set_selected(&[r.id], true).unwrap();
    assert_eq!(db.results().list_selected().unwrap().len(), 1);

    db.results().set_selected(&[r.id], false).unwrap();
    assert!(db.results().list_selected().unwrap().is_empty());
}

#[test]
fn list_selected_joins_and_orders_newest_first() {
    let (db, model_id) = db_with_model();
    let p1 = db.prompts().add("first prompt", None).unwrap();
    let p2 = db.prompts().add("second prompt", None).unwrap();

    let r1 = db.results().add(p1.id, model_id, "old answer").unwrap();
    let r2 = db.results().add(p2.id, model_id, "new answer").unwrap();
    db.results().add(p1.id, model_id, "unselected").unwrap();

    db.results().set_selected(&[r1.id, r2.id], true).unwrap();

    let selected = db.results().list_selected().unwrap();
    assert_eq!(selected.len(), 2);
    assert_eq!(selected[0].result.id, r2.id);
    assert_eq!(selected[0].prompt_text, "second prompt");
    assert_eq!(selected[0].model_name, "GPT-4o");
    assert_eq!(selected[1].result.id, r1.id);
}

#[test]
fn delete_prompt_cascades_its_results_only() {
    let (db, model_id) = db_with_model();

    let doomed = db.prompts().add("doomed", None).unwrap();
    let kept = db.prompts().add("kept", None).unwrap();
    db.results().add(doomed.id, model_id, "a").unwrap();
    db.results().add(doomed.id, model_id, "b").unwrap();
    let survivor = db.results().add(kept.id, model_id, "c").unwrap();

    db.prompts().delete(doomed.id).unwrap();

    assert!(db.prompts().get(doomed.id).unwrap().is_none());
    let err = db.results().for_prompt(doomed.id).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    let remaining = db.results().for_prompt(kept.id).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].result.id, survivor.id);
}

#[test]
fn delete_model_cascades_its_results_only() {
    let db = Database::open_in_memory().unwrap();
    let doomed = db.models().add("doomed", "u", "d").unwrap();
    let kept = db.models().add("kept", "u", "k").unwrap();
    let prompt = db.prompts().add("p", None).unwrap();

    db.results().add(prompt.id, doomed.id, "from doomed").unwrap();
    let survivor = db.results().add(prompt.id, kept.id, "from kept").unwrap();

    db.models().delete(doomed.id).unwrap();

    assert!(db.models().get(doomed.id).unwrap().is_none());
    let remaining = db.results().for_prompt(prompt.id).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].result.id, survivor.id);
    assert_eq!(remaining[0].model_name, "kept");
}

#[test]
fn delete_unknown_model_errors() {
    let db = Database::open_in_memory().unwrap();

    let err = db.models().delete(5).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "model", id: 5 }));
}

#[test]
fn delete_single_result() {
    let (db, model_id) = db_with_model();
    let prompt = db.prompts().add("p", None).unwrap();
    let r = db.results().add(prompt.id, model_id, "answer").unwrap();

    db.results().delete(r.id).unwrap();
    assert!(db.results().get(r.id).unwrap().is_none());

    let err = db.results().delete(r.id).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn settings_round_trip_and_overwrite() {
    let db = Database::open_in_memory().unwrap();

    assert_eq!(db.settings().get("theme").unwrap(), None);

    db.settings().set("theme", "dark").unwrap();
    assert_eq!(db.settings().get("theme").unwrap().as_deref(), Some("dark"));

    // Overwrite, not duplicate
    db.settings().set("theme", "light").unwrap();
    assert_eq!(db.settings().get("theme").unwrap().as_deref(), Some("light"));
}

#[test]
fn settings_remove() {
    let db = Database::open_in_memory().unwrap();

    db.settings().set("theme", "dark").unwrap();
    assert!(db.settings().remove("theme").unwrap());
    assert_eq!(db.settings().get("theme").unwrap(), None);
    assert!(!db.settings().remove("theme").unwrap());
}

#[test]
fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chatlist.db");

    let prompt_id;
    {
        let db = Database::open_at(&path).unwrap();
        let model = db.models().add("m", "u", "i").unwrap();
        let prompt = db.prompts().add("persistent", None).unwrap();
        prompt_id = prompt.id;
        let r = db.results().add(prompt.id, model.id, "answer").unwrap();
        db.results().set_selected(&[r.id], true).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let prompt = db.prompts().get(prompt_id).unwrap().unwrap();
    assert_eq!(prompt.text, "persistent");

    let selected = db.results().list_selected().unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].prompt_text, "persistent");
}
