#![allow(clippy::non_ascii_literal)]

use super::*;

#[test]
fn test_wechat_group_chat_is_stable_without_model() {
    let classifier = Classifier::rules_only();
    let first = classifier.classify("wechat.exe", "群聊");
    for _ in 0..10 {
        assert_eq!(classifier.classify("wechat.exe", "群聊"), first);
    }
    assert_eq!(first, Category::Social);

    // a fresh instance agrees
    assert_eq!(Classifier::rules_only().classify("wechat.exe", "群聊"), first);
}

#[test]
fn test_rule_matching_is_case_insensitive() {
    let classifier = Classifier::rules_only();
    assert_eq!(classifier.classify("Spotify.exe", "Daily Mix"), Category::Entertainment);
    assert_eq!(classifier.classify("PyCharm64.exe", "tempo"), Category::Coding);
}

#[test]
fn test_cjk_keywords_match_original_text() {
    let classifier = Classifier::rules_only();
    assert_eq!(classifier.classify("Weixin", "微信"), Category::Social);
    assert_eq!(classifier.classify("explorer", "资源管理器"), Category::System);
    assert_eq!(classifier.classify("browser", "Python 教程"), Category::Learning);
}

#[test]
fn test_first_category_in_table_order_wins() {
    // "outlook" is listed under both documentation and social
    let result = Classifier::rules_only().classify_full("OUTLOOK.EXE", "Inbox");
    assert_eq!(result.category, Category::Documentation);
    assert_eq!(result.source, ClassificationSource::Rule);
    assert_eq!(result.keyword, Some("outlook"));
}

#[test]
fn test_table_order_irrelevant_for_single_category_inputs() {
    let reversed_keywords: Vec<(Category, Vec<&'static str>)> = RULES
        .iter()
        .rev()
        .map(|(category, keywords)| (*category, keywords.iter().rev().copied().collect()))
        .collect();
    let reversed: Vec<(Category, &[&'static str])> = reversed_keywords
        .iter()
        .map(|(category, keywords)| (*category, keywords.as_slice()))
        .collect();

    let inputs = [
        ("wechat.exe", "群聊"),
        ("pycharm64.exe", "tempo"),
        ("chrome.exe", "Coursera - Algorithms"),
        ("steam.exe", "Hyper Light Drifter"),
        ("explorer.exe", "资源管理器"),
        ("WINWORD.EXE", "report.docx"),
    ];
    for (app, title) in inputs {
        let forward = match_table(RULES, app, title).map(|(category, _)| category);
        let backward = match_table(&reversed, app, title).map(|(category, _)| category);
        assert!(forward.is_some(), "{app} {title} matched nothing");
        assert_eq!(forward, backward, "{app} {title}");
    }
    assert_eq!(match_rules("wechat.exe", "群聊"), match_table(RULES, "wechat.exe", "群聊"));
}

#[test]
fn test_restored_game_titles_are_entertainment() {
    let classifier = Classifier::rules_only();
    for (app, title) in [
        ("steam.exe", "Oxygen Not Included"),
        ("eu4.exe", "Europa Universalis IV"),
        ("launcher.exe", "Dragon Ball FighterZ"),
        ("game.exe", "模拟人生4"),
        ("switch", "任天堂明星大乱斗"),
        ("ffxiv_dx11.exe", "FINAL FANTASY XIV"),
    ] {
        assert_eq!(classifier.classify(app, title), Category::Entertainment, "{title}");
    }
}

#[test]
fn test_ordinary_words_are_not_games() {
    let classifier = Classifier::rules_only();
    assert_eq!(classifier.classify("notepad.exe", "personal notes"), Category::Other);
    assert_eq!(classifier.classify("acrobat.exe", "anecdotal evidence.pdf"), Category::Other);
    assert_eq!(classifier.classify("chrome.exe", "Sunglasses and shades"), Category::Other);
}

#[test]
fn test_no_match_without_model_is_other() {
    let result = Classifier::rules_only().classify_full("foo.exe", "bar");
    assert_eq!(result.category, Category::Other);
    assert_eq!(result.source, ClassificationSource::Default);
}

#[test]
fn test_missing_model_file_degrades_to_rules() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = Classifier::new(Some(dir.path().join("missing.json")));
    assert!(!classifier.has_model());
    assert_eq!(classifier.classify("foo.exe", "bar"), Category::Other);
    assert_eq!(classifier.classify("wechat.exe", "群聊"), Category::Social);
}

#[test]
fn test_broken_model_file_degrades_to_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classifier.json");
    std::fs::write(&path, "{ not json").unwrap();
    let classifier = Classifier::new(Some(path));
    assert!(!classifier.has_model());
    assert_eq!(classifier.classify("foo.exe", "bar"), Category::Other);
}

const MODEL: &str = r#"{
    "labels": ["entertainment", "work"],
    "bias": [0.0, 0.0],
    "weights": { "bilibili": [5.0, 0.0], "wechat": [0.0, 5.0] },
    "min_score": 0.5
}"#;

#[test]
fn test_model_used_when_no_rule_matches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classifier.json");
    std::fs::write(&path, MODEL).unwrap();

    let classifier = Classifier::new(Some(path));
    let result = classifier.classify_full("msedge.exe", "bilibili");
    assert_eq!(result.category, Category::Entertainment);
    assert_eq!(result.source, ClassificationSource::Model);
    assert!(classifier.has_model());
}

#[test]
fn test_rule_hit_overrides_confident_model() {
    // the model is sure wechat is work; the rule says social
    let classifier = Classifier::with_model(LinearModel::from_json(MODEL).unwrap());
    let result = classifier.classify_full("wechat.exe", "chat");
    assert_eq!(result.category, Category::Social);
    assert_eq!(result.source, ClassificationSource::Rule);
}

#[test]
fn test_cached_result_matches_uncached() {
    let classifier = Classifier::rules_only();
    let uncached = classifier.classify_uncached("code.exe", "main.rs");
    assert_eq!(classifier.classify_full("code.exe", "main.rs"), uncached);
    assert_eq!(classifier.classify_full("code.exe", "main.rs"), uncached);
}

#[test]
fn test_category_names_round_trip() {
    for category in Category::ALL {
        assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        assert!(category.color().starts_with('#'));
    }
    assert!("gaming".parse::<Category>().is_err());
    assert_eq!(Category::from_model_label("work"), Some(Category::Documentation));
    assert_eq!(Category::from_model_label("communication"), Some(Category::Social));
    assert_eq!(Category::from_model_label("unknown"), None);
}
