use super::*;

#[test]
fn normalize_strips_dots_and_backslashes() {
    assert_eq!(normalize_rel_path("./a/./b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("dir\\Q1_Left.png").unwrap(), "dir/Q1_Left.png");
}

#[test]
fn normalize_rejects_escapes() {
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("a/../../x.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn background_candidates_are_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["S3.mp4", "S1.mp4", "S10.mp4", "opening.mp4", "S2.mov", "bg.mp4"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    std::fs::create_dir(dir.path().join("S9.mp4")).unwrap();

    let lib = AssetLibrary::new(dir.path());
    assert_eq!(
        lib.background_candidates(),
        vec!["S1.mp4", "S10.mp4", "S3.mp4"]
    );
}

#[test]
fn missing_directory_has_no_backgrounds() {
    let dir = tempfile::tempdir().unwrap();
    let lib = AssetLibrary::new(dir.path().join("nope"));
    assert!(lib.background_candidates().is_empty());
    assert!(!lib.exists(OPENING));
}

#[test]
fn exists_only_for_regular_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CHEER), b"x").unwrap();
    let lib = AssetLibrary::new(dir.path());
    assert!(lib.exists(CHEER));
    assert!(!lib.exists(ALARM));
    assert!(!lib.exists("../cheer.mp3"));
    assert_eq!(lib.path(CHEER).unwrap(), dir.path().join("cheer.mp3"));
}

#[test]
fn numbered_asset_names() {
    assert_eq!(question_bumper(2), "question2.mp4");
    assert_eq!(answer_callout(3), "answer3.mp3");
}
