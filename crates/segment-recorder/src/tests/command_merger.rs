use crate::CommandMerger;

use std::fs;

use segment_recorder_core::{ContainerMerger, CoreError};

/// WHAT: The merge tool receives target, segment and output paths
/// WHY: External tools write the merged container to the staging output
#[cfg(unix)]
#[test]
#[allow(clippy::unwrap_used)]
fn given_concat_tool_when_merging_then_output_holds_both() {
    // Given: Two inputs and a shell concat tool
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("target.ts");
    let segment = dir.path().join("segment.ts");
    let output = dir.path().join("merged.ts");
    fs::write(&target, b"AAA").unwrap();
    fs::write(&segment, b"BB").unwrap();
    let merger = CommandMerger::new(
        "sh",
        vec![
            "-c".into(),
            "cat \"$0\" \"$1\" > \"$2\"".into(),
            "{target}".into(),
            "{segment}".into(),
            "{output}".into(),
        ],
    );

    // When: Merging
    merger.merge(&target, &segment, &output).unwrap();

    // Then: Output is the concatenation, inputs untouched
    assert_eq!(fs::read(&output).unwrap(), b"AAABB");
    assert_eq!(fs::read(&target).unwrap(), b"AAA");
}

/// WHAT: A failing merge tool is a merge error carrying its stderr
/// WHY: The operator needs the tool's own diagnostic
#[cfg(unix)]
#[test]
#[allow(clippy::unwrap_used, clippy::panic)]
fn given_failing_tool_when_merging_then_merge_error_with_stderr() {
    // Given: A tool that complains and exits non-zero
    let dir = tempfile::tempdir().unwrap();
    let merger = CommandMerger::new(
        "sh",
        vec!["-c".into(), "echo 'invalid data found' >&2; exit 1".into()],
    );

    // When: Merging
    let result = merger.merge(
        &dir.path().join("a"),
        &dir.path().join("b"),
        &dir.path().join("c"),
    );

    // Then: Merge error with the last stderr line
    match result {
        Err(CoreError::Merge { reason, .. }) => assert!(reason.contains("invalid data found")),
        other => panic!("expected merge error, got {:?}", other),
    }
}

/// WHAT: Missing merge program is a merge error
/// WHY: A wrong path in the config fails the pause, not the process
#[test]
fn given_missing_program_when_merging_then_merge_error() {
    // Given: A program that does not exist
    let merger = CommandMerger::new("definitely-not-a-merge-tool", vec![]);
    let path = std::path::Path::new("unused");

    // When / Then
    assert!(matches!(
        merger.merge(path, path, path),
        Err(CoreError::Merge { .. })
    ));
}

/// WHAT: Unknown placeholder in merge arguments is a merge error
/// WHY: The tool must never run with a literal placeholder
#[test]
fn given_unknown_placeholder_when_merging_then_merge_error() {
    // Given: A template with an unknown placeholder
    let merger = CommandMerger::new("sh", vec!["{input}".into()]);
    let path = std::path::Path::new("unused");

    // When / Then
    assert!(matches!(
        merger.merge(path, path, path),
        Err(CoreError::Merge { .. })
    ));
}
