//! End-to-end scenarios through the library API: the analysis
//! engine driven exactly the way the CLI drives it, with live
//! evaluation and the external linter switched off for
//! determinism.

mod util;

use util::{advice_for, all_records, records_from};

#[test]
fn assigned_string_gets_string_overview() {
    let messages = advice_for("pet = 'cat'");

    let from_str = records_from(&messages, "assigned_str_overview");
    assert_eq!(from_str.len(), 1);
    assert!(from_str[0].message.brief.contains("`pet`"));

    // No warnings anywhere for this snippet.
    assert!(all_records(&messages).iter().all(|record| !record.warning));
}

#[test]
fn manual_incrementing_suggests_enumerate() {
    let code = "\
n = 1
for image in images:
    if n % 10 == 0: print(n)
    n += 1";
    let messages = advice_for(code);

    let from_loop = records_from(&messages, "manual_incrementing");
    assert_eq!(from_loop.len(), 1);
    assert!(from_loop[0].message.brief.contains("`n`"));
    assert!(from_loop[0].message.brief.contains("enumerate"));
}

#[test]
fn mixed_dict_keys_warn_and_overview_fires() {
    let messages = advice_for("mixed = {1: 'a', '1': 'b'}");

    let overview = records_from(&messages, "dict_overview");
    assert_eq!(overview.len(), 1);

    let mixed = records_from(&messages, "mixed_key_types");
    assert_eq!(mixed.len(), 1);
    assert!(mixed[0].warning);
    assert!(mixed[0].message.brief.contains("`mixed`"));
}

#[test]
fn mutable_default_warns_with_param_and_literal() {
    let messages = advice_for("def f(items=[]):\n    pass");

    let warnings = records_from(&messages, "mutable_default");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].warning);
    assert!(warnings[0].message.brief.contains("`items`"));
    assert!(warnings[0].message.brief.contains("[]"));
}

#[test]
fn repeated_indexing_finds_unpacking_opportunity() {
    let code = "\
coord = (1, 2, 3)
x = coord[0]
y = coord[1]";
    let messages = advice_for(code);

    let opportunity = records_from(&messages, "unpacking_opportunity");
    assert_eq!(opportunity.len(), 1);
    assert!(opportunity[0].message.brief.contains("`coord`"));
    // Snippet-wide advice carries no line number.
    assert_eq!(opportunity[0].first_line, None);
}

#[test]
fn syntax_error_yields_one_system_message_and_nothing_else() {
    let messages = advice_for("def broken(:\n    pass");

    assert_eq!(messages.snippet_level.len(), 1);
    assert!(messages.block_level.is_empty());

    let record = &messages.snippet_level[0];
    assert_eq!(record.source, "system");
    assert!(!record.message.brief.is_empty());
}

#[test]
fn every_message_has_all_three_levels() {
    let code = "\
pet = 'cat'
nums = [1, 2, 3]
mixed = {1: 'a', '1': 'b'}
def f(items=[]):
    pass";
    let messages = advice_for(code);
    assert!(!all_records(&messages).is_empty());

    for record in all_records(&messages) {
        assert!(!record.message.brief.is_empty(), "{}", record.source);
        assert!(!record.message.main.is_empty(), "{}", record.source);
        // extra may be empty but it always exists as a field; the
        // two mandatory levels are the contract.
    }
}

#[test]
fn repeat_suppression_expands_only_the_first_firing() {
    let code = "a = 'x'\nb = 'y'\nc = 'z'";
    let messages = advice_for(code);

    let from_str = records_from(&messages, "assigned_str_overview");
    assert_eq!(from_str.len(), 3);

    let expanded: Vec<bool> = from_str
        .iter()
        .map(|record| record.message.main.contains("For illustration"))
        .collect();
    assert_eq!(expanded, vec![true, false, false]);
}

#[test]
fn block_messages_order_by_line_with_warnings_last() {
    // One block that attracts both an overview and a warning.
    let code = "mixedTypes = [1, 'x']\nlater = [1, 2]";
    let messages = advice_for(code);

    // Use the public ordering helper the formatters use.
    let (block_level, _) = pytutor::format::common::arranged(&messages);
    let lines_and_warnings: Vec<(Option<usize>, bool)> = block_level
        .iter()
        .map(|record| (record.first_line, record.warning))
        .collect();

    // Within line 1 the non-warning overview precedes the warning.
    let line1: Vec<bool> = lines_and_warnings
        .iter()
        .filter(|(line, _)| *line == Some(1))
        .map(|(_, warning)| *warning)
        .collect();
    assert_eq!(line1, vec![false, true]);
}

#[test]
fn empty_snippet_never_exits_silently() {
    let messages = advice_for("");
    assert_eq!(messages.snippet_level.len(), 1);
    assert!(messages.snippet_level[0].message.brief.contains("No advice"));
}
