use dailynote_core::text::heading::heading_line_depth;
use dailynote_core::text::{
    depth_of, expand, expand_date, expand_dotw, extract_incomplete_tasks, extract_section,
    merge_at_heading, prune_empty_task_lines, MergeOutcome,
};

const JOURNAL: &str = "# Monday\n\
## Tasks\n\
- [ ] buy milk\n\
\t- [ ] 2%\n\
- [x] done\n\
- [ ]   \n\
## Notes\n\
### Work\n\
shipped the release\n\
\n\
### Home\n\
fixed the sink\n\
## Log\n\
end\n";

#[test]
fn merge_into_sparse_heading_normalizes_to_one_blank_line() {
    assert_eq!(
        merge_at_heading("## Tasks\n\n## Notes", "## Tasks", "- item"),
        MergeOutcome::Merged("## Tasks\n- item\n\n## Notes".to_string())
    );
}

#[test]
fn merge_reports_missing_heading_distinctly_from_empty_content() {
    assert_eq!(
        merge_at_heading("## Notes\n", "## Tasks", "- item"),
        MergeOutcome::HeadingMissing
    );
    assert!(merge_at_heading("## Tasks\n", "## Tasks", "").is_merged());
}

#[test]
fn merge_keeps_wide_template_spacing() {
    let merged = merge_at_heading("## Tasks\n\n\n\n\n## Notes", "## Tasks", "- a")
        .into_merged()
        .unwrap();
    assert_eq!(merged, "## Tasks\n- a\n\n\n\n## Notes");
}

#[test]
fn extracted_tasks_match_documented_example() {
    let tasks = extract_incomplete_tasks("- [ ] buy milk\n\t- [ ] 2%\n- [x] done\n- [ ]   \n");
    assert_eq!(tasks, vec!["- [ ] buy milk\n\t- [ ] 2%".to_string()]);
}

#[test]
fn extracted_tasks_never_contain_checked_or_blank_boxes() {
    let document = "- [ ] one\n\t- child\n- [x] two\n\t- owned by two\n- [ ] \n- [ ] three\n";
    let tasks = extract_incomplete_tasks(document);
    assert_eq!(tasks, vec!["- [ ] one\n\t- child", "- [ ] three"]);
    for block in &tasks {
        assert!(!block.contains("[x]"));
        assert!(!block.lines().any(|line| line.trim_end() == "- [ ]"));
    }
}

#[test]
fn pruning_is_a_fixed_point() {
    let once = prune_empty_task_lines(JOURNAL);
    assert_eq!(prune_empty_task_lines(&once), once);
    assert!(!once.contains("- [ ]   \n"));
    assert!(once.contains("- [x] done\n"));
    assert!(once.contains("- [ ] buy milk\n"));
}

#[test]
fn extracted_section_stops_at_same_or_shallower_heading() {
    let section = extract_section(JOURNAL, "### Work").unwrap();
    assert_eq!(section, "shipped the release\n");

    let notes = extract_section(JOURNAL, "## Notes").unwrap();
    assert_eq!(notes, "### Work\nshipped the release\n\n### Home\nfixed the sink");
    let bound = depth_of("## Notes");
    assert!(notes
        .lines()
        .all(|line| heading_line_depth(line).map_or(true, |depth| depth > bound)));

    assert_eq!(extract_section(JOURNAL, "## Log").unwrap(), "end\n");
    assert_eq!(extract_section(JOURNAL, "## Missing"), None);
}

#[test]
fn heading_metacharacters_are_matched_literally() {
    let document = "## Q&A (draft)\nanswer\n## Next\n";
    assert_eq!(extract_section(document, "## Q&A (draft)"), Some("answer"));
    assert!(merge_at_heading(document, "## Q&A (draft)", "- new").is_merged());
    assert_eq!(extract_section(document, "## Q.A"), None);
}

#[test]
fn formatted_date_example_expands_to_year() {
    assert_eq!(expand("<#dnm>date:YYYY</#dnm>", "2024-03-04"), "2024");
}

#[test]
fn dotw_and_date_passes_commute() {
    let text = "<#dnm>dotw</#dnm> <#dnm>date</#dnm> <#dnm>date:MMM D</#dnm>";
    let date_first = expand_dotw(&expand_date(text, "2024-03-04"), "2024-03-04");
    let dotw_first = expand_date(&expand_dotw(text, "2024-03-04"), "2024-03-04");
    assert_eq!(date_first, dotw_first);
    assert_eq!(date_first, "Monday 2024-03-04 Mar 4");
}

#[test]
fn unrecognized_tokens_survive_expansion() {
    let text = "<#dnm>weather</#dnm> <#dnm>custom-dotw</#dnm> <#dnm>date</#dnm>";
    assert_eq!(
        expand(text, "2024-03-04"),
        "<#dnm>weather</#dnm> <#dnm>custom-dotw</#dnm> 2024-03-04"
    );
}
